use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dashboard_core::{Config, RenderSettings, Selection, SnapshotLoader, render, source_from_config};
use inquire::{CustomType, Select, Text};

use crate::{display, watch};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citydash", version, about = "City weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure where the snapshot lives and how often to refresh it.
    Configure,

    /// Load the latest snapshot once and print the dashboard.
    Show {
        /// Show a single city instead of all cities.
        #[arg(long, conflicts_with = "pick")]
        city: Option<String>,

        /// Pick the city interactively from the loaded snapshot.
        #[arg(long)]
        pick: bool,

        /// Print the computed view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Keep the dashboard on screen, refreshing on a timer.
    Watch {
        /// Start with a single city selected.
        #[arg(long)]
        city: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, pick, json } => show(city, pick, json).await,
            Command::Watch { city } => {
                let config = Config::load()?;
                watch::run(&config, city).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let origin = Text::new("Dashboard origin (leave empty when the endpoint is absolute):")
        .with_default(config.origin.as_deref().unwrap_or(""))
        .prompt()?;
    config.origin = Some(origin.trim().to_string()).filter(|o| !o.is_empty());

    let endpoint = Text::new("Snapshot endpoint:")
        .with_default(&config.endpoint)
        .prompt()?;
    config.endpoint = endpoint.trim().to_string();

    config.refresh_interval_ms = CustomType::<u64>::new("Auto-refresh interval (ms):")
        .with_default(config.refresh_interval_ms)
        .with_error_message("Please enter a whole number of milliseconds")
        .prompt()?;

    config.stale_minutes = CustomType::<i64>::new("Stale after (minutes):")
        .with_default(config.stale_minutes)
        .with_error_message("Please enter a whole number of minutes")
        .prompt()?;

    let url = config.resolve_endpoint()?;
    let path = config.save()?;
    println!(
        "Saved configuration to {} (snapshot: {url})",
        path.display()
    );

    Ok(())
}

async fn show(city: Option<String>, pick: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut loader = SnapshotLoader::new(source_from_config(&config)?);

    if let Err(err) = loader.load().await {
        display::print_status(loader.status());
        return Err(err).context("Could not load the latest snapshot");
    }

    let current = loader.state().current.as_ref();
    let selection = match (city, pick) {
        (Some(city), _) => Selection::resolve(&city, current),
        (None, true) => pick_city(&loader)?,
        (None, false) => Selection::All,
    };

    let settings = RenderSettings {
        now: Utc::now(),
        stale_minutes: config.stale_minutes,
    };
    let Some(view) = render(loader.state(), &selection, settings) else {
        return Ok(());
    };

    if json {
        display::print_json(&view)
    } else {
        display::print_view(&view, loader.status())?;
        Ok(())
    }
}

/// Offer the selection values themselves, so a city named like the
/// "All cities" label is still told apart from the sentinel.
fn pick_city(loader: &SnapshotLoader) -> anyhow::Result<Selection> {
    let options = match &loader.state().current {
        Some(snapshot) => Selection::options(snapshot),
        None => vec![Selection::All],
    };

    Ok(Select::new("City:", options).prompt()?)
}
