//! Long-running dashboard: refreshes on a timer and reacts to typed commands.

use std::{io, sync::Arc};

use chrono::Utc;
use dashboard_core::{
    Config, LoadError, RenderSettings, Selection, Snapshot, SnapshotLoader, SnapshotSource, render,
    source_from_config,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::{MissedTickBehavior, interval},
};

use crate::display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Refresh,
    Select(Selection),
    Quit,
}

impl Input {
    /// Parse a typed line.
    ///
    /// A city name from the current snapshot always selects that city. Otherwise
    /// an empty line or `r` refreshes, `q` quits, and anything else is a selection.
    pub fn parse(line: &str, snapshot: Option<&Snapshot>) -> Self {
        let trimmed = line.trim();
        let is_city = snapshot.is_some_and(|s| s.cities.iter().any(|c| c.city == trimmed));
        if is_city {
            return Input::Select(Selection::City(trimmed.to_string()));
        }

        match trimmed {
            "" | "r" | "refresh" => Input::Refresh,
            "q" | "quit" | "exit" => Input::Quit,
            other => Input::Select(Selection::resolve(other, snapshot)),
        }
    }
}

/// Turn one stdin read into a command. EOF quits; a failed read is skipped.
fn input_from_read(read: io::Result<Option<String>>, snapshot: Option<&Snapshot>) -> Option<Input> {
    match read {
        Ok(Some(line)) => Some(Input::parse(&line, snapshot)),
        Ok(None) => Some(Input::Quit),
        Err(err) => {
            tracing::warn!(error = %err, "could not read command from stdin");
            None
        }
    }
}

type FetchResult = Result<Snapshot, LoadError>;

/// Run until EOF or a quit command. `city` is resolved once the first snapshot arrives.
pub async fn run(config: &Config, city: Option<String>) -> anyhow::Result<()> {
    let mut loader = SnapshotLoader::new(source_from_config(config)?);
    let mut selection = Selection::All;
    let mut pending_city = city;
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchResult>();

    let mut ticker = interval(config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Commands: <Enter>/r refresh, all, <city name>, q quit");
    tracing::info!(
        interval_ms = config.refresh_interval_ms,
        "watching snapshot"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                spawn_fetch(&mut loader, &tx);
            }
            Some(result) = rx.recv() => {
                if loader.complete(result).is_ok() {
                    if let Some(city) = pending_city.take() {
                        selection = Selection::resolve(&city, loader.state().current.as_ref());
                    }
                    redraw(&loader, &selection, config)?;
                } else {
                    // Keep the last good view on screen; only the status changes.
                    display::print_status(loader.status());
                }
            }
            line = lines.next_line() => {
                let Some(input) = input_from_read(line, loader.state().current.as_ref()) else {
                    continue;
                };
                match input {
                    Input::Refresh => spawn_fetch(&mut loader, &tx),
                    Input::Select(next) => {
                        pending_city = None;
                        selection = next;
                        redraw(&loader, &selection, config)?;
                    }
                    Input::Quit => break,
                }
            }
        }
    }

    Ok(())
}

/// Start a fetch in the background. Completions are applied in arrival order.
fn spawn_fetch(loader: &mut SnapshotLoader, tx: &mpsc::UnboundedSender<FetchResult>) {
    loader.begin();
    display::print_status(loader.status());

    let source: Arc<dyn SnapshotSource> = loader.source();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = source.fetch().await;
        if tx.send(result).is_err() {
            tracing::debug!("dashboard closed before fetch completed");
        }
    });
}

fn redraw(loader: &SnapshotLoader, selection: &Selection, config: &Config) -> anyhow::Result<()> {
    let settings = RenderSettings {
        now: Utc::now(),
        stale_minutes: config.stale_minutes,
    };
    if let Some(view) = render(loader.state(), selection, settings) {
        println!();
        display::print_view(&view, loader.status())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::CityReading;

    fn snapshot_with(names: &[&str]) -> Snapshot {
        Snapshot {
            generated_utc: None,
            cities: names
                .iter()
                .map(|name| CityReading {
                    city: name.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("", None), Input::Refresh);
        assert_eq!(Input::parse(" r ", None), Input::Refresh);
        assert_eq!(Input::parse("q", None), Input::Quit);
        assert_eq!(Input::parse("all", None), Input::Select(Selection::All));
        assert_eq!(
            Input::parse("São Paulo", None),
            Input::Select(Selection::City("São Paulo".into()))
        );
    }

    #[test]
    fn city_names_win_over_commands() {
        let snapshot = snapshot_with(&["All", "q", "r"]);

        for name in ["All", "q", "r"] {
            assert_eq!(
                Input::parse(name, Some(&snapshot)),
                Input::Select(Selection::City(name.into())),
                "input {name:?}"
            );
        }
        assert_eq!(Input::parse("quit", Some(&snapshot)), Input::Quit);
        assert_eq!(Input::parse("", Some(&snapshot)), Input::Refresh);
    }

    #[test]
    fn unreadable_line_is_skipped_and_eof_quits() {
        let invalid = io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8");

        assert_eq!(input_from_read(Err(invalid), None), None);
        assert_eq!(input_from_read(Ok(None), None), Some(Input::Quit));
        assert_eq!(
            input_from_read(Ok(Some("r".into())), None),
            Some(Input::Refresh)
        );
    }
}
