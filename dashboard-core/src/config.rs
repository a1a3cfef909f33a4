use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Path of the snapshot document, relative to `origin` unless absolute.
pub const DEFAULT_ENDPOINT: &str = "/latest.json";
/// 2 minutes.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 120_000;
/// Warn when `generated_utc` is at least this old.
pub const DEFAULT_STALE_MINUTES: i64 = 15;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// origin = "https://d1234.cloudfront.net"
/// endpoint = "/latest.json"
/// refresh_interval_ms = 120000
/// stale_minutes = 15
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL a relative `endpoint` is resolved against.
    pub origin: Option<String>,
    pub endpoint: String,
    pub refresh_interval_ms: u64,
    pub stale_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            stale_minutes: DEFAULT_STALE_MINUTES,
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use compiled-in defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citydash", "citydash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    /// Absolute URL of the snapshot document.
    ///
    /// An absolute `endpoint` is used as-is; a relative one is joined onto `origin`.
    pub fn resolve_endpoint(&self) -> Result<Url> {
        if let Ok(url) = Url::parse(&self.endpoint) {
            return Ok(url);
        }

        let origin = self.origin.as_deref().ok_or_else(|| {
            anyhow!(
                "Endpoint '{}' is relative and no origin is configured.\n\
                 Hint: run `citydash configure` and enter the dashboard origin.",
                self.endpoint
            )
        })?;

        let base = Url::parse(origin).with_context(|| format!("Invalid origin URL '{origin}'"))?;
        base.join(&self.endpoint).with_context(|| {
            format!(
                "Failed to resolve endpoint '{}' against '{origin}'",
                self.endpoint
            )
        })
    }
}
