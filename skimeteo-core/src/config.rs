use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

use crate::{
    error::WeatherError,
    provider::openmeteo::{DEFAULT_BASE_URL, DEFAULT_TIMEZONE},
    view::{Filter, SortKey},
};

pub const DEFAULT_STALE_MINUTES: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// One day. Older weather is not worth showing.
pub const MAX_STALE_MINUTES: u64 = 24 * 60;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "https://api.open-meteo.com/v1/forecast"
/// timezone = "Europe/Zurich"
/// stale_minutes = 10
/// default_sort = "temperature"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Open-Meteo forecast endpoint.
    pub base_url: String,

    /// Timezone the provider reports `time` in.
    pub timezone: String,

    /// How long fetched weather stays fresh.
    pub stale_minutes: u64,

    pub request_timeout_secs: u64,

    /// Sort applied by `dashboard` when `--sort` is absent.
    pub default_sort: SortKey,

    /// Filter applied by `dashboard` when `--filter` is absent.
    pub default_filter: Filter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            stale_minutes: DEFAULT_STALE_MINUTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_sort: SortKey::default(),
            default_filter: Filter::default(),
        }
    }
}

impl Config {
    pub fn stale_window(&self) -> Duration {
        Duration::from_secs(self.stale_minutes.saturating_mul(60))
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.base_url.trim().is_empty() {
            return Err(WeatherError::Config("base_url must not be empty".into()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(WeatherError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timezone.trim().is_empty() {
            return Err(WeatherError::Config("timezone must not be empty".into()));
        }
        if self.stale_minutes > MAX_STALE_MINUTES {
            return Err(WeatherError::Config(format!(
                "stale_minutes must be at most {MAX_STALE_MINUTES}, got {}",
                self.stale_minutes
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(WeatherError::Config("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Settings from disk; defaults until `skimeteo configure` has been run.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Write a valid config to disk. An invalid one is refused before anything is touched.
    pub fn save(&self) -> Result<()> {
        let contents = self.to_toml()?;
        let path = Self::config_file_path()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("Cannot write {}", path.display()))?;

        debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validated TOML text, as [`save`](Self::save) writes it.
    pub fn to_toml(&self) -> Result<String> {
        self.validate()?;
        toml::to_string_pretty(self).context("Cannot serialize configuration")
    }

    /// `config.toml` in the platform config dir, e.g. `~/.config/skimeteo/` on Linux.
    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "skimeteo", "skimeteo")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("No home directory to keep skimeteo settings in"))
    }
}
