//! Application configuration management.
//!
//! The configuration names the schedule source and tunes the refresh
//! throttle. It is stored at `~/.config/confsync/config.json`; the
//! `CONFSYNC_DATA_URL` environment variable overrides the source.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sync::{FreshnessPolicy, DEFAULT_MIN_FETCH_INTERVAL_MINUTES};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "confsync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `data_url`
pub const DATA_URL_ENV: &str = "CONFSYNC_DATA_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL or local path of the schedule JSON
    #[serde(default)]
    pub data_url: Option<String>,
    #[serde(default = "default_min_fetch_interval")]
    pub min_fetch_interval_minutes: i64,
    /// Overrides the platform cache directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_min_fetch_interval() -> i64 {
    DEFAULT_MIN_FETCH_INTERVAL_MINUTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: None,
            min_fetch_interval_minutes: DEFAULT_MIN_FETCH_INTERVAL_MINUTES,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_env_override(std::env::var(DATA_URL_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    fn with_env_override(mut self, data_url: Option<String>) -> Self {
        if let Some(url) = data_url.filter(|u| !u.trim().is_empty()) {
            self.data_url = Some(url);
        }
        self
    }

    pub fn freshness_policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::new(Duration::minutes(self.min_fetch_interval_minutes.max(0)))
    }

    /// The schedule source, if one is configured and resolvable
    pub fn locator(&self) -> Option<Url> {
        self.data_url.as_deref().and_then(resolve_locator)
    }
}

/// Resolve a configured source into a URL.
///
/// Absolute URLs are used as-is; an existing local path becomes a `file://`
/// URL. Anything else does not resolve.
pub fn resolve_locator(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Single-letter schemes are Windows drive letters, not URLs
    if let Ok(url) = Url::parse(raw) {
        if url.scheme().len() > 1 {
            return Some(url);
        }
    }

    let path = Path::new(raw);
    if path.exists() {
        if let Ok(absolute) = path.canonicalize() {
            if let Ok(url) = Url::from_file_path(absolute) {
                return Some(url);
            }
        }
    }

    warn!(source = raw, "Schedule source is neither a URL nor an existing file");
    None
}
