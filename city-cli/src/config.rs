//! Configuration loading for listy-city.
//!
//! Configuration is loaded from a TOML file (default:
//! `<data-dir>/listy-city.toml`). A missing file means all defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name inside the data directory.
pub const CONFIG_FILE: &str = "listy-city.toml";

/// Root configuration for listy-city.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the collections. Relative paths resolve against the data dir.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Collection to mirror (default: cities).
    #[serde(default = "default_collection")]
    pub collection: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset (default: warn).
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_store_path() -> PathBuf {
    PathBuf::from("cities.json")
}

fn default_collection() -> String {
    city_client::DEFAULT_COLLECTION.to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            collection: default_collection(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration")
    }

    /// Load configuration from a file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Self::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        }
    }

    /// Location of the store file for a given data directory.
    pub fn store_path(&self, data_dir: &Path) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            data_dir.join(&self.store.path)
        }
    }
}
