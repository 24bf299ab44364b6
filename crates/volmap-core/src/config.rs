//! Application configuration management.
//!
//! This module handles loading and saving the configuration: which data
//! source to read countries from, the cache TTL, the display locale, and
//! the default country list for global statistics.
//!
//! Configuration is stored at `~/.config/volmap/config.json`. Every field
//! is optional in the file; missing fields take their defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;
use crate::api::ApiClient;
use crate::cache::DEFAULT_TTL;
use crate::countries::{self, Locale};
use crate::source::dir::DEFAULT_DATA_DIR;
use crate::source::{CountrySource, DirSource, HttpSource};

/// Application name used for config directory paths
const APP_NAME: &str = "volmap";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Static file host used when `http` is selected without a URL
const DEFAULT_STATIC_URL: &str = "http://localhost:8080/data/volunteers/countries";

/// Where country records are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Dir,
    Http,
    Api,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dir" => Ok(SourceKind::Dir),
            "http" => Ok(SourceKind::Http),
            "api" => Ok(SourceKind::Api),
            other => Err(format!("unknown source: {} (expected dir, http or api)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceKind,
    pub data_dir: PathBuf,
    pub static_url: String,
    pub api_url: String,
    pub api_token: Option<String>,
    pub cache_ttl_secs: u64,
    pub locale: Locale,
    /// Countries summed by `stats` when none are given
    pub countries: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_url: DEFAULT_STATIC_URL.to_string(),
            api_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            locale: Locale::default(),
            countries: countries::known_codes().map(str::to_string).collect(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
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

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        let client = ApiClient::new(&self.api_url).context("Failed to create API client")?;
        Ok(match self.api_token {
            Some(ref token) => client.with_token(token.clone()),
            None => client,
        })
    }

    /// Build the one source this configuration selects
    pub fn build_source(&self) -> Result<Arc<dyn CountrySource>> {
        Ok(match self.source {
            SourceKind::Dir => Arc::new(DirSource::new(&self.data_dir)),
            SourceKind::Http => Arc::new(
                HttpSource::new(&self.static_url).context("Failed to create HTTP source")?,
            ),
            SourceKind::Api => Arc::new(self.api_client()?),
        })
    }
}
