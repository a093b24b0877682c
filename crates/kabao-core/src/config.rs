//! Configuration for display settings, search defaults and rate overrides
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, else the override in the data dir
//!    (~/.local/share/kabao/config.toml), if the file exists
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::overrides::{RateOverride, RateOverrides};
use crate::search::SearchOptions;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/kabao.toml");

/// How rates and rules are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Decimals shown for equivalent rates
    pub rate_decimals: usize,
    /// Keywords shown in a rule summary
    pub summary_keywords: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rate_decimals: 2,
            summary_keywords: 3,
        }
    }
}

impl DisplayConfig {
    /// Format a rate with the configured precision, e.g. `8.33%`
    pub fn format_rate(&self, rate: f64) -> String {
        format!("{:.*}%", self.rate_decimals, rate)
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Embedded,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Embedded => write!(f, "built-in defaults"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub display: DisplayConfig,
    pub search: SearchOptions,
    pub overrides: RateOverrides,
    pub source: ConfigSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            search: SearchOptions::default(),
            overrides: RateOverrides::empty(),
            source: ConfigSource::Embedded,
        }
    }
}

impl Config {
    /// Load configuration (explicit or data-dir override first, then default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        if let Some(path) = path.filter(|p| p.exists()) {
            debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
            let mut config = parse_config(&content)?;
            config.source = ConfigSource::File(path);
            return Ok(config);
        }

        parse_config(DEFAULT_CONFIG)
    }

    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("kabao").join("config.toml"))
}

/// Default card book path
pub fn default_book_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("kabao").join("cards.json"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    display: Option<RawDisplay>,
    search: Option<RawSearch>,
    overrides: Option<Vec<RateOverride>>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    rate_decimals: Option<usize>,
    summary_keywords: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    limit: Option<usize>,
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(display) = raw.display {
        if let Some(decimals) = display.rate_decimals {
            config.display.rate_decimals = decimals;
        }
        if let Some(count) = display.summary_keywords {
            config.display.summary_keywords = count;
        }
    }

    if let Some(search) = raw.search {
        config.search.limit = search.limit.filter(|limit| *limit > 0);
    }

    if let Some(overrides) = raw.overrides {
        config.overrides = RateOverrides::new(overrides)?;
    }

    Ok(config)
}
