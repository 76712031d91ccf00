//! Configuration file loading.
//!
//! The configuration document lists the feeds to ingest and, optionally, the
//! prompt settings for the summarizer:
//!
//! ```yaml
//! feeds:
//!   - name: Example News
//!     url: https://example.com/rss
//! ai:
//!   model: deepseek-chat
//!   temperature: 0.3
//! ```
//!
//! The file is parsed with `serde_yaml`. Since YAML is a superset of JSON, a
//! `config.json` file loads the same way.

use crate::models::FeedConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

pub const DEFAULT_MODEL: &str = "deepseek-chat";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You're a helpful assistant who can analyze news articles and find the most important ones. You will be given a list of news articles and you will need to find the most relevant ones. You will need to return a list of the most important articles.";

pub const DEFAULT_USER_PROMPT: &str = "Find articles focusing on geopolitics and economics, list the article titles and links, and write a short summary of how the articles relate to each other, and the general geopolitical situation";

pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Failures while loading the configuration file. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Feeds to ingest; a missing key means no feeds.
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    /// Prompt settings for the summarizer.
    #[serde(default)]
    pub ai: AiConfig,
}

/// Optional summarizer settings. Use the accessor methods to get values with
/// defaults applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub temperature: Option<f64>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl AiConfig {
    pub fn model(&self) -> &str {
        non_empty(&self.model).unwrap_or(DEFAULT_MODEL)
    }

    pub fn system_prompt(&self) -> &str {
        non_empty(&self.system_prompt).unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn user_prompt(&self) -> &str {
        non_empty(&self.user_prompt).unwrap_or(DEFAULT_USER_PROMPT)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

impl AppConfig {
    /// Parse a configuration document from a string.
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load and parse the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid YAML/JSON of the expected shape.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = AppConfig::parse(&raw, path)?;
    info!(feeds = config.feeds.len(), "Loaded configuration");
    Ok(config)
}
