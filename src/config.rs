//! Configuration source: credential and API endpoint
//!
//! Each setting resolves flag (or its environment variable, via clap) first,
//! then `config.toml` in the config directory, then a default. A missing token
//! is not an error: calls go out with a placeholder and the API rejects them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Environment variable for the API token
pub const ENV_AUTH_TOKEN: &str = "LATITUDESH_AUTH_TOKEN";

/// Environment variable for the API base URL
pub const ENV_API_URL: &str = "LATITUDESH_API_URL";

pub const CONFIG_FILE: &str = "config.toml";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Attempts for idempotent calls (GET, list, DELETE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

impl FileConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join(CONFIG_FILE))
    }

    /// Load a config file; a missing file is an empty config
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    File,
    Default,
}

/// Fully resolved settings for building a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub auth_token: Option<String>,
    pub token_source: Source,
    pub api_url: String,
    pub max_attempts: Option<u32>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Settings {
    /// Merge command-line values over the file config
    pub fn resolve(flag_token: Option<&str>, flag_url: Option<&str>, file: &FileConfig) -> Self {
        let (auth_token, token_source) = match non_empty(flag_token) {
            Some(token) => (Some(token), Source::Flag),
            None => match non_empty(file.auth_token.as_deref()) {
                Some(token) => (Some(token), Source::File),
                None => (None, Source::Default),
            },
        };

        let api_url = non_empty(flag_url)
            .or_else(|| non_empty(file.api_url.as_deref()))
            .unwrap_or_else(|| latitude::DEFAULT_API_URL.to_string());

        Self {
            auth_token,
            token_source,
            api_url,
            max_attempts: file.max_attempts,
        }
    }

    /// Build the HTTP client these settings describe
    pub fn client(&self) -> latitude::Client {
        if self.auth_token.is_none() {
            log::warn!(
                "No API token configured (set {ENV_AUTH_TOKEN} or auth_token in {CONFIG_FILE}); requests will be unauthenticated"
            );
        }

        let mut client = latitude::Client::new(self.auth_token.clone().unwrap_or_default())
            .with_api_base(&self.api_url);
        if let Some(attempts) = self.max_attempts {
            client = client.with_retry(latitude::RetryConfig {
                max_attempts: attempts.max(1),
                ..latitude::RetryConfig::default()
            });
        }
        client
    }
}
