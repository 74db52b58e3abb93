//! Client configuration for the content management CLI and library.
//!
//! Settings come from a small JSON file in the standard configuration
//! directory (`~/.config/cma/config.json` on most platforms) and can be
//! overridden per process with environment variables. A missing file yields
//! defaults; a malformed one is logged and ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "CMA_CONFIG_PATH";

/// Environment variable holding the personal access token.
pub const ACCESS_TOKEN_ENV: &str = "CMA_ACCESS_TOKEN";

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "CMA_API_BASE";

/// Environment variable naming the space used when a command omits one.
pub const SPACE_ID_ENV: &str = "CMA_SPACE_ID";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Public management API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.contentful.com";

/// Error surfaced when reading or writing the config file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Resolved client settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_space: Option<String>,
}

impl ClientConfig {
    /// Load the config file from its default location and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Load the config file at `path` and apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = load_file(path)?;
        config.apply_env();
        debug!(
            path = %path.display(),
            has_token = config.access_token.is_some(),
            has_default_space = config.default_space.is_some(),
            "client config loaded"
        );
        Ok(config)
    }

    /// Base URL to send requests to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Write this config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Some(token) = non_empty_env(ACCESS_TOKEN_ENV) {
            self.access_token = Some(token);
        }
        if let Some(base_url) = non_empty_env(API_BASE_ENV) {
            self.base_url = Some(base_url);
        }
        if let Some(space) = non_empty_env(SPACE_ID_ENV) {
            self.default_space = Some(space);
        }
    }
}

/// Path of the config file, honoring [`CONFIG_PATH_ENV`].
///
/// A leading `~` in the override is replaced with the home directory.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return expand_home(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cma")
        .join(CONFIG_FILE_NAME)
}

fn expand_home(path: &str) -> PathBuf {
    let Some(home) = home_dir() else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home;
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_file(path: &Path) -> Result<ClientConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(ClientConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}
