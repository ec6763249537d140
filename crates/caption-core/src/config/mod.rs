//! Configuration management.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every field, so a missing file or a partial file both work.

mod types;
mod validate;

pub use types::*;

use crate::auth::{AccessTokenProvider, EnvToken, StaticToken, TokenFile};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const REDACTED: &str = "<redacted>";

/// Resolved origin of the access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    File(PathBuf),
    Env(String),
    Inline(String),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::File(path) => write!(f, "token file {}", path.display()),
            TokenSource::Env(var) => write!(f, "environment variable {var}"),
            TokenSource::Inline(token) if token.is_empty() => f.write_str("none"),
            TokenSource::Inline(_) => f.write_str("inline access_token"),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API settings
    pub api: ApiConfig,

    /// Session token settings
    pub auth: AuthConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.almostcrackd.caption/config.toml
    /// - Linux: ~/.config/caption/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\almostcrackd\caption\config\config.toml
    ///
    /// Falls back to ~/.caption/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "almostcrackd", "caption")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".caption").join("config.toml")
            })
    }

    /// Where the access token comes from, per the `[auth]` section.
    ///
    /// A token file wins over `access_token`; a `${VAR}` reference names an
    /// environment variable read at run time, not at load time.
    pub fn token_source(&self) -> TokenSource {
        if let Some(path) = &self.auth.token_file {
            return TokenSource::File(path.clone());
        }
        let value = self.auth.access_token.trim();
        match value
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(var) => TokenSource::Env(var.to_string()),
            None => TokenSource::Inline(value.to_string()),
        }
    }

    /// Build the access token provider described by the `[auth]` section.
    pub fn token_provider(&self) -> Arc<dyn AccessTokenProvider> {
        match self.token_source() {
            TokenSource::File(path) => Arc::new(TokenFile::new(&path)),
            TokenSource::Env(var) => Arc::new(EnvToken::new(var)),
            TokenSource::Inline(token) => Arc::new(StaticToken::new(token)),
        }
    }

    /// Copy of the config safe to print: an inline token is masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if matches!(self.token_source(), TokenSource::Inline(ref t) if !t.is_empty()) {
            config.auth.access_token = REDACTED.to_string();
        }
        config
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
