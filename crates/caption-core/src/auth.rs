//! Access token providers.
//!
//! The pipeline asks its provider for a token immediately before each run and
//! never caches the result, so a refreshed session is picked up by the next
//! run without rebuilding anything.

use crate::error::AuthError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Source of the session access token presented as a bearer credential.
///
/// Uses `async_trait` so providers can be held as `Arc<dyn AccessTokenProvider>`.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Return the current access token.
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A fixed token supplied up front (e.g. a `--token` flag).
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        non_empty(&self.token)
    }
}

/// Reads the token from an environment variable on every call.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for EnvToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        let value =
            std::env::var(&self.var).map_err(|_| AuthError::MissingEnvVar(self.var.clone()))?;
        non_empty(&value)
    }
}

/// Reads the token from a file on every call (`~` is expanded).
///
/// Suits setups where another process keeps the session refreshed on disk.
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: &Path) -> Self {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        Self {
            path: PathBuf::from(expanded),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AccessTokenProvider for TokenFile {
    async fn access_token(&self) -> Result<String, AuthError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| AuthError::TokenFile {
                    path: self.path.display().to_string(),
                    source,
                })?;
        non_empty(&contents)
    }
}

fn non_empty(token: &str) -> Result<String, AuthError> {
    let token = token.trim();
    if token.is_empty() {
        Err(AuthError::EmptyToken)
    } else {
        Ok(token.to_string())
    }
}
