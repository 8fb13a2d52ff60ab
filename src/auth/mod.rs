//! Where the OpenAI API key comes from.
//!
//! The key is resolved on every submission rather than at startup, so a
//! process started without one still serves the GUI and reports the
//! problem per request.

use crate::consts::API_KEY_ENV;
use crate::error::SubmitError;

/// Supplies the API credential for generation requests.
pub trait CredentialSource: Send + Sync {
    /// The API key, or a configuration error explaining what is missing.
    fn resolve(&self) -> Result<String, SubmitError>;

    /// Short status for banners and health checks.
    fn status(&self) -> String {
        match self.resolve() {
            Ok(_) => "API key ✓".to_string(),
            Err(_) => "not configured".to_string(),
        }
    }
}

/// Reads the key from an environment variable at call time.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialSource for EnvCredentials {
    fn resolve(&self) -> Result<String, SubmitError> {
        match std::env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SubmitError::Config(format!(
                "{} is not set. Export it or add it to ~/.imagist/.env or ./.env",
                self.var
            ))),
        }
    }

    fn status(&self) -> String {
        match self.resolve() {
            Ok(_) => format!("API key (env {}) ✓", self.var),
            Err(_) => format!("{} not set", self.var),
        }
    }
}

/// A fixed key, or a fixed absence of one.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(pub Option<String>);

impl StaticCredentials {
    pub fn key(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredentials {
    fn resolve(&self) -> Result<String, SubmitError> {
        self.0
            .clone()
            .ok_or_else(|| SubmitError::Config("no API key configured".to_string()))
    }
}
