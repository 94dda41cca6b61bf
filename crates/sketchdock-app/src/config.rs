//! Environment-driven application configuration.

use sketchdock_core::DEFAULT_DEBOUNCE;
use std::time::Duration;
use thiserror::Error;

pub const ENV_BACKEND_URL: &str = "SKETCHDOCK_BACKEND_URL";
pub const ENV_API_KEY: &str = "SKETCHDOCK_API_KEY";
pub const ENV_USER: &str = "SKETCHDOCK_USER";
pub const ENV_PASSWORD: &str = "SKETCHDOCK_PASSWORD";
pub const ENV_AUTOSAVE_SECS: &str = "SKETCHDOCK_AUTOSAVE_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend project root URL.
    pub backend_url: String,
    /// Public anon key for the backend.
    pub api_key: String,
    /// Username for sign-in, if provided.
    pub username: Option<String>,
    /// Password for sign-in, if provided.
    pub password: Option<String>,
    /// Autosave debounce window.
    pub autosave_debounce: Duration,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = lookup(ENV_BACKEND_URL).ok_or(ConfigError::Missing(ENV_BACKEND_URL))?;
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::Missing(ENV_API_KEY))?;

        let autosave_debounce = match lookup(ENV_AUTOSAVE_SECS) {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| ConfigError::Invalid(ENV_AUTOSAVE_SECS, raw))?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_DEBOUNCE,
        };

        Ok(Self {
            backend_url,
            api_key,
            username: lookup(ENV_USER),
            password: lookup(ENV_PASSWORD),
            autosave_debounce,
        })
    }
}
