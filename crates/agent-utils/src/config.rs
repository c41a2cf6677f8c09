//! Environment configuration helpers
//!
//! Configuration is read from process environment variables, optionally
//! seeded from a `.env` file in the working directory.

use std::str::FromStr;
use thiserror::Error;

/// Environment variable holding a local proxy port
pub const PROXY_PORT_VAR: &str = "Proxy_Port";

/// Error reading a configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing environment variable: {0}")]
    Missing(String),

    /// A variable is set but cannot be parsed
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Load variables from `.env` if the file exists
///
/// Values already present in the environment win over the file.
pub fn load_env() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }
}

/// Read a variable, trimmed; blank values count as unset
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First non-blank variable among `keys`
pub fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env_string(key))
}

/// Read and parse a variable; `Ok(None)` when unset
pub fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Proxy URL for outbound HTTP clients
///
/// Built from `Proxy_Port` as `http://127.0.0.1:{port}`. Returns `Ok(None)`
/// when the variable is unset.
pub fn proxy_url() -> Result<Option<String>, ConfigError> {
    Ok(env_parse::<u16>(PROXY_PORT_VAR)?.map(|port| format!("http://127.0.0.1:{port}")))
}
