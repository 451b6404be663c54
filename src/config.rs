//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API origin without a trailing slash.
    pub base_url: String,
    /// Sent as the `session_token` cookie on every request.
    pub session_token: Option<String>,
    /// File backing the local key-value store. `None` keeps state in memory.
    pub store_path: Option<PathBuf>,
    pub timeouts: ClientTimeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            session_token: None,
            store_path: None,
            timeouts: ClientTimeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `DOCCHAT_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `DOCCHAT_SESSION_TOKEN`: auth cookie value
    /// - `DOCCHAT_STORE_PATH`: JSON file for persisted session ids
    /// - `DOCCHAT_REQUEST_TIMEOUT_SECS`: default 60
    /// - `DOCCHAT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if a timeout is set but not a positive
    /// integer, or the base URL has no http(s) scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("DOCCHAT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
        )?;
        let session_token = std::env::var("DOCCHAT_SESSION_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let store_path = std::env::var("DOCCHAT_STORE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let timeouts = ClientTimeouts {
            request_secs: env_parse_secs("DOCCHAT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_secs("DOCCHAT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { base_url, session_token, store_path, timeouts })
    }
}

/// Trim trailing slashes and require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for any other scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Parse(format!("invalid base URL: {raw}")));
    }
    Ok(trimmed.to_owned())
}

fn env_parse_secs(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigError::Parse(format!("{key} must be a positive integer, got '{raw}'"))),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
