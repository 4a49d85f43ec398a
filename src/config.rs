//! Runtime configuration resolved from the environment.

use std::time::Duration;

/// Connection settings for the collection backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL the labels and searches routes live under.
    pub api_base: String,
    /// Optional timeout applied to every store request. None by default:
    /// a hung store blocks the loop rather than surfacing a spurious error.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Resolve configuration from the environment.
    pub fn from_env() -> Self {
        let api_base = std::env::var("LABELMINE_API_BASE")
            .unwrap_or_else(|_| "http://localhost:9000/api/v2".to_string());
        let request_timeout = std::env::var("LABELMINE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs);

        Self {
            api_base,
            request_timeout,
        }
    }
}
