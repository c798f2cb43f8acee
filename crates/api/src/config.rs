//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use common::notice::DEFAULT_NOTICE_TTL;

/// Backend used when `BACKEND_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:7777/api";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `BACKEND_URL`: ticketing backend base URL (default:
///   `"http://localhost:7777/api"`); an empty value books offline
/// - `DATA_DIR`: directory for `storage.json`; unset keeps state in memory
/// - `NOTICE_TTL_SECS`: seconds a notice stays visible (default: `5`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub backend_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub notice_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            backend_url: match lookup("BACKEND_URL") {
                Some(url) if url.trim().is_empty() => None,
                Some(url) => Some(url),
                None => defaults.backend_url,
            },
            data_dir: lookup("DATA_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
            notice_ttl: lookup("NOTICE_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.notice_ttl),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            backend_url: Some(DEFAULT_BACKEND_URL.to_string()),
            data_dir: None,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}
