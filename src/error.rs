//! Error types for the alerter
//!
//! Errors are classified by where they stop:
//! - Transient: network issues, timeouts, bad upstream status. Logged, the
//!   current fetch/lookup/delivery is abandoned, the next cycle proceeds.
//! - Store: cache backing failures. Logged, never surfaced to the evaluator.
//! - Config: missing or invalid startup parameters. Fatal.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of any outbound HTTP call (feed, watchlist, adsbdb, webhook).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned status {status}")]
    Status { status: u16 },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Returns true if the next scheduled attempt may succeed without any
    /// configuration change.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Timeout | FetchError::Status { .. }
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Errors from the enrichment cache backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),
}

/// Notification delivery failure.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Delivery failed: {0}")]
    Delivery(#[from] FetchError),
}

/// Startup configuration errors. Any of these stops the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to open enrichment cache: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
