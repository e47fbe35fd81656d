//! Configuration for the todo workflow.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that fail to parse fall back to their default.

use crate::session::DEFAULT_SESSION_KEY;
use crate::types::DEFAULT_BULK_COUNT;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the backend API (`TODO_API_URL`)
    pub api_url: String,
    /// Directory of the file session store (`TODO_SESSION_DIR`)
    pub session_dir: PathBuf,
    /// Key the session is stored under (`TODO_SESSION_KEY`)
    pub session_key: String,
    /// Todos created by one bulk run (`TODO_BULK_COUNT`)
    pub bulk_count: usize,
    /// Create requests in flight during a bulk run (`TODO_BULK_CONCURRENCY`)
    pub bulk_concurrency: usize,
    /// Per-request timeout, transport default when unset (`TODO_REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Option<Duration>,
    /// Default log filter when `RUST_LOG` is unset (`TODO_LOG_LEVEL`)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:1337/api".to_string(),
            session_dir: PathBuf::from(".todo-session"),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            bulk_count: DEFAULT_BULK_COUNT,
            bulk_concurrency: 1,
            request_timeout: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_url: lookup("TODO_API_URL").unwrap_or(defaults.api_url),
            session_dir: lookup("TODO_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
            session_key: lookup("TODO_SESSION_KEY").unwrap_or(defaults.session_key),
            bulk_count: lookup("TODO_BULK_COUNT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bulk_count),
            bulk_concurrency: lookup("TODO_BULK_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .map_or(defaults.bulk_concurrency, |n| n.min(Semaphore::MAX_PERMITS)),
            request_timeout: lookup("TODO_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs),
            log_level: lookup("TODO_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}
