//! Client configuration.
//!
//! Values come from [`StoreConfig::default`], builder setters, or the
//! environment via [`StoreConfig::from_env`].

use std::time::Duration;

use thiserror::Error;

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Address of the public Platzi Fake Store API.
pub const DEFAULT_BASE_URL: &str = "https://api.escuelajs.co/api/v1";

/// Overrides [`StoreConfig::base_url`].
pub const ENV_BASE_URL: &str = "FAKESTORE_BASE_URL";
/// Overrides [`StoreConfig::cache_capacity`].
pub const ENV_CACHE_CAPACITY: &str = "FAKESTORE_CACHE_CAPACITY";
/// Overrides [`StoreConfig::timeout`], in whole seconds. `0` disables it.
pub const ENV_TIMEOUT_SECS: &str = "FAKESTORE_TIMEOUT_SECS";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Settings shared by a [`Store`](crate::store::Store) and its transport.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fakestore::config::StoreConfig;
///
/// let config = StoreConfig::default()
///     .base_url("http://127.0.0.1:8080/api/v1/")
///     .cache_capacity(32)
///     .timeout(Some(Duration::from_secs(5)));
///
/// assert_eq!(config.base_url, "http://127.0.0.1:8080/api/v1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// API root without a trailing slash.
    pub base_url: String,
    /// Maximum number of cached GET responses.
    pub cache_capacity: u64,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl StoreConfig {
    /// Reads overrides from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.base_url(url);
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            config.cache_capacity = parse_number(ENV_CACHE_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = match parse_number(ENV_TIMEOUT_SECS, &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            };
        }

        Ok(config)
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_owned(),
    })
}
