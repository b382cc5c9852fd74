//! Client configuration
//!
//! Loads the media server location, API key and client tunables from environment
//! variables, with command-line flags layered on top by the binary.

use chrono::Duration as ChronoDuration;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Server used when `JELLYFIN_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:8096";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Poster bounds used for image URLs
pub const POSTER_MAX_WIDTH: u32 = 300;
pub const POSTER_MAX_HEIGHT: u32 = 450;

/// Errors raised while assembling a `Config`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No API key in the environment or on the command line
    #[error("Missing API key: set JELLYFIN_API_KEY or pass --api-key")]
    MissingApiKey,

    /// An environment variable held something that does not parse
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings fixed at client construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Media server root, without a trailing slash
    pub base_url: String,
    /// Static token sent with every request
    pub api_key: String,
    /// Timeout applied to each request
    pub timeout: Duration,
    /// Default lifetime of cached responses
    pub cache_ttl: ChronoDuration,
    pub poster_max_width: u32,
    pub poster_max_height: u32,
}

impl Config {
    /// Creates a Config for `base_url` and `api_key` with default tunables
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: ChronoDuration::seconds(crate::cache::DEFAULT_TTL_SECS),
            poster_max_width: POSTER_MAX_WIDTH,
            poster_max_height: POSTER_MAX_HEIGHT,
        }
    }

    /// Loads configuration from environment variables
    ///
    /// # Environment Variables
    /// - `JELLYFIN_BASE_URL` - Server root (default: http://localhost:8096)
    /// - `JELLYFIN_API_KEY` - API token (required)
    /// - `PELIS_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
    /// - `PELIS_CACHE_TTL_SECS` - Cache lifetime in seconds (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("JELLYFIN_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = lookup("JELLYFIN_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(base_url, api_key);

        if let Some(secs) = parse_var(&lookup, "PELIS_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("PELIS_CACHE_TTL_SECS") {
            config.cache_ttl = parse_ttl(&value).ok_or(ConfigError::InvalidValue {
                name: "PELIS_CACHE_TTL_SECS",
                value,
            })?;
        }

        Ok(config)
    }

    /// Applies command-line overrides on top of an environment lookup
    ///
    /// An API key given here satisfies the requirement even when the
    /// environment has none.
    pub fn from_lookup_with_overrides<F>(
        lookup: F,
        base_url: Option<&str>,
        api_key: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_lookup(|name| match (name, api_key) {
            ("JELLYFIN_API_KEY", Some(key)) => Some(key.to_string()),
            _ => lookup(name),
        })?;

        if let Some(url) = base_url {
            config.base_url = normalize_base_url(url);
        }
        if let Some(secs) = timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

/// Parses a non-negative number of seconds that fits a `chrono` duration
fn parse_ttl(value: &str) -> Option<ChronoDuration> {
    let secs: i64 = value.trim().parse().ok()?;
    if secs < 0 {
        return None;
    }
    ChronoDuration::try_seconds(secs)
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
