//! Client configuration.
//!
//! # Responsibility
//! - Hold remote endpoint, seed location and fetch bounds in one place.
//! - Read overrides from environment-style key lookups.
//!
//! # Invariants
//! - `max_fetch_attempts >= 1` and `request_timeout > 0` after construction.

use crate::render::ARTICLE_TEMPLATE_NAME;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "BLOGROLL_BASE_URL";
pub const ENV_SEED: &str = "BLOGROLL_SEED";
pub const ENV_TEMPLATE: &str = "BLOGROLL_TEMPLATE";
pub const ENV_FETCH_ATTEMPTS: &str = "BLOGROLL_FETCH_ATTEMPTS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "BLOGROLL_REQUEST_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SEED_PATH: &str = "data/hackerIpsum.json";
const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value `{}` for {}: {}",
            self.value, self.key, self.reason
        )
    }
}

impl Error for ConfigError {}

/// Where the seed dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedLocation {
    File(PathBuf),
    Url(String),
}

impl SeedLocation {
    /// `http://`/`https://` values are URLs, anything else a file path.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin serving `/articles`.
    pub base_url: String,
    pub seed: SeedLocation,
    pub template_name: String,
    /// Total list attempts per fetch, including the re-list after seeding.
    pub max_fetch_attempts: u32,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            seed: SeedLocation::File(PathBuf::from(DEFAULT_SEED_PATH)),
            template_name: ARTICLE_TEMPLATE_NAME.to_string(),
            max_fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults plus values returned by `lookup`.
    ///
    /// Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_BASE_URL) {
            config.base_url = parse_base_url(ENV_BASE_URL, &value)?;
        }
        if let Some(value) = get(ENV_SEED) {
            config.seed = SeedLocation::parse(&value);
        }
        if let Some(value) = get(ENV_TEMPLATE) {
            config.template_name = value.trim().to_string();
        }
        if let Some(value) = get(ENV_FETCH_ATTEMPTS) {
            config.max_fetch_attempts = parse_positive(ENV_FETCH_ATTEMPTS, &value)? as u32;
        }
        if let Some(value) = get(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout =
                Duration::from_secs(parse_positive(ENV_REQUEST_TIMEOUT_SECS, &value)?);
        }

        Ok(config)
    }
}

/// Validates an `http(s)` origin and strips trailing slashes.
///
/// `key` names the source of `value` (env var or CLI flag) in the error.
pub fn parse_base_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "expected an http(s) URL",
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    let invalid = |reason| ConfigError {
        key,
        value: value.to_string(),
        reason,
    };
    let parsed = value
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid("expected a positive integer"))?;
    if parsed == 0 {
        return Err(invalid("must be at least 1"));
    }
    Ok(u64::from(parsed))
}
