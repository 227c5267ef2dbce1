//! Seed dataset sources.
//!
//! # Responsibility
//! - Load the static dataset used to populate an empty remote collection.
//!
//! # Invariants
//! - A dataset is a JSON array of objects; anything else is a decode error.

use crate::config::ClientConfig;
use crate::model::article::FieldBag;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Seed loading failure.
#[derive(Debug)]
pub enum SeedError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Transport(reqwest::Error),
    Status {
        url: String,
        status: u16,
    },
    Decode(String),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read seed file `{}`: {source}", path.display())
            }
            Self::Transport(err) => write!(f, "seed request failed: {err}"),
            Self::Status { url, status } => write!(f, "seed url {url} returned HTTP {status}"),
            Self::Decode(message) => write!(f, "invalid seed dataset: {message}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Transport(err) => Some(err),
            Self::Status { .. } | Self::Decode(_) => None,
        }
    }
}

/// Source of seed records.
#[async_trait]
pub trait SeedProvider: Send + Sync {
    async fn load_seed(&self) -> Result<Vec<FieldBag>, SeedError>;
}

#[async_trait]
impl<T: SeedProvider + ?Sized> SeedProvider for Box<T> {
    async fn load_seed(&self) -> Result<Vec<FieldBag>, SeedError> {
        (**self).load_seed().await
    }
}

/// Seed dataset stored as a local JSON file.
#[derive(Debug, Clone)]
pub struct FileSeed {
    path: PathBuf,
}

impl FileSeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeedProvider for FileSeed {
    async fn load_seed(&self) -> Result<Vec<FieldBag>, SeedError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SeedError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_seed(&text)
    }
}

/// Seed dataset served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSeed {
    client: Client,
    url: String,
}

impl HttpSeed {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Builds a client with the configured request timeout.
    pub fn from_config(url: impl Into<String>, config: &ClientConfig) -> Result<Self, SeedError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(SeedError::Transport)?;
        Ok(Self::new(client, url))
    }
}

#[async_trait]
impl SeedProvider for HttpSeed {
    async fn load_seed(&self) -> Result<Vec<FieldBag>, SeedError> {
        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(SeedError::Transport)?;
        if !response.status().is_success() {
            return Err(SeedError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }
        let text = response.text().await.map_err(SeedError::Transport)?;
        parse_seed(&text)
    }
}

/// Parses a seed dataset document.
pub fn parse_seed(text: &str) -> Result<Vec<FieldBag>, SeedError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| SeedError::Decode(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(SeedError::Decode("expected a JSON array".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(fields),
            _ => Err(SeedError::Decode(format!("record {index} is not an object"))),
        })
        .collect()
}
