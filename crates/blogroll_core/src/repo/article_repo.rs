//! Article repository contract and HTTP implementation.
//!
//! # Responsibility
//! - Provide list/create/update/delete/truncate over `/articles`.
//! - Decode list responses into field bags; keep other responses opaque.
//!
//! # Invariants
//! - Record addresses are always built from a concrete `ArticleId`.
//! - Every request is bounded by the client's timeout.

use crate::config::ClientConfig;
use crate::model::article::{ArticleId, EditableFields, FieldBag};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Opaque acknowledgement body returned by a mutation.
///
/// JSON bodies are parsed; any other text is wrapped as a JSON string; an
/// empty body is `null`.
pub type RemoteAck = Value;

/// Remote repository error.
#[derive(Debug)]
pub enum RepoError {
    /// Connection, timeout or body read failure.
    Transport(reqwest::Error),
    /// Server answered with a non-success status.
    Status {
        method: Method,
        url: String,
        status: u16,
    },
    /// Response body did not have the expected shape.
    Decode(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request failed: {err}"),
            Self::Status {
                method,
                url,
                status,
            } => write!(f, "{method} {url} returned HTTP {status}"),
            Self::Decode(message) => write!(f, "unexpected response body: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Status { .. } | Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for RepoError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Repository interface for the remote articles collection.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// `GET /articles`.
    async fn list_articles(&self) -> RepoResult<Vec<FieldBag>>;
    /// `POST /articles`.
    async fn create_article(&self, fields: &EditableFields) -> RepoResult<RemoteAck>;
    /// `PUT /articles/{id}`.
    async fn update_article(
        &self,
        article_id: ArticleId,
        fields: &EditableFields,
    ) -> RepoResult<RemoteAck>;
    /// `DELETE /articles/{id}`.
    async fn delete_article(&self, article_id: ArticleId) -> RepoResult<RemoteAck>;
    /// `DELETE /articles`.
    async fn delete_all_articles(&self) -> RepoResult<RemoteAck>;
}

/// HTTP-backed article repository.
#[derive(Debug, Clone)]
pub struct HttpArticleRepository {
    client: Client,
    base_url: String,
}

impl HttpArticleRepository {
    /// Uses an existing client; `base_url` is the origin serving `/articles`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client with the configured request timeout.
    pub fn from_config(config: &ClientConfig) -> RepoResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::new(client, config.base_url.as_str()))
    }

    pub fn collection_url(&self) -> String {
        format!("{}/articles", self.base_url)
    }

    pub fn record_url(&self, article_id: ArticleId) -> String {
        format!("{}/articles/{article_id}", self.base_url)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        fields: Option<&EditableFields>,
    ) -> RepoResult<Response> {
        debug!("event=remote_request module=repo method={method} url={url}");
        let mut request = self.client.request(method.clone(), url.as_str());
        if let Some(fields) = fields {
            request = request.json(fields);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::Status {
                method,
                url,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn acknowledge(
        &self,
        method: Method,
        url: String,
        fields: Option<&EditableFields>,
    ) -> RepoResult<RemoteAck> {
        let response = self.send(method, url, fields).await?;
        let text = response.text().await?;
        Ok(parse_ack(&text))
    }
}

#[async_trait]
impl ArticleRepository for HttpArticleRepository {
    async fn list_articles(&self) -> RepoResult<Vec<FieldBag>> {
        let response = self.send(Method::GET, self.collection_url(), None).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| RepoError::Decode(err.to_string()))?;
        decode_rows(body)
    }

    async fn create_article(&self, fields: &EditableFields) -> RepoResult<RemoteAck> {
        self.acknowledge(Method::POST, self.collection_url(), Some(fields))
            .await
    }

    async fn update_article(
        &self,
        article_id: ArticleId,
        fields: &EditableFields,
    ) -> RepoResult<RemoteAck> {
        self.acknowledge(Method::PUT, self.record_url(article_id), Some(fields))
            .await
    }

    async fn delete_article(&self, article_id: ArticleId) -> RepoResult<RemoteAck> {
        self.acknowledge(Method::DELETE, self.record_url(article_id), None)
            .await
    }

    async fn delete_all_articles(&self) -> RepoResult<RemoteAck> {
        self.acknowledge(Method::DELETE, self.collection_url(), None)
            .await
    }
}

fn parse_ack(text: &str) -> RemoteAck {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn decode_rows(body: Value) -> RepoResult<Vec<FieldBag>> {
    let Value::Array(items) = body else {
        return Err(RepoError::Decode("expected a JSON array of rows".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(fields),
            _ => Err(RepoError::Decode(format!("row {index} is not an object"))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_rows, parse_ack};
    use serde_json::{json, Value};

    #[test]
    fn ack_parses_json_then_falls_back_to_text() {
        assert_eq!(parse_ack("{\"rowCount\":1}"), json!({ "rowCount": 1 }));
        assert_eq!(parse_ack("insert complete"), json!("insert complete"));
        assert_eq!(parse_ack("  "), Value::Null);
    }

    #[test]
    fn decode_rows_rejects_non_array_and_non_object_rows() {
        assert!(decode_rows(json!({ "rows": [] })).is_err());
        assert!(decode_rows(json!([{ "title": "a" }, 3])).is_err());
        assert_eq!(decode_rows(json!([{ "title": "a" }])).unwrap().len(), 1);
    }
}
