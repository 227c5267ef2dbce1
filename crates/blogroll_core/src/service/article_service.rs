//! Article use-case service.
//!
//! # Responsibility
//! - Fetch the remote collection into a store, seeding an empty remote first.
//! - Provide create/update/delete/truncate entry points that log the remote
//!   acknowledgement.
//!
//! # Invariants
//! - Seeding runs at most once per `fetch_all` call and waits for every
//!   insert to acknowledge before re-listing.
//! - `fetch_all` always resolves: rows loaded, or a terminal error.
//! - update/delete never issue a request for an article without an id.
//! - The store is never touched by mutations, including delete.

use crate::config::ClientConfig;
use crate::model::article::Article;
use crate::repo::article_repo::{ArticleRepository, RemoteAck, RepoError};
use crate::seed::{SeedError, SeedProvider};
use crate::store::ArticleStore;
use futures::{stream, StreamExt};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_MAX_FETCH_ATTEMPTS: u32 = 3;
const SEED_INSERT_PARALLELISM: usize = 8;

/// Service error for article use-cases.
#[derive(Debug)]
pub enum ArticleServiceError {
    /// Remote request failed.
    Repo(RepoError),
    /// Seed dataset could not be loaded.
    Seed(SeedError),
    /// Seed inserts were dispatched but some were not acknowledged.
    SeedInsert {
        failed: usize,
        total: usize,
        first: RepoError,
    },
    /// update/delete requested for an article without `article_id`.
    MissingId(&'static str),
    /// Remote collection stayed empty for every allowed attempt.
    RemoteStillEmpty { attempts: u32 },
}

impl Display for ArticleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Seed(err) => write!(f, "{err}"),
            Self::SeedInsert {
                failed,
                total,
                first,
            } => write!(f, "{failed} of {total} seed inserts failed; first: {first}"),
            Self::MissingId(operation) => {
                write!(f, "cannot {operation} an article without article_id")
            }
            Self::RemoteStillEmpty { attempts } => {
                write!(f, "remote collection still empty after {attempts} attempts")
            }
        }
    }
}

impl Error for ArticleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Seed(err) => Some(err),
            Self::SeedInsert { first, .. } => Some(first),
            Self::MissingId(_) | Self::RemoteStillEmpty { .. } => None,
        }
    }
}

impl From<RepoError> for ArticleServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SeedError> for ArticleServiceError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

/// Outcome of a successful `fetch_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    /// Articles appended to the store.
    pub loaded: usize,
    /// Seed records inserted remotely during this call.
    pub seeded: usize,
    /// List requests issued, including the successful one.
    pub attempts: u32,
}

/// Article service facade over a remote repository and a seed source.
pub struct ArticleService<R: ArticleRepository, S: SeedProvider> {
    repo: R,
    seed: S,
    max_fetch_attempts: u32,
}

impl<R: ArticleRepository, S: SeedProvider> ArticleService<R, S> {
    pub fn new(repo: R, seed: S) -> Self {
        Self {
            repo,
            seed,
            max_fetch_attempts: DEFAULT_MAX_FETCH_ATTEMPTS,
        }
    }

    /// Creates a service with attempt bounds taken from `config`.
    pub fn from_config(repo: R, seed: S, config: &ClientConfig) -> Self {
        Self::new(repo, seed).with_max_fetch_attempts(config.max_fetch_attempts)
    }

    /// Sets the list attempt bound; values below 1 are raised to 1.
    pub fn with_max_fetch_attempts(mut self, attempts: u32) -> Self {
        self.max_fetch_attempts = attempts.max(1);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Loads the remote collection into `store`.
    ///
    /// # Contract
    /// - Non-empty remote: rows are loaded newest-first and the call returns.
    /// - Empty remote: the seed dataset is inserted (once), then the remote
    ///   is listed again, up to `max_fetch_attempts` list requests in total.
    /// - Seed failures are logged and returned; nothing is retried.
    pub async fn fetch_all(
        &self,
        store: &mut ArticleStore,
    ) -> Result<FetchReport, ArticleServiceError> {
        let mut seeded = None;

        for attempt in 1..=self.max_fetch_attempts {
            let rows = self.repo.list_articles().await?;
            if !rows.is_empty() {
                let loaded = store.load_rows(rows);
                info!(
                    "event=articles_fetch module=service status=ok loaded={} attempt={}",
                    loaded, attempt
                );
                return Ok(FetchReport {
                    loaded,
                    seeded: seeded.unwrap_or(0),
                    attempts: attempt,
                });
            }

            if seeded.is_some() {
                warn!(
                    "event=articles_fetch module=service status=empty attempt={} after_seed=true",
                    attempt
                );
                continue;
            }

            info!(
                "event=articles_fetch module=service status=empty attempt={} action=seed",
                attempt
            );
            seeded = Some(self.seed_remote().await.inspect_err(|err| {
                error!("event=articles_seed module=service status=error error={err}");
            })?);
        }

        Err(ArticleServiceError::RemoteStillEmpty {
            attempts: self.max_fetch_attempts,
        })
    }

    /// Inserts every seed record and waits for all acknowledgements.
    async fn seed_remote(&self) -> Result<usize, ArticleServiceError> {
        let records = self.seed.load_seed().await?;
        let payloads: Vec<_> = records
            .into_iter()
            .map(|fields| Article::from_fields(fields).editable_fields())
            .collect();
        let total = payloads.len();

        let outcomes = stream::iter(payloads.iter())
            .map(|fields| self.repo.create_article(fields))
            .buffer_unordered(SEED_INSERT_PARALLELISM)
            .collect::<Vec<_>>()
            .await;

        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(ack) => info!("event=article_create module=service status=ok ack={ack}"),
                Err(err) => failures.push(err),
            }
        }
        let failed = failures.len();
        if let Some(first) = failures.into_iter().next() {
            return Err(ArticleServiceError::SeedInsert {
                failed,
                total,
                first,
            });
        }

        info!(
            "event=articles_seed module=service status=ok inserted={}",
            total
        );
        Ok(total)
    }

    /// Creates `article` remotely from its editable fields.
    pub async fn create_article(
        &self,
        article: &Article,
    ) -> Result<RemoteAck, ArticleServiceError> {
        let ack = self.repo.create_article(&article.editable_fields()).await?;
        info!("event=article_create module=service status=ok ack={ack}");
        Ok(ack)
    }

    /// Replaces the remote record addressed by `article.article_id`.
    pub async fn update_article(
        &self,
        article: &Article,
    ) -> Result<RemoteAck, ArticleServiceError> {
        let article_id = article
            .article_id
            .ok_or(ArticleServiceError::MissingId("update"))?;
        let ack = self
            .repo
            .update_article(article_id, &article.editable_fields())
            .await?;
        info!(
            "event=article_update module=service status=ok article_id={} ack={}",
            article_id, ack
        );
        Ok(ack)
    }

    /// Deletes the remote record addressed by `article.article_id`.
    ///
    /// The article stays in any store it was loaded into.
    pub async fn delete_article(
        &self,
        article: &Article,
    ) -> Result<RemoteAck, ArticleServiceError> {
        let article_id = article
            .article_id
            .ok_or(ArticleServiceError::MissingId("delete"))?;
        let ack = self.repo.delete_article(article_id).await?;
        info!(
            "event=article_delete module=service status=ok article_id={} ack={}",
            article_id, ack
        );
        Ok(ack)
    }

    /// Deletes every remote record.
    pub async fn truncate_table(&self) -> Result<RemoteAck, ArticleServiceError> {
        let ack = self.repo.delete_all_articles().await?;
        info!("event=articles_truncate module=service status=ok ack={ack}");
        Ok(ack)
    }
}
