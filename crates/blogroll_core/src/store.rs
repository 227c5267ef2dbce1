//! In-memory article collection.
//!
//! # Responsibility
//! - Own every article loaded during an application session.
//! - Order each loaded batch newest-first.
//!
//! # Invariants
//! - Loading only appends; earlier batches are never re-sorted or deduplicated.
//! - Within one batch, order is descending by `publishedOn`; ties keep input
//!   order.
//! - The collection is emptied only through `clear()`.

use crate::model::article::{Article, ArticleId, FieldBag};
use log::debug;
use std::cmp::Reverse;

/// Explicitly owned article collection.
///
/// Created once at application start and passed to the operations that fill
/// or read it.
#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts one batch newest-first and appends it.
    pub fn load_all(&mut self, mut batch: Vec<Article>) {
        batch.sort_by_key(|article| Reverse(article.published_sort_key()));
        debug!(
            "event=store_load module=store status=ok batch={} total_before={}",
            batch.len(),
            self.articles.len()
        );
        self.articles.extend(batch);
    }

    /// Hydrates raw rows and loads them as one batch.
    ///
    /// Returns the number of appended articles; every row is kept.
    pub fn load_rows(&mut self, rows: Vec<FieldBag>) -> usize {
        let batch: Vec<_> = rows.into_iter().map(Article::from_fields).collect();
        let loaded = batch.len();
        self.load_all(batch);
        loaded
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    pub fn as_slice(&self) -> &[Article] {
        &self.articles
    }

    /// First loaded article carrying `article_id`.
    pub fn find(&self, article_id: ArticleId) -> Option<&Article> {
        self.articles
            .iter()
            .find(|article| article.article_id == Some(article_id))
    }

    /// Drops every loaded article (logout/reset).
    pub fn clear(&mut self) {
        debug!(
            "event=store_clear module=store status=ok dropped={}",
            self.articles.len()
        );
        self.articles.clear();
    }
}
