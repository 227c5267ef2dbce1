//! Model layer for the blogroll article listing.
//! Hydrates articles from remote rows or a seed dataset, renders them to HTML
//! and keeps the remote collection in sync.

pub mod config;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;

pub use config::{parse_base_url, ClientConfig, ConfigError, SeedLocation};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::article::{
    parse_published_on, Article, ArticleFieldError, ArticleId, EditableFields, FieldBag,
};
pub use render::{
    ArticleRenderer, ArticleView, RenderError, TemplateError, TemplateRegistry,
    ARTICLE_TEMPLATE_NAME, DEFAULT_ARTICLE_TEMPLATE, DRAFT_MARKER,
};
pub use repo::article_repo::{
    ArticleRepository, HttpArticleRepository, RemoteAck, RepoError, RepoResult,
};
pub use seed::{FileSeed, HttpSeed, SeedError, SeedProvider};
pub use service::article_service::{ArticleService, ArticleServiceError, FetchReport};
pub use store::ArticleStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
