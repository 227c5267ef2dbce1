//! Article rendering.
//!
//! # Responsibility
//! - Derive presentation fields (`daysAgo`, `publishStatus`, HTML body).
//! - Expand the article template with the derived view as context.
//!
//! # Invariants
//! - Rendering never mutates the article; the stored `body` stays Markdown.
//! - Rendering the same article at the same instant is idempotent.

pub mod markdown;
pub mod template;

use crate::model::article::{Article, ArticleId};
use crate::store::ArticleStore;
use chrono::{DateTime, Utc};
use comrak::ComrakOptions;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use template::{TemplateError, TemplateRegistry};

/// Name under which the article template is looked up by default.
pub const ARTICLE_TEMPLATE_NAME: &str = "article-template";

/// Status shown for articles without a publication timestamp.
pub const DRAFT_MARKER: &str = "(draft)";

/// Bundled article template.
pub const DEFAULT_ARTICLE_TEMPLATE: &str = include_str!("../../templates/article.html");

/// Render failure.
#[derive(Debug)]
pub enum RenderError {
    /// Article has no `body` to convert.
    MissingBody(Option<ArticleId>),
    Template(TemplateError),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBody(Some(id)) => write!(f, "article {id} has no body"),
            Self::MissingBody(None) => write!(f, "article has no body"),
            Self::Template(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingBody(_) => None,
            Self::Template(err) => Some(err),
        }
    }
}

impl From<TemplateError> for RenderError {
    fn from(value: TemplateError) -> Self {
        Self::Template(value)
    }
}

/// Render-only projection of an article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleView {
    /// Whole days since publication, truncated toward zero. `None` for
    /// drafts and unparseable timestamps.
    pub days_ago: Option<i64>,
    pub publish_status: String,
    pub body_html: String,
    fields: Value,
}

impl ArticleView {
    /// Template context: article fields with `body` replaced by HTML plus
    /// `daysAgo` and `publishStatus`.
    pub fn to_context(&self) -> Value {
        let mut context = self.fields.clone();
        if let Value::Object(map) = &mut context {
            map.insert("body".to_string(), Value::String(self.body_html.clone()));
            map.insert(
                "daysAgo".to_string(),
                self.days_ago.map(Value::from).unwrap_or(Value::Null),
            );
            map.insert(
                "publishStatus".to_string(),
                Value::String(self.publish_status.clone()),
            );
        }
        context
    }
}

/// Article renderer bound to a template registry.
#[derive(Debug)]
pub struct ArticleRenderer {
    templates: TemplateRegistry,
    template_name: String,
    options: ComrakOptions,
}

impl ArticleRenderer {
    /// Renderer looking up [`ARTICLE_TEMPLATE_NAME`] in `templates`.
    pub fn new(templates: TemplateRegistry) -> Self {
        Self {
            templates,
            template_name: ARTICLE_TEMPLATE_NAME.to_string(),
            options: markdown::markdown_options(),
        }
    }

    /// Renderer with the bundled template registered.
    pub fn with_default_template() -> Result<Self, TemplateError> {
        let mut templates = TemplateRegistry::new();
        templates.register(ARTICLE_TEMPLATE_NAME, DEFAULT_ARTICLE_TEMPLATE)?;
        Ok(Self::new(templates))
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = name.into();
        self
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Derives the render-only view of `article` as of `now`.
    pub fn view_at(
        &self,
        article: &Article,
        now: DateTime<Utc>,
    ) -> Result<ArticleView, RenderError> {
        let body = article
            .body
            .as_deref()
            .ok_or(RenderError::MissingBody(article.article_id))?;

        let days_ago = if article.is_draft() {
            None
        } else {
            article
                .published_at()
                .map(|published| (now - published).num_days())
        };
        let publish_status = match days_ago {
            Some(days) => format!("published {days} days ago"),
            None => DRAFT_MARKER.to_string(),
        };

        Ok(ArticleView {
            days_ago,
            publish_status,
            body_html: markdown::markdown_to_html(body, &self.options),
            fields: Value::Object(article.to_fields()),
        })
    }

    /// Renders `article` to markup as of `now`.
    pub fn render_at(&self, article: &Article, now: DateTime<Utc>) -> Result<String, RenderError> {
        let view = self.view_at(article, now)?;
        Ok(self
            .templates
            .render(&self.template_name, &view.to_context())?)
    }

    /// Renders `article` to markup as of the current time.
    pub fn render(&self, article: &Article) -> Result<String, RenderError> {
        self.render_at(article, Utc::now())
    }

    /// Renders every stored article in store order.
    pub fn render_all(&self, store: &ArticleStore) -> Result<Vec<String>, RenderError> {
        let now = Utc::now();
        store
            .iter()
            .map(|article| self.render_at(article, now))
            .collect()
    }
}
