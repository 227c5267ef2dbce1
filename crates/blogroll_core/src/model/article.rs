//! Article record and field-bag conversions.
//!
//! # Responsibility
//! - Hydrate an `Article` from an arbitrary field bag without defaults or
//!   failure.
//! - Expose the editable field subset sent on create/update.
//! - Parse `publishedOn` into a comparable timestamp.
//!
//! # Invariants
//! - `Article::from_fields(bag).to_fields() == bag` for bags without nulls
//!   or numeric-string ids.
//! - Editable fields never include identifiers.
//! - An explicit `null` on a known field is the same as an absent field.
//! - A known field with an unusable value is kept verbatim in `extra`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Server-assigned article identifier.
pub type ArticleId = i64;

/// Unstructured mapping of named attributes, as returned by the remote
/// collection or stored in the seed dataset.
pub type FieldBag = Map<String, Value>;

/// Error raised when a JSON value is not a field bag.
#[derive(Debug)]
pub struct ArticleFieldError {
    message: String,
}

impl ArticleFieldError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ArticleFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid article fields: {}", self.message)
    }
}

impl Error for ArticleFieldError {}

/// One blog article.
///
/// Every attribute is optional; the record carries whatever the caller
/// supplied. Attributes outside the known set land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldBag")]
pub struct Article {
    /// Remote primary key. Absent for records not yet created remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<ArticleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<ArticleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        rename = "authorUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub author_url: Option<String>,
    /// Markdown source (raw HTML allowed). Never rewritten by rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Publication timestamp as received. `None` marks a draft.
    #[serde(
        rename = "publishedOn",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub published_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Attributes outside the known set, plus known attributes whose value
    /// has an unusable type, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Field subset written on create/update.
///
/// Serializes to exactly six keys; absent values are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditableFields {
    pub author: Option<String>,
    #[serde(rename = "authorUrl")]
    pub author_url: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "publishedOn")]
    pub published_on: Option<String>,
    pub title: Option<String>,
}

impl Article {
    /// Builds an article from a field bag.
    ///
    /// No defaults are applied and nothing is rejected. Ids given as numeric
    /// strings are coerced; any other mismatch (e.g. a numeric `title`) stays
    /// in `extra` under its original key.
    pub fn from_fields(mut fields: FieldBag) -> Self {
        let article_id = take_field(&mut fields, "article_id", id_value);
        let author_id = take_field(&mut fields, "author_id", id_value);
        let author = take_field(&mut fields, "author", text_value);
        let author_url = take_field(&mut fields, "authorUrl", text_value);
        let body = take_field(&mut fields, "body", text_value);
        let category = take_field(&mut fields, "category", text_value);
        let published_on = take_field(&mut fields, "publishedOn", text_value);
        let title = take_field(&mut fields, "title", text_value);

        Self {
            article_id,
            author_id,
            author,
            author_url,
            body,
            category,
            published_on,
            title,
            extra: fields.into_iter().collect(),
        }
    }

    /// Builds an article from any JSON value; non-objects are rejected.
    pub fn from_value(value: Value) -> Result<Self, ArticleFieldError> {
        match value {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(ArticleFieldError::new(format!(
                "expected an object, got `{}`",
                json_kind(&other)
            ))),
        }
    }

    /// Returns the article as a field bag using wire names.
    pub fn to_fields(&self) -> FieldBag {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            // Struct with string keys always serializes to an object.
            _ => FieldBag::new(),
        }
    }

    /// Returns the editable subset sent on create/update.
    pub fn editable_fields(&self) -> EditableFields {
        EditableFields {
            author: self.author.clone(),
            author_url: self.author_url.clone(),
            body: self.body.clone(),
            category: self.category.clone(),
            published_on: self.published_on.clone(),
            title: self.title.clone(),
        }
    }

    /// Whether the article has no publication timestamp.
    pub fn is_draft(&self) -> bool {
        self.published_on
            .as_deref()
            .map(|value| value.trim().is_empty())
            .unwrap_or(true)
    }

    /// Parsed publication timestamp, if present and parseable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_on.as_deref().and_then(parse_published_on)
    }

    /// Sort key for newest-first ordering.
    ///
    /// Absent or unparseable timestamps collapse to the Unix epoch.
    pub fn published_sort_key(&self) -> i64 {
        self.published_at()
            .map(|ts| ts.timestamp_millis())
            .unwrap_or(0)
    }
}

impl From<FieldBag> for Article {
    fn from(fields: FieldBag) -> Self {
        Self::from_fields(fields)
    }
}

// Removes `key` from `fields` when `convert` accepts its value; `null` is
// dropped, rejected values are left in place.
fn take_field<T>(
    fields: &mut FieldBag,
    key: &str,
    convert: fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = fields.remove(key)?;
    if value.is_null() {
        return None;
    }
    match convert(&value) {
        Some(converted) => Some(converted),
        None => {
            fields.insert(key.to_string(), value);
            None
        }
    }
}

fn id_value(value: &Value) -> Option<ArticleId> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Parses a `publishedOn` value.
///
/// Accepts RFC 3339, naive `T`/space separated date-times (taken as UTC) and
/// bare dates (midnight UTC).
pub fn parse_published_on(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_published_on, Article, FieldBag};
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn parses_bare_date_as_utc_midnight() {
        let ts = parse_published_on("2020-03-01").expect("date should parse");
        assert_eq!((ts.year(), ts.month(), ts.day()), (2020, 3, 1));
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_published_on("2015-02-01T08:00:00.000Z").expect("rfc3339 should parse");
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn garbage_and_blank_do_not_parse() {
        assert!(parse_published_on("next tuesday").is_none());
        assert!(parse_published_on("   ").is_none());
    }

    #[test]
    fn blank_published_on_counts_as_draft() {
        let article = Article::from_value(json!({ "publishedOn": "" })).unwrap();
        assert!(article.is_draft());
        assert_eq!(article.published_sort_key(), 0);
    }

    #[test]
    fn numeric_string_ids_are_coerced() {
        let article =
            Article::from_value(json!({ "article_id": "2", "author_id": " 7 " })).unwrap();
        assert_eq!(article.article_id, Some(2));
        assert_eq!(article.author_id, Some(7));
        assert!(article.extra.is_empty());
    }

    #[test]
    fn deserialize_goes_through_field_bag_hydration() {
        let article: Article =
            serde_json::from_value(json!({ "article_id": "3", "title": false })).unwrap();
        assert_eq!(article.article_id, Some(3));
        assert_eq!(article.title, None);
        assert_eq!(article.extra.get("title"), Some(&json!(false)));
        let expected: FieldBag = [
            ("article_id".to_string(), json!(3)),
            ("title".to_string(), json!(false)),
        ]
        .into_iter()
        .collect();
        assert_eq!(article.to_fields(), expected);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        let err = Article::from_value(json!(["not", "a", "row"])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }
}
