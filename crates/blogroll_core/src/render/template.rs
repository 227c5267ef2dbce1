//! Named template registry with mustache-style placeholders.
//!
//! # Responsibility
//! - Compile template sources once, at registration.
//! - Expand a compiled template against a JSON context.
//!
//! # Invariants
//! - `{{ path }}` output is HTML-escaped; `{{{ path }}}` output is raw.
//! - Missing or null values expand to the empty string.
//! - A source with a stray `{{` or `}}`, or a brace glued onto a tag (e.g.
//!   `{{{ x }}`), is rejected at registration, never at render.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\{\s*([A-Za-z_][\w.]*)\s*\}\}\}|\{\{\s*([A-Za-z_][\w.]*)\s*\}\}")
        .expect("valid placeholder regex")
});

/// Template compilation/lookup error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Source contains a tag delimiter that is not part of a valid placeholder.
    Malformed { name: String, offset: usize },
    /// No template is registered under the requested name.
    NotFound(String),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { name, offset } => {
                write!(f, "template `{name}` has a malformed tag at byte {offset}")
            }
            Self::NotFound(name) => write!(f, "template not found: `{name}`"),
        }
    }
}

impl Error for TemplateError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Escaped(String),
    Raw(String),
}

#[derive(Debug, Clone)]
struct CompiledTemplate {
    segments: Vec<Segment>,
}

/// Registry of compiled templates addressed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, CompiledTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `source` and stores it under `name`, replacing any previous
    /// template with that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        let compiled = compile(&name, source)?;
        self.templates.insert(name, compiled);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Expands the template `name` with `context` as the data root.
    pub fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        let mut out = String::new();
        for segment in &template.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Escaped(path) => {
                    out.push_str(&escape_html(&stringify(lookup(context, path))))
                }
                Segment::Raw(path) => out.push_str(&stringify(lookup(context, path))),
            }
        }
        Ok(out)
    }
}

fn compile(name: &str, source: &str) -> Result<CompiledTemplate, TemplateError> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in PLACEHOLDER_RE.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(name, &mut segments, source, cursor, whole.start(), true)?;
        if let Some(raw) = caps.get(1) {
            segments.push(Segment::Raw(raw.as_str().to_string()));
        } else if let Some(escaped) = caps.get(2) {
            segments.push(Segment::Escaped(escaped.as_str().to_string()));
        }
        cursor = whole.end();
    }
    push_text(name, &mut segments, source, cursor, source.len(), false)?;

    Ok(CompiledTemplate { segments })
}

// Text between placeholders. `before_tag` is set when a placeholder follows
// at `end`; a placeholder always precedes `start` when `start > 0`.
fn push_text(
    name: &str,
    segments: &mut Vec<Segment>,
    source: &str,
    start: usize,
    end: usize,
    before_tag: bool,
) -> Result<(), TemplateError> {
    let text = &source[start..end];
    let malformed = text
        .find("{{")
        .or_else(|| text.find("}}"))
        .or_else(|| (start > 0 && text.starts_with('}')).then_some(0))
        .or_else(|| (before_tag && text.ends_with('{')).then(|| text.len() - 1));
    if let Some(offset) = malformed {
        return Err(TemplateError::Malformed {
            name: name.to_string(),
            offset: start + offset,
        });
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
    Ok(())
}

fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(context, |value, key| value.as_object()?.get(key))
}

fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| stringify(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => String::new(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '`' => escaped.push_str("&#x60;"),
            '=' => escaped.push_str("&#x3D;"),
            other => escaped.push(other),
        }
    }
    escaped
}
