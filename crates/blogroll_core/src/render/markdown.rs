//! Markdown to HTML conversion.

use comrak::ComrakOptions;

/// GFM-flavoured options; raw HTML in the source passes through unchanged.
pub fn markdown_options() -> ComrakOptions {
    let mut option = ComrakOptions::default();
    option.extension.strikethrough = true;
    option.extension.autolink = true;
    option.extension.table = true;
    option.extension.footnotes = true;
    option.render.unsafe_ = true;
    option
}

/// Converts Markdown source to HTML.
pub fn markdown_to_html(source: &str, options: &ComrakOptions) -> String {
    comrak::markdown_to_html(source, options)
}
