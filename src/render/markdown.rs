// src/render/markdown.rs

//! Markdown parsing stage.

use comrak::{Options, markdown_to_html};

use super::RenderConfig;

/// Convert Markdown text into an HTML fragment.
///
/// Raw inline HTML is passed through untouched here; the sanitizer is the
/// security boundary, and stripping at that single point keeps the
/// allow-list authoritative. Comrak recovers from any malformed input with
/// a well-formed tree, so this stage has no failure mode.
pub fn to_fragment(text: &str, config: &RenderConfig) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.superscript = true;
    options.extension.table = config.tables;
    options.render.hardbreaks = config.hardbreaks;
    options.render.r#unsafe = true;

    markdown_to_html(text, &options)
}

/// Strip a single enclosing `<p>…</p>` so a title renders inline.
///
/// Fires only when the whole trimmed fragment is exactly one paragraph: the
/// inner content must not contain another paragraph boundary. Fragments with
/// multiple top-level nodes, or wrapped in anything other than a paragraph,
/// pass through unchanged.
pub fn unwrap_paragraph(fragment: &str) -> String {
    let trimmed = fragment.trim();
    if let Some(inner) = trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
    {
        if !inner.contains("<p>") && !inner.contains("</p>") {
            return inner.to_string();
        }
    }
    fragment.to_string()
}
