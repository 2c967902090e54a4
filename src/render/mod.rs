// src/render/mod.rs

//! Content rendering pipeline for author-supplied text.
//!
//! Raw Markdown from posts and comments is turned into a subset of HTML that
//! is safe to embed directly into a page:
//!
//! 1. Markdown → HTML ([`markdown`])
//! 2. allow-list sanitization ([`sanitize`])
//! 3. auto-linking of bare URLs and emails ([`linkify`])
//!
//! Two profiles exist: [`RenderConfig::body`] for post/comment bodies and
//! [`RenderConfig::title`] for post titles (inline elements only, with the
//! enclosing paragraph unwrapped). The pipeline is stateless and total:
//! the same input and config always produce the same output, and malformed
//! or adversarial input degrades to stripped text, never an error.

pub mod linkify;
pub mod markdown;
pub mod sanitize;

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Immutable configuration for one rendering profile.
///
/// The allow-lists are the security boundary: anything not named here is
/// removed from the output. Values are built once per process via
/// [`RenderConfig::body`] / [`RenderConfig::title`] but the type is a plain
/// value object, so tests (or future per-tenant setups) can construct their
/// own.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Elements kept by the sanitizer. Everything else is stripped,
    /// preserving child content.
    pub elements: HashSet<&'static str>,
    /// Attributes permitted on every allowed element.
    pub generic_attributes: HashSet<&'static str>,
    /// Additional attributes permitted per element.
    pub element_attributes: HashMap<&'static str, HashSet<&'static str>>,
    /// URL schemes accepted in `href`/`src` values; anything else (including
    /// `javascript:`) loses the attribute.
    pub url_schemes: HashSet<&'static str>,
    /// Input is truncated (at a char boundary) beyond this many bytes before
    /// parsing, bounding CPU spent on adversarial input.
    pub max_input_bytes: usize,
    /// Enable Markdown table syntax.
    pub tables: bool,
    /// Render single newlines as hard line breaks.
    pub hardbreaks: bool,
    /// Strip a single enclosing `<p>` from the parsed fragment (titles only).
    pub unwrap_paragraph: bool,
}

impl RenderConfig {
    /// Full allow-list for post and comment bodies: block and inline
    /// elements, fenced code blocks with language classes, tables.
    pub fn body() -> Self {
        Self {
            elements: HashSet::from([
                "a", "abbr", "acronym", "b", "blockquote", "code", "em", "i", "li", "ol",
                "pre", "strong", "ul", "h1", "h2", "h3", "h4", "p", "br", "hr", "img",
                "table", "thead", "tbody", "tr", "th", "td", "del", "kbd", "s", "sup",
                "sub",
            ]),
            generic_attributes: HashSet::from(["class", "id"]),
            element_attributes: HashMap::from([
                ("a", HashSet::from(["href", "title", "target"])),
                ("img", HashSet::from(["src", "alt", "title"])),
                ("code", HashSet::from(["class"])),
            ]),
            url_schemes: HashSet::from(["http", "https", "mailto"]),
            max_input_bytes: 64 * 1024,
            tables: true,
            hardbreaks: true,
            unwrap_paragraph: false,
        }
    }

    /// Restricted allow-list for post titles: inline elements only, a strict
    /// subset of the body set. The enclosing paragraph produced by the parser
    /// is unwrapped so titles render inline.
    pub fn title() -> Self {
        Self {
            elements: HashSet::from([
                "a", "strong", "em", "code", "del", "sup", "sub", "kbd",
            ]),
            generic_attributes: HashSet::new(),
            element_attributes: HashMap::from([(
                "a",
                HashSet::from(["href", "title", "target"]),
            )]),
            url_schemes: HashSet::from(["http", "https", "mailto"]),
            max_input_bytes: 4 * 1024,
            tables: false,
            hardbreaks: false,
            unwrap_paragraph: true,
        }
    }
}

static BODY_CONFIG: LazyLock<RenderConfig> = LazyLock::new(RenderConfig::body);
static TITLE_CONFIG: LazyLock<RenderConfig> = LazyLock::new(RenderConfig::title);

/// Render a post or comment body to safe HTML.
pub fn render_body(text: &str) -> String {
    render(text, &BODY_CONFIG)
}

/// Render a post title to safe inline HTML (no enclosing paragraph).
pub fn render_title(text: &str) -> String {
    render(text, &TITLE_CONFIG)
}

/// Run the full pipeline under an explicit configuration.
///
/// Empty input yields an empty string; callers holding optional text should
/// pass `text.unwrap_or_default()` and get the same result.
pub fn render(text: &str, config: &RenderConfig) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = clamp(text, config.max_input_bytes);

    let mut fragment = markdown::to_fragment(text, config);
    if config.unwrap_paragraph {
        fragment = markdown::unwrap_paragraph(&fragment);
    }
    let cleaned = sanitize::clean_fragment(&fragment, config);
    linkify::linkify(&cleaned)
}

/// Truncate to at most `max` bytes without splitting a UTF-8 sequence.
fn clamp(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
