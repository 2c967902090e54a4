// src/render/sanitize.rs

//! Allow-list HTML sanitization stage.

use ammonia::Builder;

use super::RenderConfig;

/// Reduce an HTML fragment to the allow-listed subset.
///
/// Elements outside the allow-list lose their tags but keep their children;
/// `script` and `style` are discarded together with their content since that
/// content is not renderable text. Attributes not in the per-element or
/// generic sets are dropped, and `href`/`src` values must carry an allowed
/// URL scheme. The `rel` attribute on anchors is sanitizer-managed and
/// forced to `noopener noreferrer`.
///
/// Parsing is tolerant: unbalanced or adversarial markup never fails, the
/// worst case is a maximally-stripped fragment.
pub fn clean_fragment(fragment: &str, config: &RenderConfig) -> String {
    Builder::default()
        .tags(config.elements.clone())
        .generic_attributes(config.generic_attributes.clone())
        .tag_attributes(config.element_attributes.clone())
        .url_schemes(config.url_schemes.clone())
        .link_rel(Some("noopener noreferrer"))
        .clean(fragment)
        .to_string()
}
