// src/render/linkify.rs

//! Auto-linking stage: wraps bare URLs and email addresses in anchors.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Elements whose text content is never linkified. Anchors must not be
/// nested, and code spans/blocks display text literally.
const SKIP_ELEMENTS: [&str; 3] = ["a", "code", "pre"];

/// Matches, in order of preference: email addresses, scheme'd URLs, and
/// scheme-less hosts (`www.`-prefixed or a bare domain with a known TLD).
/// Quotes and angle brackets terminate a match, so entity-escaped text and
/// adjacent markup stay intact.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?xi)
        \b
        (?:
            (?P<email>
                [a-z0-9][a-z0-9._%+-]* @ [a-z0-9][a-z0-9-]* (?: \. [a-z0-9][a-z0-9-]* )+
            )
          | (?P<url> https?:// [^\s<>"']+ )
          | (?P<host>
                www \. [^\s<>"']+
              | [a-z0-9][a-z0-9-]* (?: \. [a-z0-9][a-z0-9-]* )* \.
                (?: com|org|net|edu|gov|mil|int|io|dev|app|co|me|us|uk|de|fr|jp|info|biz )
                \b
                (?: / [^\s<>"']* )?
            )
        )
        "#,
    )
    .expect("link pattern must compile")
});

/// Wrap URL-like and email-like substrings of text nodes in anchor elements.
///
/// The fragment is scanned with a small tag-aware cursor: markup is copied
/// verbatim, attribute values are never touched, and text inside `a`, `code`,
/// and `pre` is left alone. Skipping existing anchors makes the pass
/// idempotent. Runs after sanitization, so the input is well-formed; if it
/// somehow is not, the remainder is copied through unchanged.
pub fn linkify(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 64);
    let mut skip_depth = 0usize;
    let mut rest = fragment;

    while let Some(lt) = rest.find('<') {
        let (text, tail) = rest.split_at(lt);
        append_text(text, skip_depth, &mut out);

        let Some(gt) = find_tag_end(tail) else {
            out.push_str(tail);
            return out;
        };
        let tag = &tail[..=gt];
        adjust_depth(tag, &mut skip_depth);
        out.push_str(tag);
        rest = &tail[gt + 1..];
    }
    append_text(rest, skip_depth, &mut out);
    out
}

fn append_text(text: &str, skip_depth: usize, out: &mut String) {
    if skip_depth == 0 {
        link_text(text, out);
    } else {
        out.push_str(text);
    }
}

/// Byte offset of the `>` closing the tag that starts at `tail[0]`,
/// ignoring `>` inside quoted attribute values.
fn find_tag_end(tail: &str) -> Option<usize> {
    let bytes = tail.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// Track nesting of elements whose text must not be linkified.
fn adjust_depth(tag: &str, depth: &mut usize) {
    let inner = tag.trim_start_matches('<').trim_end_matches('>');
    let (closing, name_part) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name: String = name_part
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if !SKIP_ELEMENTS.contains(&name.as_str()) {
        return;
    }
    if closing {
        *depth = depth.saturating_sub(1);
    } else if !name_part.trim_end().ends_with('/') {
        *depth += 1;
    }
}

/// Replace link-like matches in one text node, copying everything else.
fn link_text(text: &str, out: &mut String) {
    let mut last = 0;
    for caps in LINK_RE.captures_iter(text) {
        let m = caps.get(0).expect("match group 0 always present");
        let matched = trim_trailing(m.as_str());
        if matched.is_empty() {
            continue;
        }

        let target = if caps.name("email").is_some() {
            format!("mailto:{matched}")
        } else if caps.name("url").is_some() {
            matched.to_string()
        } else {
            format!("http://{matched}")
        };

        // A match the URL parser rejects is left as plain text.
        if Url::parse(&target).is_err() {
            continue;
        }

        out.push_str(&text[last..m.start()]);
        out.push_str("<a href=\"");
        out.push_str(&target);
        out.push_str("\" rel=\"noopener noreferrer\">");
        out.push_str(matched);
        out.push_str("</a>");
        last = m.start() + matched.len();
    }
    out.push_str(&text[last..]);
}

/// Drop punctuation that ends a sentence rather than the URL itself.
/// A closing parenthesis is kept when the match contains an opening one
/// (e.g. wiki-style paths).
fn trim_trailing(mut matched: &str) -> &str {
    loop {
        match matched.chars().last() {
            Some('.' | ',' | ';' | ':' | '!' | '?') => {
                matched = &matched[..matched.len() - 1];
            }
            Some(')') if !matched.contains('(') => {
                matched = &matched[..matched.len() - 1];
            }
            _ => return matched,
        }
    }
}
