//! HTML normalization and minification.
//!
//! Dev and prod builds legitimately differ in injected scripts, styles and
//! security tokens. [`normalize_html`] strips those so the remaining body
//! markup can be compared. [`minify_html`] brings a dev page into the shape a
//! production page has after the production HTML pipeline.

use lol_html::{element, rewrite_str, RewriteStrSettings};
use minify_html::Cfg;
use scraper::{Html, Node, Selector};

/// Stand-in for a space between inline siblings while the minifier runs.
/// A private-use character, so it never appears in page content.
const INLINE_SPACE: &str = "\u{E000}";

/// Elements rendered inline: whitespace between two of them is a visible
/// space and collapses to one instead of being removed.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdi", "bdo", "big", "button", "cite", "code", "data", "del",
    "dfn", "em", "font", "i", "img", "input", "ins", "kbd", "label", "mark", "nobr", "q", "rp",
    "rt", "s", "samp", "select", "small", "span", "strike", "strong", "sub", "sup", "svg",
    "textarea", "time", "tt", "u", "var", "wbr",
];

/// Elements whose whitespace is content.
const PREFORMATTED_TAGS: &[&str] = &["pre", "textarea"];

/// Elements removed before two pages are compared.
pub const VOLATILE_SELECTOR: &str =
    r#"script, style, link[rel="stylesheet"], meta[name="csrf-token"]"#;

/// Errors that can occur while processing HTML.
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("Document has no body")]
    NoBody,

    #[error("HTML rewrite error: {0}")]
    Rewrite(String),

    #[error("HTML minify error: {0}")]
    Minify(String),
}

fn selector(source: &str) -> Result<Selector, HtmlError> {
    Selector::parse(source).map_err(|e| HtmlError::Selector {
        selector: source.to_string(),
        message: e.to_string(),
    })
}

/// Remove volatile elements and return the body's inner markup.
///
/// The input is parsed as a full HTML5 document, so pages whose optional
/// `<html>`, `<head>` and `<body>` tags were dropped by a minifier still
/// yield the same body as their unminified form.
pub fn normalize_html(html: &str) -> Result<String, HtmlError> {
    let mut document = Html::parse_document(html);

    let volatile = selector(VOLATILE_SELECTOR)?;
    let ids: Vec<_> = document.select(&volatile).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let body = selector("body")?;
    document
        .select(&body)
        .next()
        .map(|el| el.inner_html())
        .ok_or(HtmlError::NoBody)
}

/// Sort attributes by name and class tokens alphabetically.
pub fn canonicalize_attributes(html: &str) -> Result<String, HtmlError> {
    let element_content_handlers = vec![element!("*", |el| {
        let mut attrs: Vec<(String, String)> = el
            .attributes()
            .iter()
            .map(|a| (a.name(), a.value()))
            .collect();

        if attrs.len() < 2 && !attrs.iter().any(|(name, _)| name == "class") {
            return Ok(());
        }

        for (name, _) in &attrs {
            el.remove_attribute(name);
        }

        attrs.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in attrs {
            let value = if name == "class" {
                sort_class_names(&value)
            } else {
                value
            };
            el.set_attribute(&name, &value)?;
        }

        Ok(())
    })];

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers,
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| HtmlError::Rewrite(e.to_string()))
}

fn sort_class_names(value: &str) -> String {
    let mut classes: Vec<&str> = value.split_whitespace().collect();
    classes.sort_unstable();
    classes.dedup();
    classes.join(" ")
}

fn is_inline(node: &Node) -> bool {
    match node {
        Node::Element(el) => INLINE_TAGS.contains(&el.name()),
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    }
}

/// Replace whitespace-only text between two inline siblings with
/// [`INLINE_SPACE`] so the minifier cannot drop it.
fn protect_inline_whitespace(html: &str) -> String {
    let mut document = Html::parse_document(html);

    let ids: Vec<_> = document
        .tree
        .nodes()
        .filter(|node| {
            let Node::Text(text) = node.value() else {
                return false;
            };
            if !text.trim().is_empty() {
                return false;
            }
            let preformatted = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|el| PREFORMATTED_TAGS.contains(&el.name()))
            });
            if preformatted {
                return false;
            }
            let prev = node.prev_siblings().find(|n| !n.value().is_comment());
            let next = node.next_siblings().find(|n| !n.value().is_comment());
            matches!((prev, next), (Some(p), Some(n)) if is_inline(p.value()) && is_inline(n.value()))
        })
        .map(|node| node.id())
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            if let Node::Text(text) = node.value() {
                text.text = INLINE_SPACE.into();
            }
        }
    }

    document.html()
}

/// Minify a page with the fixed production option set.
///
/// Comments are removed, whitespace collapsed, boolean attributes collapsed,
/// attributes and class names put in canonical order, and optional tags and
/// attribute quotes dropped. Whitespace between inline siblings collapses to
/// a single space; elsewhere whitespace-only text is removed.
pub fn minify_html(html: &str) -> Result<String, HtmlError> {
    let canonical = canonicalize_attributes(html)?;
    let protected = protect_inline_whitespace(&canonical);

    let cfg = Cfg {
        keep_comments: false,
        keep_closing_tags: false,
        keep_html_and_head_opening_tags: false,
        minify_css: false,
        minify_js: false,
        ..Cfg::default()
    };

    let minified = minify_html::minify(protected.as_bytes(), &cfg);
    let minified = String::from_utf8(minified).map_err(|e| HtmlError::Minify(e.to_string()))?;
    Ok(minified.replace(INLINE_SPACE, " "))
}
