//! CSS normalization: turns the development stylesheet into the CSS the
//! production build is expected to inline.

use std::sync::LazyLock;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use regex::Regex;

/// Declaration the production pipeline adds to every `@font-face` block.
pub const FONT_DISPLAY_DECLARATION: &str = "font-display:optional;";

static FONT_FACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@font-face\s*\{").expect("Invalid font-face regex"));

static STYLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<style>(.*?)</style>").expect("Invalid style tag regex"));

/// Errors that can occur while normalizing CSS.
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("CSS parse error: {0}")]
    Parse(String),

    #[error("CSS minify error: {0}")]
    Minify(String),

    #[error("CSS print error: {0}")]
    Print(String),
}

/// Insert the font-display declaration right after each `@font-face {`.
pub fn patch_font_display(css: &str) -> String {
    FONT_FACE_RE
        .replace_all(css, format!("@font-face {{{}", FONT_DISPLAY_DECLARATION).as_str())
        .into_owned()
}

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, CssError> {
    let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| CssError::Parse(e.to_string()))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| CssError::Minify(e.to_string()))?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| CssError::Print(e.to_string()))?;

    Ok(printed.code)
}

/// The production CSS expected for a given development stylesheet.
pub fn expected_css(source: &str) -> Result<String, CssError> {
    minify_css(&patch_font_display(source))
}

/// Contents of the first `<style>` block of an HTML document.
pub fn extract_inline_style(html: &str) -> Option<&str> {
    STYLE_TAG_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
