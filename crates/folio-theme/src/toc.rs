//! Table of contents built from the `<h2>` headings of rendered content.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use scraper::Html;

/// One linked heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
}

/// Headings of a page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toc {
    pub entries: Vec<TocEntry>,
}

/// Errors that can occur while building a table of contents.
#[derive(Debug, thiserror::Error)]
pub enum TocError {
    #[error("Failed to read headings: {0}")]
    Extract(String),

    #[error("Failed to anchor headings: {0}")]
    Rewrite(String),
}

/// Anchor ID for a heading: lower-cased, whitespace replaced by `-`.
pub fn heading_id(text: &str) -> String {
    text.to_lowercase().replace(char::is_whitespace, "-")
}

/// Collect every `<h2>` of an HTML fragment.
///
/// Headings are found with the same streaming rewriter that
/// [`anchor_headings`] uses, so both passes see the same headings in the
/// same order.
pub fn extract_toc(html: &str) -> Result<Toc, TocError> {
    let raw_titles: Rc<RefCell<Vec<String>>> = Rc::default();
    let on_heading = Rc::clone(&raw_titles);
    let on_text = Rc::clone(&raw_titles);

    let element_content_handlers = vec![
        element!("h2", move |_el| {
            on_heading.borrow_mut().push(String::new());
            Ok(())
        }),
        text!("h2", move |chunk| {
            if let Some(title) = on_text.borrow_mut().last_mut() {
                title.push_str(chunk.as_str());
            }
            Ok(())
        }),
    ];

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers,
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| TocError::Extract(e.to_string()))?;

    let entries = raw_titles
        .borrow()
        .iter()
        .map(|raw| {
            let title = decode_text(raw);
            let id = heading_id(&title);
            TocEntry { title, id }
        })
        .collect();

    Ok(Toc { entries })
}

/// Resolve character references in raw heading text.
fn decode_text(raw: &str) -> String {
    Html::parse_fragment(raw).root_element().text().collect()
}

impl Toc {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a list of links, or an empty string when there are no
    /// headings.
    pub fn to_html(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut html = String::from("<ul>");
        for entry in &self.entries {
            html.push_str(&format!(
                r##"<li><a href="#{}">{}</a></li>"##,
                escape(&entry.id),
                escape(&entry.title)
            ));
        }
        html.push_str("</ul>");
        html
    }
}

/// Give each `<h2>` of `html` the ID of its table of contents entry.
///
/// `toc` must come from [`extract_toc`] on the same content; IDs are
/// assigned in heading order.
pub fn anchor_headings(html: &str, toc: &Toc) -> Result<String, TocError> {
    let mut ids = toc
        .entries
        .iter()
        .map(|e| e.id.clone())
        .collect::<Vec<_>>()
        .into_iter();

    let element_content_handlers = vec![element!("h2", move |el| {
        if let Some(id) = ids.next() {
            el.set_attribute("id", &id)?;
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
    .map_err(|e| TocError::Rewrite(e.to_string()))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
