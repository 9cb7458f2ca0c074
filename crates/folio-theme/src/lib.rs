//! Presentation helpers for the folio site.
//!
//! Provides the light/dark design tokens with the utility-framework theme
//! extension that exposes them, and the table of contents extracted from
//! rendered post content.

pub mod theme;
pub mod toc;

pub use theme::{Palette, Theme, ThemeOverrides, DARK_SELECTOR};
pub use toc::{anchor_headings, extract_toc, heading_id, Toc, TocEntry, TocError};
