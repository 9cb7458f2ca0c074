//! Table of contents command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use folio_theme::{anchor_headings, extract_toc};

/// Print the table of contents of an HTML file, optionally writing heading
/// anchors back into it.
pub fn run(file: &Path, write: bool) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let toc = extract_toc(&content)?;
    if toc.is_empty() {
        tracing::info!("No <h2> headings in {}", file.display());
        return Ok(());
    }

    if write {
        let anchored = anchor_headings(&content, &toc)?;
        fs::write(file, anchored)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        tracing::info!("Anchored {} headings in {}", toc.entries.len(), file.display());
    }

    println!("{}", toc.to_html());
    Ok(())
}
