//! Build verification commands.

use std::path::Path;

use anyhow::{Context, Result};
use folio_verify::Verifier;

use crate::config::ConfigFile;

/// Which checks a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dev and prod builds, CSS then HTML check
    Full,
    /// Prod build, CSS check only
    CssOnly,
}

/// Run a verification.
pub fn run(config: &ConfigFile, root: &Path, mode: Mode, build: bool) -> Result<()> {
    match mode {
        Mode::Full => tracing::info!("Starting full build verification (CSS + HTML)..."),
        Mode::CssOnly => tracing::info!("Starting build verification..."),
    }

    let verifier = Verifier::new(config.verify_config(root));

    let report = match mode {
        Mode::Full => verifier.verify_full(build),
        Mode::CssOnly => verifier.verify_css(build),
    }
    .context("Verification aborted")?;

    if let Some(stage) = report.failed_stage() {
        anyhow::bail!("{} verification failed", stage);
    }

    match mode {
        Mode::Full => tracing::info!("All verifications passed!"),
        Mode::CssOnly => {
            tracing::info!("Production inlined CSS exactly matches the processed development CSS.");
            tracing::info!("The build pipeline is consistent.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const DEV_CSS: &str = ".a { color: red; }\n@font-face { src: url(x.woff2); }\n";

    fn site(prod_page: &str) -> TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("css/redesign.tmp.css"), DEV_CSS).unwrap();
        fs::create_dir_all(root.join("_site_dev")).unwrap();
        fs::write(
            root.join("_site_dev/index.html"),
            "<html><head><link rel=\"stylesheet\" href=\"/css/redesign.tmp.css\"></head><body><p>Hi</p></body></html>",
        )
        .unwrap();
        fs::create_dir_all(root.join("_site")).unwrap();
        fs::write(root.join("_site/index.html"), prod_page).unwrap();

        temp
    }

    fn prod_page(css: &str) -> String {
        format!("<html><head><style>{}</style></head><body><p>Hi</p></body></html>", css)
    }

    #[test]
    fn css_mismatch_fails_the_run() {
        let temp = site(&prod_page(".a{color:blue}"));

        let result = run(&ConfigFile::default(), temp.path(), Mode::CssOnly, false);

        let message = result.unwrap_err().to_string();
        assert!(message.contains("CSS verification failed"), "{}", message);
        assert!(temp.path().join("debug_expected.css").is_file());
    }

    #[test]
    fn missing_style_tag_fails_the_run() {
        let temp = site("<html><body><p>Hi</p></body></html>");

        let result = run(&ConfigFile::default(), temp.path(), Mode::Full, false);

        assert!(result.is_err());
    }

    #[test]
    fn matching_site_passes_both_checks() {
        let expected = folio_verify::expected_css(DEV_CSS).unwrap();
        let temp = site(&prod_page(&expected));

        run(&ConfigFile::default(), temp.path(), Mode::Full, false).unwrap();
        run(&ConfigFile::default(), temp.path(), Mode::CssOnly, false).unwrap();

        assert!(!temp.path().join("debug_expected.css").exists());
        assert!(!temp.path().join("debug_dev_normalized.html").exists());
    }
}
