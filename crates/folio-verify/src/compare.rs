//! Dev-versus-prod comparison.
//!
//! A verification run moves through two checks. The CSS check compares the
//! expected production CSS (derived from the dev stylesheet) with the CSS
//! inlined in the production page. The HTML check, reached only when the CSS
//! matched, compares the normalized dev and prod pages. A mismatch in either
//! check ends the run after writing both sides to debug files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::{run_steps, BuildError, BuildPlan};
use crate::css::{expected_css, extract_inline_style, CssError};
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::html::{minify_html, normalize_html, HtmlError};

/// Debug file for the expected production CSS.
pub const DEBUG_EXPECTED_CSS: &str = "debug_expected.css";
/// Debug file for the CSS found in the production page.
pub const DEBUG_ACTUAL_CSS: &str = "debug_actual.css";
/// Debug file for the normalized dev page.
pub const DEBUG_DEV_HTML: &str = "debug_dev_normalized.html";
/// Debug file for the normalized prod page.
pub const DEBUG_PROD_HTML: &str = "debug_prod_normalized.html";

/// Below this many characters of difference a CSS mismatch is reported as a
/// formatting difference rather than a processing mismatch.
const MINOR_CSS_DELTA: usize = 50;

/// Where a verification run reads its inputs and writes its debug files.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Site root; every other path is relative to it
    pub root: PathBuf,

    /// Stylesheet produced by the dev CSS build
    pub source_css: PathBuf,

    /// Output directory of the dev build
    pub dev_dir: PathBuf,

    /// Output directory of the prod build
    pub prod_dir: PathBuf,

    /// Page compared in both output directories
    pub target_file: PathBuf,

    /// Directory receiving debug files on mismatch
    pub debug_dir: PathBuf,

    /// Build commands
    pub plan: BuildPlan,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            source_css: PathBuf::from("css/redesign.tmp.css"),
            dev_dir: PathBuf::from("_site_dev"),
            prod_dir: PathBuf::from("_site"),
            target_file: PathBuf::from("index.html"),
            debug_dir: PathBuf::from("."),
            plan: BuildPlan::default(),
        }
    }
}

impl VerifyConfig {
    fn source_css_path(&self) -> PathBuf {
        self.root.join(&self.source_css)
    }

    fn dev_html_path(&self) -> PathBuf {
        self.root.join(&self.dev_dir).join(&self.target_file)
    }

    fn prod_html_path(&self) -> PathBuf {
        self.root.join(&self.prod_dir).join(&self.target_file)
    }

    fn debug_path(&self, name: &str) -> PathBuf {
        self.root.join(&self.debug_dir).join(name)
    }
}

/// A check of the verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Css,
    Html,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Css => f.write_str("CSS"),
            Stage::Html => f.write_str("HTML"),
        }
    }
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Both sides have the same fingerprint
    Match { fingerprint: Fingerprint },

    /// Fingerprints differ; both sides were written to `debug_files`
    Mismatch {
        expected: Fingerprint,
        actual: Fingerprint,
        length_delta: usize,
        debug_files: [PathBuf; 2],
    },
}

impl CheckOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, CheckOutcome::Match { .. })
    }
}

/// Outcome of a check, tagged with its stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: Stage,
    pub outcome: CheckOutcome,
}

/// All checks that ran, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub checks: Vec<StageResult>,
}

impl Report {
    /// True when at least one check ran and every check matched.
    pub fn passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.outcome.is_match())
    }

    /// The stage that ended the run with a mismatch, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        self.checks
            .iter()
            .find(|c| !c.outcome.is_match())
            .map(|c| c.stage)
    }
}

/// Errors that abort a verification run.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("{what} missing: {}", .path.display())]
    MissingFile { what: &'static str, path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No <style> tag found in production HTML: {}", .path.display())]
    NoStyleTag { path: PathBuf },

    #[error("Build process failed: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Css(#[from] CssError),

    #[error(transparent)]
    Html(#[from] HtmlError),
}

/// Runs builds and checks against one site.
pub struct Verifier {
    config: VerifyConfig,
}

impl Verifier {
    /// Create a verifier.
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    /// Build dev and prod (unless `build` is false), then run the CSS check
    /// and, if it matched, the HTML check.
    pub fn verify_full(&self, build: bool) -> Result<Report, VerifyError> {
        if build {
            tracing::info!("Building development version into {}", self.config.dev_dir.display());
            run_steps(&self.config.plan.dev, &self.config.root)?;

            tracing::info!("Building production version into {}", self.config.prod_dir.display());
            run_steps(&self.config.plan.prod, &self.config.root)?;
        }

        let mut report = Report::default();

        tracing::info!("Verifying CSS...");
        let css = self.check_css()?;
        let css_matched = css.is_match();
        report.checks.push(StageResult {
            stage: Stage::Css,
            outcome: css,
        });
        if !css_matched {
            return Ok(report);
        }

        tracing::info!("Verifying HTML content...");
        let html = self.check_html()?;
        report.checks.push(StageResult {
            stage: Stage::Html,
            outcome: html,
        });

        Ok(report)
    }

    /// Build prod (unless `build` is false) and run only the CSS check.
    pub fn verify_css(&self, build: bool) -> Result<Report, VerifyError> {
        if build {
            tracing::info!("Running production build...");
            run_steps(&self.config.plan.prod, &self.config.root)?;
        }

        tracing::info!("Analyzing CSS integrity...");
        let css = self.check_css()?;

        Ok(Report {
            checks: vec![StageResult {
                stage: Stage::Css,
                outcome: css,
            }],
        })
    }

    /// Compare the expected production CSS with the CSS inlined in the
    /// production page.
    pub fn check_css(&self) -> Result<CheckOutcome, VerifyError> {
        let source_path = self.config.source_css_path();
        let prod_path = self.config.prod_html_path();
        require_file("Source CSS", &source_path)?;
        require_file("Production HTML", &prod_path)?;

        let raw_css = read(&source_path)?;
        let expected = expected_css(&raw_css)?;
        let expected_hash = fingerprint(&expected);
        tracing::info!("Expected CSS hash (dev + minify): {}", expected_hash);
        tracing::info!("Expected size: {}", kilobytes(&expected));

        let prod_html = read(&prod_path)?;
        let actual = extract_inline_style(&prod_html)
            .ok_or_else(|| VerifyError::NoStyleTag { path: prod_path.clone() })?;
        let actual_hash = fingerprint(actual);
        tracing::info!("Actual inlined CSS hash:          {}", actual_hash);
        tracing::info!("Actual size:   {}", kilobytes(actual));

        if expected_hash == actual_hash {
            tracing::info!("CSS verified! Hash: {}", actual_hash);
            return Ok(CheckOutcome::Match {
                fingerprint: actual_hash,
            });
        }

        tracing::error!(
            "CSS mismatch! Expected: {}, Actual: {}",
            expected_hash,
            actual_hash
        );

        let length_delta = char_delta(&expected, actual);
        if length_delta < MINOR_CSS_DELTA {
            tracing::warn!("Size is very similar. Likely a minor formatting/minification difference.");
        } else {
            tracing::warn!("Significant size difference. Major processing mismatch.");
        }

        let debug_files = self.write_debug(
            (DEBUG_EXPECTED_CSS, expected.as_str()),
            (DEBUG_ACTUAL_CSS, actual),
        )?;

        Ok(CheckOutcome::Mismatch {
            expected: expected_hash,
            actual: actual_hash,
            length_delta,
            debug_files,
        })
    }

    /// Compare the normalized dev page, minified first, with the normalized
    /// prod page.
    pub fn check_html(&self) -> Result<CheckOutcome, VerifyError> {
        let dev_path = self.config.dev_html_path();
        let prod_path = self.config.prod_html_path();
        require_file("Development HTML", &dev_path)?;
        require_file("Production HTML", &prod_path)?;

        let dev_raw = read(&dev_path)?;
        let prod_raw = read(&prod_path)?;

        let dev_minified = minify_html(&dev_raw).inspect_err(|e| {
            tracing::error!("Failed to minify dev HTML for comparison: {}", e);
        })?;

        let dev_normalized = normalize_html(&dev_minified)?;
        let prod_normalized = normalize_html(&prod_raw)?;

        let dev_hash = fingerprint(&dev_normalized);
        let prod_hash = fingerprint(&prod_normalized);

        if dev_hash == prod_hash {
            tracing::info!("HTML content verified! Hash: {}", prod_hash);
            tracing::info!("Comparison matched after stripping scripts, styles, and normalizing structure");
            return Ok(CheckOutcome::Match {
                fingerprint: prod_hash,
            });
        }

        tracing::error!("HTML content mismatch!");
        tracing::info!("Dev hash:  {}", dev_hash);
        tracing::info!("Prod hash: {}", prod_hash);

        let debug_files = self.write_debug(
            (DEBUG_DEV_HTML, dev_normalized.as_str()),
            (DEBUG_PROD_HTML, prod_normalized.as_str()),
        )?;

        let length_delta = char_delta(&dev_normalized, &prod_normalized);
        tracing::info!("Length diff: {} chars", length_delta);

        Ok(CheckOutcome::Mismatch {
            expected: dev_hash,
            actual: prod_hash,
            length_delta,
            debug_files,
        })
    }

    fn write_debug(
        &self,
        first: (&str, &str),
        second: (&str, &str),
    ) -> Result<[PathBuf; 2], VerifyError> {
        let dir = self.config.root.join(&self.config.debug_dir);
        fs::create_dir_all(&dir).map_err(|source| VerifyError::Write {
            path: dir.clone(),
            source,
        })?;

        let mut written = [PathBuf::new(), PathBuf::new()];
        for (slot, (name, content)) in written.iter_mut().zip([first, second]) {
            let path = self.config.debug_path(name);
            fs::write(&path, content).map_err(|source| VerifyError::Write {
                path: path.clone(),
                source,
            })?;
            *slot = path;
        }

        tracing::info!(
            "Debug files written: '{}' & '{}'",
            written[0].display(),
            written[1].display()
        );

        Ok(written)
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<(), VerifyError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(VerifyError::MissingFile {
            what,
            path: path.to_path_buf(),
        })
    }
}

fn read(path: &Path) -> Result<String, VerifyError> {
    fs::read_to_string(path).map_err(|source| VerifyError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn char_delta(a: &str, b: &str) -> usize {
    a.chars().count().abs_diff(b.chars().count())
}

fn kilobytes(content: &str) -> String {
    format!("{:.2} KB", content.len() as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    const DEV_CSS: &str = ".a{color:red} @font-face { src: url(x); }";

    fn site(css: Option<&str>, dev_html: Option<&str>, prod_html: Option<&str>) -> (TempDir, Verifier) {
        let temp = tempdir().unwrap();
        let root = temp.path();

        if let Some(css) = css {
            fs::create_dir_all(root.join("css")).unwrap();
            fs::write(root.join("css/redesign.tmp.css"), css).unwrap();
        }
        if let Some(html) = dev_html {
            fs::create_dir_all(root.join("_site_dev")).unwrap();
            fs::write(root.join("_site_dev/index.html"), html).unwrap();
        }
        if let Some(html) = prod_html {
            fs::create_dir_all(root.join("_site")).unwrap();
            fs::write(root.join("_site/index.html"), html).unwrap();
        }

        let verifier = Verifier::new(VerifyConfig {
            root: root.to_path_buf(),
            ..Default::default()
        });
        (temp, verifier)
    }

    fn prod_page(css: &str, body: &str) -> String {
        format!("<html><head><style>{}</style></head><body>{}</body></html>", css, body)
    }

    #[test]
    fn css_matches_processed_dev_css() {
        let expected = expected_css(DEV_CSS).unwrap();
        let (_temp, verifier) = site(Some(DEV_CSS), None, Some(&prod_page(&expected, "")));

        let outcome = verifier.check_css().unwrap();

        assert_eq!(
            outcome,
            CheckOutcome::Match {
                fingerprint: fingerprint(&expected)
            }
        );
    }

    #[test]
    fn css_check_fails_without_style_tag() {
        let (temp, verifier) = site(
            Some(DEV_CSS),
            None,
            Some("<html><body><p>Hi</p></body></html>"),
        );

        let result = verifier.check_css();

        assert!(matches!(result, Err(VerifyError::NoStyleTag { .. })));
        assert!(!temp.path().join(DEBUG_EXPECTED_CSS).exists());
    }

    #[test]
    fn css_check_fails_on_missing_source() {
        let (_temp, verifier) = site(None, None, Some(&prod_page("", "")));

        let result = verifier.check_css();

        assert!(matches!(
            result,
            Err(VerifyError::MissingFile {
                what: "Source CSS",
                ..
            })
        ));
    }

    #[test]
    fn css_check_fails_on_missing_prod_html() {
        let (_temp, verifier) = site(Some(DEV_CSS), None, None);

        let result = verifier.check_css();

        assert!(matches!(
            result,
            Err(VerifyError::MissingFile {
                what: "Production HTML",
                ..
            })
        ));
    }

    #[test]
    fn css_mismatch_writes_debug_files() {
        let (temp, verifier) = site(Some(DEV_CSS), None, Some(&prod_page(".a{color:blue}", "")));

        let outcome = verifier.check_css().unwrap();

        let CheckOutcome::Mismatch { debug_files, .. } = outcome else {
            panic!("expected mismatch");
        };
        assert_eq!(debug_files[0], temp.path().join(".").join(DEBUG_EXPECTED_CSS));
        let actual = fs::read_to_string(&debug_files[1]).unwrap();
        assert_eq!(actual, ".a{color:blue}");
        let expected = fs::read_to_string(&debug_files[0]).unwrap();
        assert!(expected.contains("font-display:optional"));
    }

    #[test]
    fn html_matches_after_stripping_scripts() {
        let (_temp, verifier) = site(
            None,
            Some("<html><body><script>x</script><p>Hi</p></body></html>"),
            Some("<html><body><p>Hi</p></body></html>"),
        );

        let outcome = verifier.check_html().unwrap();

        assert!(outcome.is_match());
    }

    #[test]
    fn identical_pages_with_inline_links_match() {
        let page = "<html><body><div><a href=\"/\">Home</a> <a href=\"/about\">About</a></div></body></html>";
        let (_temp, verifier) = site(None, Some(page), Some(page));

        let outcome = verifier.check_html().unwrap();

        assert!(outcome.is_match(), "{:?}", outcome);
    }

    #[test]
    fn html_mismatch_reports_length_delta() {
        let (temp, verifier) = site(
            None,
            Some("<html><body><p>Hi</p></body></html>"),
            Some("<html><body><p>Bye</p></body></html>"),
        );

        let outcome = verifier.check_html().unwrap();

        let CheckOutcome::Mismatch {
            length_delta,
            debug_files,
            ..
        } = outcome
        else {
            panic!("expected mismatch");
        };
        assert_eq!(length_delta, 1);
        assert_eq!(
            fs::read_to_string(temp.path().join(DEBUG_DEV_HTML)).unwrap(),
            "<p>Hi</p>"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join(DEBUG_PROD_HTML)).unwrap(),
            "<p>Bye</p>"
        );
        assert_eq!(debug_files.len(), 2);
    }

    #[test]
    fn html_check_fails_on_missing_dev_page() {
        let (_temp, verifier) = site(None, None, Some("<p>Hi</p>"));

        let result = verifier.check_html();

        assert!(matches!(
            result,
            Err(VerifyError::MissingFile {
                what: "Development HTML",
                ..
            })
        ));
    }

    #[test]
    fn full_run_skips_html_after_css_mismatch() {
        let (_temp, verifier) = site(
            Some(DEV_CSS),
            Some("<p>Hi</p>"),
            Some(&prod_page(".a{color:blue}", "<p>Bye</p>")),
        );

        let report = verifier.verify_full(false).unwrap();

        assert!(!report.passed());
        assert_eq!(report.checks.len(), 1);
        assert_eq!(report.failed_stage(), Some(Stage::Css));
    }

    #[test]
    fn full_run_passes_when_both_checks_match() {
        let expected = expected_css(DEV_CSS).unwrap();
        let (_temp, verifier) = site(
            Some(DEV_CSS),
            Some("<html><head><link rel=\"stylesheet\" href=\"/css/redesign.tmp.css\"></head><body><p>Hi</p></body></html>"),
            Some(&prod_page(&expected, "<p>Hi</p>")),
        );

        let report = verifier.verify_full(false).unwrap();

        assert!(report.passed());
        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.failed_stage(), None);
    }

    #[test]
    fn css_only_run_reports_single_check() {
        let expected = expected_css(DEV_CSS).unwrap();
        let (_temp, verifier) = site(Some(DEV_CSS), None, Some(&prod_page(&expected, "")));

        let report = verifier.verify_css(false).unwrap();

        assert!(report.passed());
        assert_eq!(report.checks[0].stage, Stage::Css);
    }

    #[test]
    fn empty_report_does_not_pass() {
        assert!(!Report::default().passed());
    }

    #[cfg(unix)]
    #[test]
    fn full_run_builds_both_trees() {
        use crate::build::BuildStep;

        let expected = expected_css(DEV_CSS).unwrap();
        let prod = prod_page(&expected, "<p>Hi</p>");
        let (temp, _) = site(Some(DEV_CSS), None, None);

        let verifier = Verifier::new(VerifyConfig {
            root: temp.path().to_path_buf(),
            plan: BuildPlan {
                dev: vec![BuildStep::new(
                    "sh",
                    &["-c", "mkdir -p _site_dev && printf '%s' '<p>Hi</p>' > _site_dev/index.html"],
                )],
                prod: vec![BuildStep::new(
                    "sh",
                    &["-c", &format!("mkdir -p _site && printf '%s' '{}' > _site/index.html", prod)],
                )],
            },
            ..Default::default()
        });

        let report = verifier.verify_full(true).unwrap();

        assert!(report.passed());
    }

    #[cfg(unix)]
    #[test]
    fn build_failure_aborts_run() {
        use crate::build::BuildStep;

        let (temp, _) = site(Some(DEV_CSS), None, None);
        let verifier = Verifier::new(VerifyConfig {
            root: temp.path().to_path_buf(),
            plan: BuildPlan {
                dev: vec![],
                prod: vec![BuildStep::new("sh", &["-c", "exit 1"])],
            },
            ..Default::default()
        });

        let result = verifier.verify_css(true);

        assert!(matches!(result, Err(VerifyError::Build(_))));
    }
}
