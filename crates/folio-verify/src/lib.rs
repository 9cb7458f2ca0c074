//! Dev-versus-production build verification.
//!
//! Runs the site generator in serve mode and in production mode, then checks
//! that the CSS inlined by the production build is the dev stylesheet after
//! the expected font-display patch and minification, and that both builds
//! render the same page content once scripts, styles and security tokens are
//! stripped.

pub mod build;
pub mod compare;
pub mod css;
pub mod fingerprint;
pub mod html;

pub use build::{run_step, run_steps, BuildError, BuildPlan, BuildStep};
pub use compare::{CheckOutcome, Report, Stage, StageResult, Verifier, VerifyConfig, VerifyError};
pub use css::{expected_css, extract_inline_style, minify_css, patch_font_display, CssError};
pub use fingerprint::{fingerprint, Fingerprint, FINGERPRINT_LEN};
pub use html::{canonicalize_attributes, minify_html, normalize_html, HtmlError};
