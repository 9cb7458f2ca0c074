//! Theme output command.

use anyhow::{Context, Result};
use clap::ValueEnum;
use folio_theme::Theme;

use crate::config::ConfigFile;

/// What to print for the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeFormat {
    /// Custom property base layer
    Css,
    /// Utility theme extension
    Json,
    /// Full utility-framework config
    Config,
}

/// Run the theme command.
pub fn run(config: &ConfigFile, format: ThemeFormat) -> Result<()> {
    let theme = Theme::default().with_overrides(&config.theme);

    let output = match format {
        ThemeFormat::Css => theme.base_css(),
        ThemeFormat::Json => serde_json::to_string_pretty(&theme.extension())
            .context("Failed to serialize theme extension")?,
        ThemeFormat::Config => serde_json::to_string_pretty(&theme.framework_config())
            .context("Failed to serialize framework config")?,
    };

    println!("{}", output.trim_end());
    Ok(())
}
