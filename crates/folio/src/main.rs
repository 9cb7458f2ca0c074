//! Folio CLI - build tooling for the folio static site.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use commands::theme::ThemeFormat;
use commands::verify::Mode;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Build tooling for the folio static site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to folio.toml config file; relative paths resolve against --root
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,

    /// Site root the configured paths are relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build dev and prod sites, then verify inlined CSS and page content
    Verify {
        /// Reuse existing output directories instead of building
        #[arg(long)]
        no_build: bool,
    },

    /// Run the production build and verify only the inlined CSS
    VerifyCss {
        /// Reuse the existing output directory instead of building
        #[arg(long)]
        no_build: bool,
    },

    /// Print the site theme
    Theme {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ThemeFormat::Css)]
        format: ThemeFormat,
    },

    /// Print the table of contents of a rendered HTML file
    Toc {
        /// HTML file to read
        file: PathBuf,

        /// Write heading anchors back into the file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = config::resolve_config_path(&cli.root, &cli.config);

    // Execute command
    match cli.command {
        Commands::Verify { no_build } => {
            let file_config = config::load_config(&config_path)?;
            commands::verify::run(&file_config, &cli.root, Mode::Full, !no_build)?;
        }
        Commands::VerifyCss { no_build } => {
            let file_config = config::load_config(&config_path)?;
            commands::verify::run(&file_config, &cli.root, Mode::CssOnly, !no_build)?;
        }
        Commands::Theme { format } => {
            let file_config = config::load_config(&config_path)?;
            commands::theme::run(&file_config, format)?;
        }
        Commands::Toc { file, write } => {
            commands::toc::run(&file, write)?;
        }
    }

    Ok(())
}
