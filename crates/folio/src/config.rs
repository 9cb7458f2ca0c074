//! Configuration file structure (folio.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_theme::ThemeOverrides;
use folio_verify::{BuildPlan, VerifyConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub build: BuildPlan,
    #[serde(default)]
    pub theme: ThemeOverrides,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_source_css")]
    pub source_css: PathBuf,
    #[serde(default = "default_dev_dir")]
    pub dev_dir: PathBuf,
    #[serde(default = "default_prod_dir")]
    pub prod_dir: PathBuf,
    #[serde(default = "default_target_file")]
    pub target_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_css: default_source_css(),
            dev_dir: default_dev_dir(),
            prod_dir: default_prod_dir(),
            target_file: default_target_file(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DebugConfig {
    /// Directory receiving debug files on mismatch
    #[serde(default = "default_debug_dir")]
    pub dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            dir: default_debug_dir(),
        }
    }
}

fn default_source_css() -> PathBuf {
    PathBuf::from("css/redesign.tmp.css")
}
fn default_dev_dir() -> PathBuf {
    PathBuf::from("_site_dev")
}
fn default_prod_dir() -> PathBuf {
    PathBuf::from("_site")
}
fn default_target_file() -> PathBuf {
    PathBuf::from("index.html")
}
fn default_debug_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ConfigFile {
    /// Verification settings for the site rooted at `root`.
    pub fn verify_config(&self, root: &Path) -> VerifyConfig {
        VerifyConfig {
            root: root.to_path_buf(),
            source_css: self.paths.source_css.clone(),
            dev_dir: self.paths.dev_dir.clone(),
            prod_dir: self.paths.prod_dir.clone(),
            target_file: self.paths.target_file.clone(),
            debug_dir: self.debug.dir.clone(),
            plan: self.build.clone(),
        }
    }
}

/// Location of the config file: a relative `config` path is taken relative
/// to the site root.
pub fn resolve_config_path(root: &Path, config: &Path) -> PathBuf {
    if config.is_absolute() {
        config.to_path_buf()
    } else {
        root.join(config)
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    tracing::debug!("No config at {}, using defaults", path.display());
    Ok(ConfigFile::default())
}
