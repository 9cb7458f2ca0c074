//! Runs the site generator for the dev and prod builds.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use serde::Deserialize;

/// One external command of a build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildStep {
    /// Program to execute
    pub program: String,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Discard the command's output instead of inheriting it
    #[serde(default)]
    pub quiet: bool,
}

impl BuildStep {
    /// Create a step from a program and its arguments.
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: BTreeMap::new(),
            quiet: false,
        }
    }

    /// Set an environment variable for this step.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Discard the step's stdout and stderr.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, value)?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The commands producing the dev and prod output trees.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildPlan {
    /// Serve-mode build into the dev output directory
    #[serde(default = "default_dev_steps")]
    pub dev: Vec<BuildStep>,

    /// Regular production build
    #[serde(default = "default_prod_steps")]
    pub prod: Vec<BuildStep>,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            dev: default_dev_steps(),
            prod: default_prod_steps(),
        }
    }
}

fn default_dev_steps() -> Vec<BuildStep> {
    vec![
        BuildStep::new("npm", &["run", "build:css"]).quiet(),
        BuildStep::new("npx", &["eleventy", "--output=_site_dev"])
            .with_env("ELEVENTY_RUN_MODE", "serve"),
    ]
}

fn default_prod_steps() -> Vec<BuildStep> {
    vec![BuildStep::new("npm", &["run", "build"])]
}

/// Errors that can occur while running a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Run one step in `root`, blocking until it exits.
pub fn run_step(step: &BuildStep, root: &Path) -> Result<(), BuildError> {
    let command = step.to_string();
    tracing::debug!("Running `{}` in {}", command, root.display());

    let mut cmd = Command::new(&step.program);
    cmd.args(&step.args).envs(&step.env).current_dir(root);

    if step.quiet {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = cmd.status().map_err(|source| BuildError::Spawn {
        command: command.clone(),
        source,
    })?;

    if !status.success() {
        return Err(BuildError::Failed { command, status });
    }

    Ok(())
}

/// Run steps in order, stopping at the first failure.
pub fn run_steps(steps: &[BuildStep], root: &Path) -> Result<(), BuildError> {
    for step in steps {
        run_step(step, root)?;
    }
    Ok(())
}
