//! Global context for build operations.
//!
//! Provides centralized access to the project root, merged configuration
//! and the build directory layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_path, load_config, project_config_path, Config, DEFAULT_BUILD_DIR};

/// Global context shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root (the current directory unless overridden)
    cwd: PathBuf,
    /// Merged global + project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::with_cwd(cwd)
    }

    /// Create a context rooted at `cwd`, loading its configuration.
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let global = global_config_path().unwrap_or_default();
        let config = load_config(&global, &project_config_path(&cwd))?;
        Ok(Self::from_config(cwd, config))
    }

    /// Create a context rooted at `cwd` with an explicit configuration.
    pub fn from_config(cwd: PathBuf, config: Config) -> Self {
        GlobalContext { cwd, config }
    }

    /// Project root.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable configuration, for command-line overrides.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Build directory (absolute).
    pub fn build_dir(&self) -> PathBuf {
        let dir = self
            .config
            .build
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        self.cwd.join(dir)
    }

    /// Directory for intermediate object files.
    pub fn temp_dir(&self) -> PathBuf {
        self.build_dir().join("temp")
    }

    /// Directory for finished extension modules.
    pub fn lib_dir(&self) -> PathBuf {
        self.build_dir().join("lib")
    }
}
