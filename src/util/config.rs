//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.mecab-build/config.toml` - user-wide defaults
//! - Project: `.mecab-build/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::language::CppStandard;

/// Default configuration query tool.
pub const DEFAULT_CONFIG_TOOL: &str = "mecab-config";

/// Default interpreter used to locate binding headers.
pub const DEFAULT_PYTHON: &str = "python3";

/// Default minimum macOS deployment target.
pub const DEFAULT_MACOS_MIN_VERSION: &str = "10.7";

/// Default build directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// mecab-build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Configuration query tool (default: mecab-config)
    pub config_tool: Option<String>,

    /// Interpreter that provides the binding headers (default: python3)
    pub python: Option<PathBuf>,

    /// C++ compiler override (otherwise CXX or PATH search)
    pub cxx: Option<PathBuf>,

    /// Build directory (default: build)
    pub build_dir: Option<PathBuf>,

    /// C++ standards to probe, most preferred first
    pub std_candidates: Vec<CppStandard>,

    /// Minimum macOS deployment target
    pub macos_min_version: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration if the file exists; defaults otherwise.
    pub fn load_if_exists(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let b = other.build;
        if b.config_tool.is_some() {
            self.build.config_tool = b.config_tool;
        }
        if b.python.is_some() {
            self.build.python = b.python;
        }
        if b.cxx.is_some() {
            self.build.cxx = b.cxx;
        }
        if b.build_dir.is_some() {
            self.build.build_dir = b.build_dir;
        }
        if !b.std_candidates.is_empty() {
            self.build.std_candidates = b.std_candidates;
        }
        if b.macos_min_version.is_some() {
            self.build.macos_min_version = b.macos_min_version;
        }
    }

    /// Configuration query tool to run.
    pub fn config_tool(&self) -> &str {
        self.build
            .config_tool
            .as_deref()
            .unwrap_or(DEFAULT_CONFIG_TOOL)
    }

    /// Interpreter to query for binding headers.
    pub fn python(&self) -> PathBuf {
        self.build
            .python
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON))
    }

    /// Candidate `-std=` flags for the standard probe, most preferred first.
    pub fn std_candidates(&self) -> Vec<String> {
        if self.build.std_candidates.is_empty() {
            CppStandard::candidate_flags(&CppStandard::DEFAULT_PREFERENCE)
        } else {
            CppStandard::candidate_flags(&self.build.std_candidates)
        }
    }

    /// Minimum macOS deployment target.
    pub fn macos_min_version(&self) -> &str {
        self.build
            .macos_min_version
            .as_deref()
            .unwrap_or(DEFAULT_MACOS_MIN_VERSION)
    }
}

/// Load merged configuration from global and project locations.
///
/// Missing files are skipped. A file that exists but does not parse is an
/// error naming its path.
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::load_if_exists(global_path)?;
    config.merge(Config::load_if_exists(project_path)?);
    Ok(config)
}

/// Get the global config directory (~/.mecab-build).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".mecab-build"))
}

/// Get the global config path (~/.mecab-build/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.mecab-build/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".mecab-build").join("config.toml")
}
