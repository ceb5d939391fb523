//! Configuration query tool support.
//!
//! MeCab installs `mecab-config`, which reports where its headers and
//! libraries live. Each query runs the tool with one flag and splits its
//! standard output on whitespace.

use std::path::PathBuf;

use crate::builder::error::BuildError;
use crate::util::process::{find_executable, ProcessBuilder};

/// Query flag reporting include directories.
pub const INCLUDE_DIR_QUERY: &str = "--inc-dir";

/// Query flag reporting linker search directories.
pub const LIBRARY_DIR_QUERY: &str = "--libs-only-L";

/// Run `tool flag` and split its output into whitespace-separated tokens.
///
/// An empty result is valid: the library may simply not be installed, in
/// which case the link step reports the problem. A tool that cannot be
/// found is fatal.
pub fn query_tool(tool: &str, flag: &str) -> Result<Vec<String>, BuildError> {
    let program = find_executable(tool).ok_or_else(|| BuildError::ExecutableNotFound {
        tool: tool.to_string(),
    })?;

    let output = ProcessBuilder::new(&program)
        .arg(flag)
        .output()
        .map_err(|e| BuildError::spawn(tool, e))?;

    if !output.status.success() {
        tracing::warn!(
            "`{} {}` exited with {:?}, using its output anyway",
            tool,
            flag,
            output.status.code()
        );
    }

    let tokens = split_output(&output.stdout);
    tracing::debug!("`{} {}` -> {:?}", tool, flag, tokens);
    Ok(tokens)
}

/// Decode tool output and split it on whitespace, dropping empty tokens.
pub fn split_output(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Include and library directories reported by the query tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryPaths {
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
}

/// A configuration query tool such as `mecab-config`.
#[derive(Debug, Clone)]
pub struct ConfigTool {
    name: String,
}

impl ConfigTool {
    pub fn new(name: impl Into<String>) -> Self {
        ConfigTool { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directories to add to the include path.
    pub fn include_dirs(&self) -> Result<Vec<PathBuf>, BuildError> {
        Ok(query_tool(&self.name, INCLUDE_DIR_QUERY)?
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    /// Directories to add to the linker search path.
    pub fn library_dirs(&self) -> Result<Vec<PathBuf>, BuildError> {
        let tokens = query_tool(&self.name, LIBRARY_DIR_QUERY)?;
        Ok(library_dirs_from_tokens(&tokens))
    }

    /// Run both queries.
    pub fn query_paths(&self) -> Result<LibraryPaths, BuildError> {
        Ok(LibraryPaths {
            include_dirs: self.include_dirs()?,
            library_dirs: self.library_dirs()?,
        })
    }
}

/// Keep `-L<dir>` flags (prefix stripped) and bare paths.
fn library_dirs_from_tokens(tokens: &[String]) -> Vec<PathBuf> {
    tokens
        .iter()
        .filter_map(|token| {
            if let Some(dir) = token.strip_prefix("-L") {
                (!dir.is_empty()).then(|| PathBuf::from(dir))
            } else if token.starts_with('-') {
                tracing::debug!("ignoring non-path token `{}`", token);
                None
            } else {
                Some(PathBuf::from(token))
            }
        })
        .collect()
}
