//! Build error types and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Fatal error raised while configuring or running the extension build.
///
/// Nothing here is recovered locally: every variant aborts the build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A required external program could not be started.
    #[error("`{tool}` not found; is it installed and on PATH?")]
    ExecutableNotFound { tool: String },

    /// A query program ran but failed.
    #[error("`{tool}` failed\n{stderr}")]
    QueryFailed { tool: String, stderr: String },

    /// None of the candidate standard flags compiled.
    #[error("Unsupported compiler -- at least C++11 support is needed!")]
    UnsupportedCompiler {
        compiler: PathBuf,
        candidates: Vec<String>,
    },

    /// The toolchain rejected a source file.
    #[error("compilation failed for {}\n{stderr}", .file.display())]
    Compile { file: PathBuf, stderr: String },

    /// The toolchain failed to link the extension.
    #[error("linking failed for {}\n{stderr}", .output.display())]
    Link { output: PathBuf, stderr: String },

    /// The binding header package is missing or too old.
    #[error("pybind11 {requirement} is required, found {}", .found.as_deref().unwrap_or("none"))]
    BindingRequirement {
        requirement: String,
        found: Option<String>,
    },

    /// Toolchain detection found no usable C++ compiler.
    #[error("no C++ compiler found")]
    NoCompiler,

    /// A filesystem or process operation failed.
    #[error("{action}")]
    Io {
        action: String,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with a description of what was attempted.
    pub fn io(action: impl Into<String>, source: io::Error) -> Self {
        BuildError::Io {
            action: action.into(),
            source,
        }
    }

    /// Classify a failure to start `program`.
    ///
    /// A missing executable is its own error kind so that a missing query
    /// tool is reported as such instead of as an empty path list.
    pub fn spawn(program: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            BuildError::ExecutableNotFound {
                tool: program.to_string(),
            }
        } else {
            BuildError::io(format!("failed to run `{}`", program), source)
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::ExecutableNotFound { tool } => {
                let mut diag = Diagnostic::error(format!("`{}` not found", tool));
                if tool.contains("mecab-config") {
                    diag = diag
                        .with_context("MeCab's include and library paths are read from mecab-config")
                        .with_suggestion(suggestions::INSTALL_MECAB)
                        .with_suggestion(suggestions::CONFIG_TOOL_PATH);
                } else {
                    diag = diag.with_suggestion(format!("Install `{}` or add it to PATH", tool));
                }
                diag
            }

            BuildError::QueryFailed { tool, stderr } => {
                Diagnostic::error(format!("`{}` failed", tool))
                    .with_context(stderr.trim_end())
                    .with_suggestion("Set `build.python` in .mecab-build/config.toml to a working interpreter")
            }

            BuildError::UnsupportedCompiler {
                compiler,
                candidates,
            } => Diagnostic::error(self.to_string())
                .with_context(format!("compiler: {}", compiler.display()))
                .with_context(format!("rejected flags: {}", candidates.join(", ")))
                .with_suggestion(suggestions::UPGRADE_COMPILER),

            BuildError::Compile { file, stderr } => {
                Diagnostic::error(format!("compilation failed for {}", file.display()))
                    .with_context(stderr.trim_end())
                    .with_suggestion(suggestions::RERUN_VERBOSE)
            }

            BuildError::Link { output, stderr } => {
                Diagnostic::error(format!("linking failed for {}", output.display()))
                    .with_context(stderr.trim_end())
                    .with_suggestion(suggestions::INSTALL_MECAB)
                    .with_suggestion(suggestions::RERUN_VERBOSE)
            }

            BuildError::BindingRequirement { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::INSTALL_PYBIND11)
            }

            BuildError::NoCompiler => Diagnostic::error("no C++ compiler found")
                .with_context("searched CXX, then c++, g++, clang++ (cl on Windows) in PATH")
                .with_suggestion(suggestions::UPGRADE_COMPILER),

            BuildError::Io { action, source } => Diagnostic::error(action.clone())
                .with_context(source.to_string()),
        }
    }
}
