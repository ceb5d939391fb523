//! Compiler flag probing.
//!
//! A flag is supported when the compiler builds a trivial translation unit
//! with it. Every trial writes its source and object into a scratch
//! directory that is removed when the trial ends, however it ends.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::builder::error::BuildError;
use crate::builder::toolchain::{CompileInput, Toolchain};
use crate::core::language::Language;
use crate::util::process::ProcessBuilder;

/// Translation unit compiled by every trial.
pub const PROBE_SOURCE: &str = "int main (int argc, char **argv) { return 0; }";

/// Symbol visibility flag added when the compiler accepts it.
pub const VISIBILITY_HIDDEN: &str = "-fvisibility=hidden";

/// Answers whether a compiler accepts a flag.
pub trait FlagSupport {
    /// `Ok(false)` when the compiler ran and rejected the flag; `Err` when
    /// the compiler could not be run at all.
    fn has_flag(&self, flag: &str) -> Result<bool, BuildError>;

    /// The compiler being asked, for error reporting.
    fn compiler_path(&self) -> &Path;
}

/// Probes flags by actually compiling [`PROBE_SOURCE`].
pub struct TrialCompiler<'a> {
    toolchain: &'a dyn Toolchain,
    scratch_parent: Option<PathBuf>,
}

impl<'a> TrialCompiler<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        TrialCompiler {
            toolchain,
            scratch_parent: None,
        }
    }

    /// Create scratch directories under `dir` instead of the system temp dir.
    pub fn scratch_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(dir.into());
        self
    }

    fn scratch_dir(&self) -> Result<TempDir, BuildError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("flag-probe");
        let dir = match self.scratch_parent {
            Some(ref parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        dir.map_err(|e| BuildError::io("failed to create probe directory", e))
    }
}

impl FlagSupport for TrialCompiler<'_> {
    fn has_flag(&self, flag: &str) -> Result<bool, BuildError> {
        let scratch = self.scratch_dir()?;

        let mut source = tempfile::Builder::new()
            .prefix("probe")
            .suffix(".cpp")
            .tempfile_in(scratch.path())
            .map_err(|e| BuildError::io("failed to create probe source", e))?;
        source
            .write_all(PROBE_SOURCE.as_bytes())
            .and_then(|_| source.flush())
            .map_err(|e| BuildError::io("failed to write probe source", e))?;

        let input = CompileInput {
            source: source.path().to_path_buf(),
            output: scratch
                .path()
                .join(format!("probe.{}", self.toolchain.object_extension())),
            include_dirs: Vec::new(),
            cflags: vec![flag.to_string()],
            pic: false,
        };
        let spec = self.toolchain.compile_command(&input, Language::Cxx);

        let program = spec.program.display().to_string();
        let output = ProcessBuilder::from_spec(&spec)
            .cwd(scratch.path())
            .output()
            .map_err(|e| BuildError::spawn(&program, e))?;

        let supported = output.status.success();
        tracing::debug!(
            "probe `{}` with {}: {}",
            flag,
            program,
            if supported { "supported" } else { "unsupported" }
        );
        Ok(supported)
    }

    fn compiler_path(&self) -> &Path {
        self.toolchain.compiler_path(Language::Cxx)
    }
}

/// Return the first candidate standard flag the compiler accepts.
///
/// Candidates are tried strictly in order; a later candidate is never
/// preferred over an earlier one that works.
pub fn cpp_flag(compiler: &dyn FlagSupport, candidates: &[String]) -> Result<String, BuildError> {
    for flag in candidates {
        if compiler.has_flag(flag)? {
            return Ok(flag.clone());
        }
    }

    Err(BuildError::UnsupportedCompiler {
        compiler: compiler.compiler_path().to_path_buf(),
        candidates: candidates.to_vec(),
    })
}
