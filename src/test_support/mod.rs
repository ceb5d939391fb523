//! Test utilities for mecab-build unit tests.
//!
//! The build talks to three external programs: the configuration query
//! tool, the interpreter that owns the binding headers, and the C++
//! compiler. Tests replace each with a small shell script written into a
//! temporary directory, or with [`MockFlagSupport`] when no process is needed.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::builder::error::BuildError;
use crate::builder::probe::FlagSupport;

/// Write an executable `#!/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn stub_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Script bodies for [`stub_executable`].
pub struct StubScript;

impl StubScript {
    /// A `mecab-config` answering `--inc-dir` and `--libs-only-L`.
    pub fn config_tool(inc_dir: &str, libs_only_l: &str) -> String {
        format!(
            "case \"$1\" in\n  --inc-dir) printf '%s\\n' '{}' ;;\n  --libs-only-L) printf '%s\\n' '{}' ;;\nesac\n",
            inc_dir, libs_only_l
        )
    }

    /// An interpreter that answers the build's query with fixed values.
    pub fn python(binding_version: Option<&str>, include: &str, ext_suffix: &str) -> String {
        let mut body = format!(
            "echo 'include={include}'\necho 'platlib={include}/site-packages'\necho 'ext_suffix={ext_suffix}'\n"
        );
        if let Some(version) = binding_version {
            body.push_str(&format!(
                "echo 'pybind11_version={version}'\necho 'pybind11_include=/opt/pybind11/include'\necho 'pybind11_user_include=/home/user/.local/include'\n"
            ));
        }
        body
    }
}

/// A compiler stub.
///
/// Rejects `-std=` flags not in the accepted list (when one is given) and
/// any flag in the rejected list. Creates the `-o` output on success and
/// appends each invocation's arguments to an optional log file.
#[derive(Debug, Clone, Default)]
pub struct CompilerStub {
    accepted_std: Option<Vec<String>>,
    rejected: Vec<String>,
    fail_sources: Vec<String>,
    log: Option<PathBuf>,
}

impl CompilerStub {
    pub fn new() -> Self {
        CompilerStub::default()
    }

    /// Accept only these `-std=` flags.
    pub fn accept_std(mut self, flags: &[&str]) -> Self {
        self.accepted_std = Some(flags.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Reject a flag outright.
    pub fn reject(mut self, flag: &str) -> Self {
        self.rejected.push(flag.to_string());
        self
    }

    /// Fail any invocation naming a source containing `needle`.
    pub fn fail_on_source(mut self, needle: &str) -> Self {
        self.fail_sources.push(needle.to_string());
        self
    }

    /// Record every invocation in `path`.
    pub fn log_to(mut self, path: &Path) -> Self {
        self.log = Some(path.to_path_buf());
        self
    }

    pub fn script(&self) -> String {
        let mut body = String::new();

        if let Some(ref log) = self.log {
            body.push_str(&format!("printf '%s\\n' \"$*\" >> '{}'\n", log.display()));
        }

        body.push_str("out=\"\"\nprev=\"\"\nfor arg in \"$@\"; do\n");

        if let Some(ref accepted) = self.accepted_std {
            body.push_str(&format!(
                "  case \"$arg\" in\n    -std=*) case \" {} \" in *\" $arg \"*) ;; *) echo \"error: invalid value in '$arg'\" >&2; exit 1 ;; esac ;;\n  esac\n",
                accepted.join(" ")
            ));
        }

        if !self.rejected.is_empty() {
            body.push_str(&format!(
                "  case \" {} \" in *\" $arg \"*) echo \"error: unrecognized command-line option '$arg'\" >&2; exit 1 ;; esac\n",
                self.rejected.join(" ")
            ));
        }

        for needle in &self.fail_sources {
            body.push_str(&format!(
                "  case \"$arg\" in *{}*) echo \"$arg:1:10: fatal error: mecab.h: No such file or directory\" >&2; exit 1 ;; esac\n",
                needle
            ));
        }

        body.push_str(
            "  if [ \"$prev\" = \"-o\" ]; then out=\"$arg\"; fi\n  prev=\"$arg\"\ndone\nif [ -n \"$out\" ]; then : > \"$out\"; fi\nexit 0\n",
        );
        body
    }

    /// Write the stub into `dir` as `c++`.
    #[cfg(unix)]
    pub fn install(&self, dir: &Path) -> PathBuf {
        stub_executable(dir, "c++", &self.script())
    }
}

/// In-process flag support: accepts a fixed set of flags and records every
/// flag it was asked about.
#[derive(Debug, Default)]
pub struct MockFlagSupport {
    accepted: Vec<String>,
    calls: RefCell<Vec<String>>,
    compiler: PathBuf,
}

impl MockFlagSupport {
    pub fn accepting(flags: &[&str]) -> Self {
        MockFlagSupport {
            accepted: flags.iter().map(|f| f.to_string()).collect(),
            calls: RefCell::new(Vec::new()),
            compiler: PathBuf::from("mock-c++"),
        }
    }

    /// Flags probed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl FlagSupport for MockFlagSupport {
    fn has_flag(&self, flag: &str) -> Result<bool, BuildError> {
        self.calls.borrow_mut().push(flag.to_string());
        Ok(self.accepted.iter().any(|f| f == flag))
    }

    fn compiler_path(&self) -> &Path {
        &self.compiler
    }
}
