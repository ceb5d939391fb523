//! Binding header and interpreter lookup.
//!
//! pybind11 may not be installed when the build is configured, so its
//! header directory is only asked for when a compile actually needs it.
//! The interpreter is queried once per locator; the answer is memoized.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use semver::{Version, VersionReq};

use crate::builder::error::BuildError;
use crate::util::process::ProcessBuilder;

/// Printed by the interpreter as `key=value` lines.
const INTERPRETER_QUERY: &str = r#"import sysconfig
paths = sysconfig.get_paths()
print("include=" + paths["include"])
print("platlib=" + paths["platlib"])
print("ext_suffix=" + (sysconfig.get_config_var("EXT_SUFFIX") or ""))
try:
    import pybind11
except ImportError:
    pass
else:
    print("pybind11_version=" + pybind11.__version__)
    print("pybind11_include=" + pybind11.get_include(False))
    print("pybind11_user_include=" + pybind11.get_include(True))
"#;

/// What the interpreter reported about itself and pybind11.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpreterInfo {
    pub include: Option<PathBuf>,
    pub platlib: Option<PathBuf>,
    pub ext_suffix: Option<String>,
    pub binding_version: Option<String>,
    pub binding_include: Option<PathBuf>,
    pub binding_user_include: Option<PathBuf>,
}

impl InterpreterInfo {
    /// Parse `key=value` lines; unknown keys and empty values are ignored.
    pub fn parse(stdout: &str) -> Self {
        let values: HashMap<&str, &str> = stdout
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let path = |key: &str| values.get(key).map(PathBuf::from);
        let text = |key: &str| values.get(key).map(|v| v.to_string());

        InterpreterInfo {
            include: path("include"),
            platlib: path("platlib"),
            ext_suffix: text("ext_suffix"),
            binding_version: text("pybind11_version"),
            binding_include: path("pybind11_include"),
            binding_user_include: path("pybind11_user_include"),
        }
    }
}

/// Lazily resolved binding headers and interpreter paths.
#[derive(Debug)]
pub struct HeaderLocator {
    program: PathBuf,
    requirement: VersionReq,
    info: OnceLock<InterpreterInfo>,
}

impl HeaderLocator {
    /// Nothing runs until the first accessor call.
    pub fn new(program: impl Into<PathBuf>, requirement: VersionReq) -> Self {
        HeaderLocator {
            program: program.into(),
            requirement,
            info: OnceLock::new(),
        }
    }

    /// Query the interpreter on first use.
    ///
    /// A failed query is not memoized; the next call runs it again.
    pub fn info(&self) -> Result<&InterpreterInfo, BuildError> {
        if let Some(info) = self.info.get() {
            return Ok(info);
        }
        let info = self.query()?;
        Ok(self.info.get_or_init(|| info))
    }

    fn query(&self) -> Result<InterpreterInfo, BuildError> {
        let tool = self.program.display().to_string();
        let output = ProcessBuilder::new(&self.program)
            .arg("-c")
            .arg(INTERPRETER_QUERY)
            .output()
            .map_err(|e| BuildError::spawn(&tool, e))?;

        if !output.status.success() {
            return Err(BuildError::QueryFailed {
                tool,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let info = InterpreterInfo::parse(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!("interpreter {}: {:?}", tool, info);
        Ok(info)
    }

    /// The pybind11 header directory, system (`user = false`) or user install.
    pub fn binding_include(&self, user: bool) -> Result<PathBuf, BuildError> {
        let info = self.info()?;
        let dir = if user {
            info.binding_user_include.as_ref()
        } else {
            info.binding_include.as_ref()
        };
        dir.cloned().ok_or_else(|| self.requirement_error(None))
    }

    /// Fail unless the installed pybind11 satisfies the requirement.
    pub fn check_version(&self) -> Result<Version, BuildError> {
        let info = self.info()?;
        let found = info
            .binding_version
            .as_deref()
            .ok_or_else(|| self.requirement_error(None))?;

        match parse_loose_version(found) {
            Some(version) if self.requirement.matches(&version) => Ok(version),
            _ => Err(self.requirement_error(Some(found.to_string()))),
        }
    }

    /// The interpreter's own C header directory.
    pub fn python_include(&self) -> Result<Option<PathBuf>, BuildError> {
        Ok(self.info()?.include.clone())
    }

    /// File name suffix for extension modules, e.g. `.cpython-312-x86_64-linux-gnu.so`.
    pub fn ext_suffix(&self) -> Result<Option<String>, BuildError> {
        Ok(self.info()?.ext_suffix.clone())
    }

    /// Site directory for platform-specific modules.
    pub fn platlib(&self) -> Result<Option<PathBuf>, BuildError> {
        Ok(self.info()?.platlib.clone())
    }

    fn requirement_error(&self, found: Option<String>) -> BuildError {
        BuildError::BindingRequirement {
            requirement: self.requirement.to_string(),
            found,
        }
    }
}

/// Parse `2.2`, `2.10.4` or `2.11.0.dev1` into a semver version.
///
/// Missing components count as zero and anything past the patch number
/// is dropped.
fn parse_loose_version(s: &str) -> Option<Version> {
    let mut parts = s.trim().split('.').map(|part| {
        part.chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse::<u64>()
            .ok()
    });

    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some(Version::new(major, minor, patch))
}
