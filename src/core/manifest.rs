//! Extension.toml manifest parsing and the extension module model.
//!
//! The manifest is optional. Without one, the package is the `mecab_pybind`
//! tagger binding: one C++ source, the pybind11 headers, and `libmecab`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::VersionReq;
use serde::Deserialize;

use crate::core::language::Language;
use crate::util::fs::glob_files;

/// Manifest file name looked up in the project root.
pub const MANIFEST_FILE: &str = "Extension.toml";

/// Name of the default extension module and package.
pub const DEFAULT_MODULE: &str = "mecab_pybind";

/// Default package version, fed to the `VERSION_INFO` define.
pub const DEFAULT_VERSION: &str = "0.1";

/// Minimum pybind11 version the binding source compiles against.
pub const DEFAULT_BINDING_REQUIREMENT: &str = ">=2.2";

/// An include directory of an extension module.
///
/// Binding headers are not known until the binding package is installed,
/// so they stay unresolved until the build asks for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeDir {
    /// A concrete directory.
    Path(PathBuf),
    /// The pybind11 header directory, system or user install.
    BindingHeaders { user: bool },
}

/// A loadable native module to compile and link.
#[derive(Debug, Clone)]
pub struct ExtensionModule {
    /// Module name, also the artifact's base file name
    pub name: String,
    /// Source files
    pub sources: Vec<PathBuf>,
    /// Include directories, in search order
    pub include_dirs: Vec<IncludeDir>,
    /// Library search paths
    pub library_dirs: Vec<PathBuf>,
    /// Libraries to link (without -l prefix)
    pub libraries: Vec<String>,
    /// Source language
    pub language: Language,
    /// Compile flags, assigned by the build orchestrator
    pub extra_compile_args: Vec<String>,
    /// Additional link flags
    pub extra_link_args: Vec<String>,
}

impl ExtensionModule {
    /// Create an empty C++ module.
    pub fn new(name: impl Into<String>) -> Self {
        ExtensionModule {
            name: name.into(),
            sources: Vec::new(),
            include_dirs: Vec::new(),
            library_dirs: Vec::new(),
            libraries: Vec::new(),
            language: Language::Cxx,
            extra_compile_args: Vec::new(),
            extra_link_args: Vec::new(),
        }
    }

    /// The tagger binding module.
    pub fn mecab_pybind(root: &Path) -> Self {
        let mut ext = ExtensionModule::new(DEFAULT_MODULE);
        ext.sources = vec![root.join("mecab_pybind").join("tagger.cpp")];
        ext.include_dirs = vec![
            IncludeDir::BindingHeaders { user: false },
            IncludeDir::BindingHeaders { user: true },
        ];
        ext.libraries = vec!["mecab".to_string()];
        ext
    }

    /// Append MeCab's include and library directories.
    pub fn add_library_paths(&mut self, include_dirs: &[PathBuf], library_dirs: &[PathBuf]) {
        self.include_dirs
            .extend(include_dirs.iter().cloned().map(IncludeDir::Path));
        self.library_dirs.extend(library_dirs.iter().cloned());
    }
}

/// Package metadata from the [package] section.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    /// Package name
    pub name: String,

    /// Package version, used verbatim in `VERSION_INFO`
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Runtime requirements from the [requires] section.
#[derive(Debug, Clone, Deserialize)]
struct RawRequires {
    #[serde(default = "default_binding_requirement")]
    pybind11: String,
}

impl Default for RawRequires {
    fn default() -> Self {
        RawRequires {
            pybind11: default_binding_requirement(),
        }
    }
}

fn default_binding_requirement() -> String {
    DEFAULT_BINDING_REQUIREMENT.to_string()
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawManifest {
    package: PackageMetadata,

    #[serde(default)]
    requires: RawRequires,

    #[serde(default, rename = "extension")]
    extensions: Vec<RawExtension>,
}

/// Raw [[extension]] entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawExtension {
    name: String,

    /// Source paths or glob patterns, relative to the manifest
    sources: Vec<String>,

    #[serde(default)]
    include_dirs: Vec<PathBuf>,

    #[serde(default)]
    library_dirs: Vec<PathBuf>,

    #[serde(default = "default_libraries")]
    libraries: Vec<String>,

    #[serde(default)]
    language: Language,

    /// Add the pybind11 include directories (default: true)
    #[serde(default = "default_true")]
    binding_headers: bool,

    #[serde(default)]
    extra_link_args: Vec<String>,
}

fn default_libraries() -> Vec<String> {
    vec!["mecab".to_string()]
}

fn default_true() -> bool {
    true
}

/// The package being built.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    /// Package metadata
    pub package: PackageMetadata,

    /// Required binding header version
    pub binding_requirement: VersionReq,

    /// Declared extension modules
    pub extensions: Vec<ExtensionModule>,

    /// The project root
    pub root: PathBuf,
}

impl PackageManifest {
    /// The built-in `mecab_pybind` package rooted at `root`.
    pub fn mecab_pybind(root: &Path) -> Self {
        PackageManifest {
            package: PackageMetadata {
                name: DEFAULT_MODULE.to_string(),
                version: DEFAULT_VERSION.to_string(),
                description: Some("MeCab tagger binding".to_string()),
            },
            binding_requirement: default_requirement(),
            extensions: vec![ExtensionModule::mecab_pybind(root)],
            root: root.to_path_buf(),
        }
    }

    /// Load `Extension.toml` from `root`, falling back to the built-in package.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("no {} in {}, using built-in package", MANIFEST_FILE, root.display());
            Ok(Self::mecab_pybind(root))
        }
    }

    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let root = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let binding_requirement = VersionReq::parse(&raw.requires.pybind11).with_context(|| {
            format!(
                "invalid pybind11 requirement `{}` in {}",
                raw.requires.pybind11,
                path.display()
            )
        })?;

        let mut extensions: Vec<ExtensionModule> = Vec::new();
        for raw_ext in raw.extensions {
            validate_module_name(&raw_ext.name)
                .with_context(|| format!("invalid [[extension]] in {}", path.display()))?;
            if extensions.iter().any(|ext| ext.name == raw_ext.name) {
                anyhow::bail!(
                    "extension `{}` is declared twice in {}",
                    raw_ext.name,
                    path.display()
                );
            }
            extensions.push(Self::convert_extension(raw_ext, &root)?);
        }

        if extensions.is_empty() {
            anyhow::bail!(
                "manifest at {} declares no [[extension]] modules",
                path.display()
            );
        }

        Ok(PackageManifest {
            package: raw.package,
            binding_requirement,
            extensions,
            root,
        })
    }

    fn convert_extension(raw: RawExtension, root: &Path) -> Result<ExtensionModule> {
        let mut ext = ExtensionModule::new(raw.name);

        for pattern in &raw.sources {
            if is_glob(pattern) {
                let matched = glob_files(root, std::slice::from_ref(pattern))?;
                if matched.is_empty() {
                    tracing::warn!("source pattern `{}` matched no files", pattern);
                }
                ext.sources.extend(matched);
            } else {
                // Missing plain paths surface as compiler errors.
                ext.sources.push(root.join(pattern));
            }
        }

        if ext.sources.is_empty() {
            anyhow::bail!("extension `{}` has no sources", ext.name);
        }

        if raw.binding_headers {
            ext.include_dirs.push(IncludeDir::BindingHeaders { user: false });
            ext.include_dirs.push(IncludeDir::BindingHeaders { user: true });
        }
        ext.include_dirs.extend(
            raw.include_dirs
                .into_iter()
                .map(|dir| IncludeDir::Path(root.join(dir))),
        );
        ext.library_dirs = raw
            .library_dirs
            .into_iter()
            .map(|dir| root.join(dir))
            .collect();
        ext.libraries = raw.libraries;
        ext.language = raw.language;
        ext.extra_link_args = raw.extra_link_args;

        Ok(ext)
    }

    /// Package name.
    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Package version string.
    pub fn version(&self) -> &str {
        &self.package.version
    }
}

fn default_requirement() -> VersionReq {
    VersionReq::parse(DEFAULT_BINDING_REQUIREMENT).unwrap_or(VersionReq::STAR)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Module names become file names under the build directory and the
/// import name of the module, so only identifiers are accepted.
fn validate_module_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        anyhow::bail!(
            "extension name `{}` is not a valid module name (letters, digits and `_` only)",
            name
        );
    }
    Ok(())
}
