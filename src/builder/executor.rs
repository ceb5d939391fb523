//! Compile and link extension modules.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::builder::error::BuildError;
use crate::builder::toolchain::{CompileInput, LinkInput, Toolchain};
use crate::core::manifest::ExtensionModule;
use crate::util::process::ProcessBuilder;

/// A finished extension module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltArtifact {
    /// Module name
    pub module: String,
    /// Path of the loadable module
    pub path: PathBuf,
}

/// Runs the toolchain over one module at a time, sequentially.
pub struct ExtensionCompiler<'a> {
    toolchain: &'a dyn Toolchain,
    temp_dir: PathBuf,
    lib_dir: PathBuf,
    suffix: String,
    source_root: PathBuf,
}

impl<'a> ExtensionCompiler<'a> {
    /// Objects go under `temp_dir/<module>/`, modules to `lib_dir/<module><suffix>`.
    pub fn new(
        toolchain: &'a dyn Toolchain,
        temp_dir: impl Into<PathBuf>,
        lib_dir: impl Into<PathBuf>,
        suffix: impl Into<String>,
    ) -> Self {
        ExtensionCompiler {
            toolchain,
            temp_dir: temp_dir.into(),
            lib_dir: lib_dir.into(),
            suffix: suffix.into(),
            source_root: PathBuf::new(),
        }
    }

    /// Sources under `root` keep their relative layout below the object dir.
    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    /// Object path of `source`, mirroring its directory so that
    /// `a/util.cpp` and `b/util.cpp` never share an object.
    pub fn object_path(&self, obj_dir: &Path, source: &Path) -> PathBuf {
        let relative = source.strip_prefix(&self.source_root).unwrap_or(source);

        let mut object = obj_dir.to_path_buf();
        for component in relative.components() {
            match component {
                Component::Normal(part) => object.push(part),
                Component::ParentDir => object.push("__"),
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            }
        }
        object.set_extension(self.toolchain.object_extension());
        object
    }

    /// Output path of `module`.
    pub fn artifact_path(&self, module: &str) -> PathBuf {
        self.lib_dir.join(format!("{}{}", module, self.suffix))
    }

    /// Compile every source of `ext` and link the result.
    ///
    /// `include_dirs` are the module's include directories, already resolved.
    /// The first failing step aborts the module; no artifact is left behind.
    pub fn build(
        &self,
        ext: &ExtensionModule,
        include_dirs: &[PathBuf],
    ) -> Result<BuiltArtifact, BuildError> {
        let obj_dir = self.temp_dir.join(&ext.name);
        create_dir(&obj_dir)?;
        create_dir(&self.lib_dir)?;

        let mut objects = Vec::with_capacity(ext.sources.len());
        for source in &ext.sources {
            objects.push(self.compile(ext, source, &obj_dir, include_dirs)?);
        }

        let output = self.artifact_path(&ext.name);
        let input = LinkInput {
            objects,
            output: output.clone(),
            lib_dirs: ext.library_dirs.clone(),
            libs: ext.libraries.clone(),
            ldflags: ext.extra_link_args.clone(),
        };
        let spec = self.toolchain.link_shared_command(&input, ext.language);
        let program = spec.program.display().to_string();

        let result = ProcessBuilder::from_spec(&spec)
            .output()
            .map_err(|e| BuildError::spawn(&program, e))?;

        if !result.status.success() {
            if output.exists() {
                let _ = std::fs::remove_file(&output);
            }
            return Err(BuildError::Link {
                output,
                stderr: toolchain_output(&result.stdout, &result.stderr),
            });
        }

        tracing::info!("built {} -> {}", ext.name, output.display());
        Ok(BuiltArtifact {
            module: ext.name.clone(),
            path: output,
        })
    }

    fn compile(
        &self,
        ext: &ExtensionModule,
        source: &Path,
        obj_dir: &Path,
        include_dirs: &[PathBuf],
    ) -> Result<PathBuf, BuildError> {
        let object = self.object_path(obj_dir, source);
        if let Some(parent) = object.parent() {
            create_dir(parent)?;
        }

        let input = CompileInput {
            source: source.to_path_buf(),
            output: object.clone(),
            include_dirs: include_dirs.to_vec(),
            cflags: ext.extra_compile_args.clone(),
            pic: true,
        };
        let spec = self.toolchain.compile_command(&input, ext.language);
        let program = spec.program.display().to_string();

        let result = ProcessBuilder::from_spec(&spec)
            .output()
            .map_err(|e| BuildError::spawn(&program, e))?;

        if !result.status.success() {
            return Err(BuildError::Compile {
                file: source.to_path_buf(),
                stderr: toolchain_output(&result.stdout, &result.stderr),
            });
        }

        Ok(object)
    }
}

fn create_dir(dir: &Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| BuildError::io(format!("failed to create {}", dir.display()), e))
}

/// `cl.exe` reports errors on stdout, everything else on stderr.
fn toolchain_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(stdout).into_owned()
    } else {
        stderr.into_owned()
    }
}
