//! Implementation of `mecab-build build`.
//!
//! One linear pass: query MeCab's paths, detect the compiler, assemble the
//! flag set, then compile and link every declared module with it.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use crate::builder::error::BuildError;
use crate::builder::headers::HeaderLocator;
use crate::builder::options::{BuildOptionSet, FlagRequest};
use crate::builder::probe::TrialCompiler;
use crate::builder::query::{ConfigTool, LibraryPaths};
use crate::builder::toolchain::{detect_toolchain, CompilerFamily, Toolchain};
use crate::builder::ExtensionCompiler;
use crate::core::language::Language;
use crate::core::manifest::{ExtensionModule, IncludeDir, PackageManifest};
use crate::core::platform::HostOs;
use crate::util::context::GlobalContext;

pub use crate::builder::executor::BuiltArtifact;

/// Options for building extensions.
#[derive(Debug, Clone)]
pub struct BuildExtOptions {
    /// Host the flags are assembled for
    pub host: HostOs,
    /// Print `Compiling`/`Finished` status lines
    pub status: bool,
}

impl Default for BuildExtOptions {
    fn default() -> Self {
        BuildExtOptions {
            host: HostOs::current(),
            status: true,
        }
    }
}

/// A package whose modules carry this build's paths and flags.
pub struct ConfiguredBuild {
    pub manifest: PackageManifest,
    pub paths: LibraryPaths,
    pub options: BuildOptionSet,
    pub host: HostOs,
    toolchain: Box<dyn Toolchain>,
    headers: HeaderLocator,
}

impl ConfiguredBuild {
    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    pub fn headers(&self) -> &HeaderLocator {
        &self.headers
    }

    fn needs_binding_headers(&self) -> bool {
        self.manifest.extensions.iter().any(|ext| {
            ext.include_dirs
                .iter()
                .any(|dir| matches!(dir, IncludeDir::BindingHeaders { .. }))
        })
    }

    /// Concrete include directories of `ext`, in search order.
    ///
    /// Binding headers are resolved here, on first use. The interpreter's
    /// own header directory is appended when it is known.
    pub fn include_dirs(&self, ext: &ExtensionModule) -> Result<Vec<PathBuf>, BuildError> {
        let mut dirs = Vec::new();
        for dir in &ext.include_dirs {
            let dir = match dir {
                IncludeDir::Path(path) => path.clone(),
                IncludeDir::BindingHeaders { user } => self.headers.binding_include(*user)?,
            };
            push_unique(&mut dirs, dir);
        }

        if self.needs_binding_headers() {
            if let Some(include) = self.headers.python_include()? {
                push_unique(&mut dirs, include);
            }
        }

        Ok(dirs)
    }

    /// File name suffix of built modules.
    ///
    /// Comes from the interpreter when it can be asked, otherwise the
    /// toolchain's shared library extension.
    pub fn module_suffix(&self) -> Result<String, BuildError> {
        let fallback = format!(".{}", self.toolchain.shared_lib_extension());
        match self.headers.ext_suffix() {
            Ok(Some(suffix)) => Ok(suffix),
            Ok(None) => Ok(fallback),
            // Without binding headers the interpreter is optional.
            Err(e) if !self.needs_binding_headers() => {
                tracing::debug!("no module suffix from interpreter: {}", e);
                Ok(fallback)
            }
            Err(e) => Err(e),
        }
    }
}

fn push_unique(dirs: &mut Vec<PathBuf>, dir: PathBuf) {
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

/// Query paths, detect the compiler and assign flags to every module.
///
/// The configuration tool runs first so that a missing MeCab install is
/// reported before any compiler is started.
pub fn configure(ctx: &GlobalContext, opts: &BuildExtOptions) -> Result<ConfiguredBuild> {
    let config = ctx.config();
    let mut manifest = PackageManifest::discover(ctx.cwd())?;

    let paths = ConfigTool::new(config.config_tool()).query_paths()?;

    let toolchain = detect_toolchain(config)?;
    let family = toolchain.platform().family();
    tracing::debug!(
        "{} toolchain ({} flags) on {}",
        toolchain.platform().as_str(),
        family,
        opts.host
    );

    let request = FlagRequest {
        family,
        host: opts.host,
        version: manifest.version().to_string(),
        std_candidates: config.std_candidates(),
        macos_min_version: config.macos_min_version().to_string(),
    };
    let options = {
        let probe = TrialCompiler::new(toolchain.as_ref());
        BuildOptionSet::assemble(&request, &probe)?
    };

    for ext in &mut manifest.extensions {
        ext.add_library_paths(&paths.include_dirs, &paths.library_dirs);
        options.apply(ext);
    }

    let headers = HeaderLocator::new(config.python(), manifest.binding_requirement.clone());

    Ok(ConfiguredBuild {
        manifest,
        paths,
        options,
        host: opts.host,
        toolchain,
        headers,
    })
}

/// Build every extension module of the package in `ctx`.
pub fn build_extensions(ctx: &GlobalContext, opts: &BuildExtOptions) -> Result<Vec<BuiltArtifact>> {
    let build = configure(ctx, opts)?;
    build_configured(ctx, &build, opts)
}

/// Compile and link the modules of an already configured build.
///
/// Interpreter answers already cached in `build` are reused.
pub fn build_configured(
    ctx: &GlobalContext,
    build: &ConfiguredBuild,
    opts: &BuildExtOptions,
) -> Result<Vec<BuiltArtifact>> {
    let start = Instant::now();

    if build.needs_binding_headers() {
        let version = build.headers().check_version()?;
        tracing::debug!("pybind11 {}", version);
    }

    let compiler = ExtensionCompiler::new(
        build.toolchain(),
        ctx.temp_dir(),
        ctx.lib_dir(),
        build.module_suffix()?,
    )
    .source_root(&build.manifest.root);

    let mut artifacts = Vec::with_capacity(build.manifest.extensions.len());
    for ext in &build.manifest.extensions {
        if opts.status {
            eprintln!(
                "   Compiling {} v{} ({})",
                ext.name,
                build.manifest.version(),
                display_root(&build.manifest.root)
            );
        }
        let include_dirs = build.include_dirs(ext)?;
        artifacts.push(compiler.build(ext, &include_dirs)?);
    }

    if opts.status {
        eprintln!(
            "    Finished {} module(s) in {:.2}s",
            artifacts.len(),
            start.elapsed().as_secs_f64()
        );
    }

    Ok(artifacts)
}

fn display_root(root: &Path) -> String {
    if root.as_os_str().is_empty() {
        ".".to_string()
    } else {
        root.display().to_string()
    }
}

/// Resolved flags, as shown by `mecab-build flags`.
#[derive(Debug, Clone, Serialize)]
pub struct FlagReport {
    pub compiler: PathBuf,
    pub toolchain: &'static str,
    pub family: CompilerFamily,
    pub host: &'static str,
    pub compile: Vec<String>,
    pub link: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
}

/// Resolve the flags a build would use without compiling any module.
///
/// The standard and visibility probes still run.
pub fn resolve_flags(ctx: &GlobalContext, opts: &BuildExtOptions) -> Result<FlagReport> {
    let build = configure(ctx, opts)?;
    let toolchain = build.toolchain();

    let mut libraries = Vec::new();
    for ext in &build.manifest.extensions {
        for lib in &ext.libraries {
            if !libraries.contains(lib) {
                libraries.push(lib.clone());
            }
        }
    }

    Ok(FlagReport {
        compiler: toolchain.compiler_path(Language::Cxx).to_path_buf(),
        toolchain: toolchain.platform().as_str(),
        family: build.options.family,
        host: build.host.as_str(),
        compile: build.options.compile.clone(),
        link: build.options.link.clone(),
        include_dirs: build.paths.include_dirs.clone(),
        library_dirs: build.paths.library_dirs.clone(),
        libraries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::{BuildConfig, Config};
    use tempfile::TempDir;

    fn context(root: &Path, build: BuildConfig) -> GlobalContext {
        GlobalContext::from_config(root.to_path_buf(), Config { build })
    }

    fn quiet(host: HostOs) -> BuildExtOptions {
        BuildExtOptions {
            host,
            status: false,
        }
    }

    #[test]
    fn missing_config_tool_fails_before_compiling() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("cxx.log");
        let ctx = context(
            tmp.path(),
            BuildConfig {
                config_tool: Some("mecab-config-missing-for-test".to_string()),
                cxx: Some(log.clone()),
                ..Default::default()
            },
        );

        let err = build_extensions(&ctx, &quiet(HostOs::Linux)).unwrap_err();
        let build_err = err.downcast_ref::<BuildError>().unwrap();
        assert!(matches!(build_err, BuildError::ExecutableNotFound { tool } if tool == "mecab-config-missing-for-test"));
        assert!(!ctx.build_dir().exists());
    }

    #[cfg(unix)]
    mod stubbed {
        use super::super::*;
        use super::{context, quiet};
        use crate::test_support::{stub_executable, CompilerStub, StubScript};
        use crate::util::config::BuildConfig;
        use tempfile::TempDir;

        struct Project {
            _tmp: TempDir,
            root: PathBuf,
            log: PathBuf,
            config: BuildConfig,
        }

        fn project(compiler: CompilerStub, binding_version: Option<&str>) -> Project {
            let tmp = TempDir::new().unwrap();
            let root = tmp.path().join("pkg");
            let bin = tmp.path().join("bin");
            std::fs::create_dir_all(root.join("mecab_pybind")).unwrap();
            std::fs::create_dir_all(&bin).unwrap();
            std::fs::write(root.join("mecab_pybind/tagger.cpp"), "").unwrap();

            let log = tmp.path().join("cxx.log");
            let cxx = compiler.log_to(&log).install(&bin);
            let tool = stub_executable(
                &bin,
                "mecab-config",
                &StubScript::config_tool("/usr/include/mecab ", "-L/usr/lib/mecab"),
            );
            let python = stub_executable(
                &bin,
                "python3",
                &StubScript::python(binding_version, "/usr/include/python3.12", ".cpython-312.so"),
            );

            let config = BuildConfig {
                config_tool: Some(tool.display().to_string()),
                python: Some(python),
                cxx: Some(cxx),
                ..Default::default()
            };
            Project {
                _tmp: tmp,
                root,
                log,
                config,
            }
        }

        #[test]
        fn builds_the_tagger_module() {
            let p = project(CompilerStub::new().accept_std(&["-std=c++11"]), Some("2.11.1"));
            let ctx = context(&p.root, p.config.clone());

            let artifacts = build_extensions(&ctx, &quiet(HostOs::Linux)).unwrap();
            assert_eq!(artifacts.len(), 1);
            assert_eq!(artifacts[0].module, "mecab_pybind");
            assert_eq!(
                artifacts[0].path,
                p.root.join("build/lib/mecab_pybind.cpython-312.so")
            );
            assert!(artifacts[0].path.exists());

            let calls = std::fs::read_to_string(&p.log).unwrap();
            let compile = calls
                .lines()
                .find(|line| line.contains("tagger.cpp"))
                .unwrap();
            assert!(compile.contains("-std=c++11"));
            assert!(compile.contains("-fvisibility=hidden"));
            assert!(compile.contains("-DVERSION_INFO=\"0.1\""));
            assert!(compile.contains("-I/opt/pybind11/include"));
            assert!(compile.contains("-I/usr/include/mecab"));
            assert!(compile.contains("-I/usr/include/python3.12"));
        }

        #[test]
        fn binding_headers_come_before_mecab_headers() {
            let p = project(CompilerStub::new(), Some("2.11.1"));
            let ctx = context(&p.root, p.config.clone());

            let build = configure(&ctx, &quiet(HostOs::Linux)).unwrap();
            let ext = &build.manifest.extensions[0];
            assert_eq!(
                build.include_dirs(ext).unwrap(),
                vec![
                    PathBuf::from("/opt/pybind11/include"),
                    PathBuf::from("/home/user/.local/include"),
                    PathBuf::from("/usr/include/mecab"),
                    PathBuf::from("/usr/include/python3.12"),
                ]
            );
            assert_eq!(ext.library_dirs, vec![PathBuf::from("/usr/lib/mecab")]);
            assert_eq!(ext.libraries, vec!["mecab"]);
        }

        #[test]
        fn old_binding_package_stops_the_build() {
            let p = project(CompilerStub::new(), Some("2.0.1"));
            let ctx = context(&p.root, p.config.clone());

            let err = build_extensions(&ctx, &quiet(HostOs::Linux)).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<BuildError>(),
                Some(BuildError::BindingRequirement { .. })
            ));
        }

        #[test]
        fn unsupported_compiler_stops_the_build() {
            let p = project(CompilerStub::new().accept_std(&["-std=c++03"]), Some("2.11.1"));
            let ctx = context(&p.root, p.config.clone());

            let err = build_extensions(&ctx, &quiet(HostOs::Linux)).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Unsupported compiler -- at least C++11 support is needed!"
            );
            assert!(!ctx.lib_dir().exists());
        }

        #[test]
        fn darwin_flags_reach_the_report() {
            let p = project(CompilerStub::new(), None);
            let ctx = context(&p.root, p.config.clone());

            let report = resolve_flags(&ctx, &quiet(HostOs::Darwin)).unwrap();
            assert_eq!(report.family, CompilerFamily::Unix);
            assert_eq!(report.host, "darwin");
            assert!(report.compile.contains(&"-stdlib=libc++".to_string()));
            assert!(report.compile.contains(&"-mmacosx-version-min=10.7".to_string()));
            assert!(report.compile.contains(&"-std=c++14".to_string()));
            assert!(report.link.contains(&"dynamic_lookup".to_string()));
            assert_eq!(report.include_dirs, vec![PathBuf::from("/usr/include/mecab")]);
        }
    }
}
