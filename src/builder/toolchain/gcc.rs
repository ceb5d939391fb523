//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::language::Language;

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
    /// Path to the C++ compiler
    pub cxx: PathBuf,
    /// Compiler family (gcc, clang, apple-clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, cxx: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain { cc, cxx, family }
    }

    /// Infer the C compiler path from a C++ compiler path.
    ///
    /// Handles common patterns:
    /// - g++, x86_64-linux-gnu-g++ -> gcc, x86_64-linux-gnu-gcc
    /// - clang++ -> clang
    /// - c++, /usr/bin/c++ -> cc, /usr/bin/cc
    pub fn infer_cc(cxx: &Path) -> PathBuf {
        let cxx_str = cxx.to_string_lossy();

        // clang++ also ends in "g++"
        if let Some(prefix) = cxx_str.strip_suffix("clang++") {
            return PathBuf::from(format!("{}clang", prefix));
        }

        if let Some(prefix) = cxx_str.strip_suffix("g++") {
            return PathBuf::from(format!("{}gcc", prefix));
        }

        if let Some(prefix) = cxx_str.strip_suffix("c++") {
            return PathBuf::from(format!("{}cc", prefix));
        }

        cxx.to_path_buf()
    }

    fn driver(&self, lang: Language) -> &Path {
        match lang {
            Language::C => &self.cc,
            Language::Cxx => &self.cxx,
        }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self, lang: Language) -> &Path {
        self.driver(lang)
    }

    fn compile_command(&self, input: &CompileInput, lang: Language) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.driver(lang)).arg("-c");

        if input.pic {
            cmd = cmd.arg("-fPIC");
        }

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        // Probed and per-build flags go last so they win over defaults.
        cmd.args(input.cflags.iter().cloned())
    }

    fn link_shared_command(&self, input: &LinkInput, driver: Language) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.driver(driver)).arg("-shared");

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd.arg("-o").arg(input.output.display().to_string())
    }

    fn object_extension(&self) -> &str {
        "o"
    }

    fn shared_lib_extension(&self) -> &str {
        if self.family == ToolchainPlatform::AppleClang || cfg!(target_os = "macos") {
            "dylib"
        } else {
            "so"
        }
    }
}
