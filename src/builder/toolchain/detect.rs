//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use which::which;

use crate::builder::error::BuildError;
use crate::util::config::Config;
use crate::util::process::ProcessBuilder;

use super::{GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform};

/// Detect the C++ toolchain used for the extension build.
///
/// Tries, in order:
/// 1. `build.cxx` from the configuration files
/// 2. The CXX environment variable
/// 3. On Windows: `cl.exe` from a Developer Command Prompt
/// 4. `c++`, `g++`, `clang++` in PATH
pub fn detect_toolchain(config: &Config) -> Result<Box<dyn Toolchain>, BuildError> {
    if let Some(ref cxx) = config.build.cxx {
        tracing::info!("Using C++ compiler from config: {}", cxx.display());
        return Ok(toolchain_for(cxx.clone()));
    }

    if let Ok(cxx) = std::env::var("CXX") {
        if !cxx.is_empty() {
            tracing::debug!("Using C++ compiler from CXX: {}", cxx);
            return Ok(toolchain_for(PathBuf::from(cxx)));
        }
    }

    if let Some(toolchain) = try_detect_msvc()? {
        return Ok(toolchain);
    }

    for candidate in ["c++", "g++", "clang++"] {
        if let Ok(cxx) = which(candidate) {
            tracing::debug!("Found C++ compiler in PATH: {}", cxx.display());
            return Ok(toolchain_for(cxx));
        }
    }

    Err(BuildError::NoCompiler)
}

/// Build the toolchain matching an explicitly chosen C++ driver.
fn toolchain_for(cxx: PathBuf) -> Box<dyn Toolchain> {
    let family = detect_compiler_family(&cxx);

    if family == ToolchainPlatform::Msvc {
        // link.exe ships next to cl.exe
        let link = cxx
            .parent()
            .map(|dir| dir.join("link.exe"))
            .filter(|link| link.exists())
            .unwrap_or_else(|| PathBuf::from("link"));
        tracing::info!("Detected msvc toolchain: cl={}", cxx.display());
        return Box::new(MsvcToolchain::new(cxx, link));
    }

    let cc = std::env::var("CC")
        .ok()
        .filter(|cc| !cc.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| GccToolchain::infer_cc(&cxx));

    tracing::info!(
        "Detected {} toolchain: cxx={}",
        family.as_str(),
        cxx.display()
    );

    Box::new(GccToolchain::new(cc, cxx, family))
}

/// Use `cl.exe` when running inside a configured MSVC environment.
#[cfg(target_os = "windows")]
fn try_detect_msvc() -> Result<Option<Box<dyn Toolchain>>, BuildError> {
    let Ok(cl) = which("cl") else {
        return Ok(None);
    };

    // Without INCLUDE/LIB cl.exe cannot find the SDK headers.
    if std::env::var("INCLUDE").is_err() || std::env::var("LIB").is_err() {
        tracing::warn!(
            "cl.exe found at {} but INCLUDE/LIB are unset; run from a Developer Command Prompt",
            cl.display()
        );
        return Ok(None);
    }

    let link = which("link").map_err(|_| BuildError::ExecutableNotFound {
        tool: "link.exe".to_string(),
    })?;

    tracing::info!("Detected msvc toolchain: cl={}", cl.display());
    Ok(Some(Box::new(MsvcToolchain::new(cl, link))))
}

#[cfg(not(target_os = "windows"))]
fn try_detect_msvc() -> Result<Option<Box<dyn Toolchain>>, BuildError> {
    Ok(None)
}

/// Detect whether the compiler is GCC, Clang, Apple Clang or MSVC.
pub fn detect_compiler_family(cxx: &Path) -> ToolchainPlatform {
    let name = cxx
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name == "cl" {
        return ToolchainPlatform::Msvc;
    }

    let version = ProcessBuilder::new(cxx)
        .arg("--version")
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).to_lowercase())
        .unwrap_or_default();

    if version.contains("apple") && version.contains("clang") {
        ToolchainPlatform::AppleClang
    } else if version.contains("clang") || name.contains("clang") {
        ToolchainPlatform::Clang
    } else {
        ToolchainPlatform::Gcc
    }
}
