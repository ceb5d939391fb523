//! High-level operations.
//!
//! This module contains the implementation of mecab-build commands.

pub mod build_ext;
pub mod clean;
pub mod install;

pub use build_ext::{
    build_configured, build_extensions, configure, resolve_flags, BuildExtOptions, BuiltArtifact,
    ConfiguredBuild, FlagReport,
};
pub use clean::clean;
pub use install::{install, InstallOptions};
