//! mecab-build - build configurator for the MeCab tagger extension
//!
//! This crate locates the MeCab development files through `mecab-config`,
//! probes the C++ compiler for supported flags, and compiles the binding
//! source into a loadable extension module.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for mecab-build unit tests.
///
/// Provides stub executables (query tools, compilers, interpreters) that
/// stand in for the real external programs.
#[cfg(test)]
pub mod test_support;

pub use builder::error::BuildError;
pub use core::manifest::{ExtensionModule, PackageManifest};
pub use ops::build_ext::{build_extensions, BuildExtOptions, BuiltArtifact};
pub use util::context::GlobalContext;
