//! Core data types: the package manifest, extension modules, languages and
//! host platform identity.

pub mod language;
pub mod manifest;
pub mod platform;

pub use language::{CppStandard, Language};
pub use manifest::{ExtensionModule, IncludeDir, PackageManifest};
pub use platform::HostOs;
