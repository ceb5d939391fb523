//! Extension build machinery.
//!
//! Path queries, compiler flag probing, flag assembly and the compiler
//! driver that turns an extension module into a loadable artifact.

pub mod error;
pub mod executor;
pub mod headers;
pub mod options;
pub mod probe;
pub mod query;
pub mod toolchain;

pub use error::BuildError;
pub use executor::{BuiltArtifact, ExtensionCompiler};
pub use headers::HeaderLocator;
pub use options::{BuildOptionSet, FlagRequest};
pub use probe::{cpp_flag, FlagSupport, TrialCompiler};
pub use query::{query_tool, ConfigTool, LibraryPaths};
pub use toolchain::{
    detect_toolchain, CommandSpec, CompilerFamily, GccToolchain, MsvcToolchain, Toolchain,
    ToolchainPlatform,
};
