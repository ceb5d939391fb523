//! Per-build compiler and linker flag sets.
//!
//! The base flags per compiler family never change. A build copies the
//! entry for its family into a [`BuildOptionSet`], augments it once, and
//! applies the same set to every extension module.

use serde::Serialize;

use crate::builder::error::BuildError;
use crate::builder::probe::{cpp_flag, FlagSupport, VISIBILITY_HIDDEN};
use crate::builder::toolchain::CompilerFamily;
use crate::core::manifest::ExtensionModule;
use crate::core::platform::HostOs;

/// Flags every build of a family starts from.
pub const BASE_FLAGS: &[(CompilerFamily, &[&str])] = &[
    (CompilerFamily::Msvc, &["/EHsc"]),
    (CompilerFamily::Unix, &[]),
];

/// Base flags for `family`.
pub fn base_flags(family: CompilerFamily) -> &'static [&'static str] {
    BASE_FLAGS
        .iter()
        .find(|(f, _)| *f == family)
        .map(|(_, flags)| *flags)
        .unwrap_or(&[])
}

/// Darwin-only flags for `-flag` style drivers.
fn darwin_flags(macos_min_version: &str) -> Vec<String> {
    vec![
        "-stdlib=libc++".to_string(),
        format!("-mmacosx-version-min={}", macos_min_version),
    ]
}

/// The `VERSION_INFO` preprocessor define in the family's syntax.
///
/// `cl.exe` needs the quotes backslash-escaped to keep them through its
/// command-line parsing.
pub fn version_define(family: CompilerFamily, version: &str) -> String {
    match family {
        CompilerFamily::Unix => format!("-DVERSION_INFO=\"{}\"", version),
        CompilerFamily::Msvc => format!("/DVERSION_INFO=\\\"{}\\\"", version),
    }
}

/// Everything needed to assemble a flag set.
#[derive(Debug, Clone)]
pub struct FlagRequest {
    pub family: CompilerFamily,
    pub host: HostOs,
    /// Package version for `VERSION_INFO`
    pub version: String,
    /// `-std=` candidates, most preferred first
    pub std_candidates: Vec<String>,
    pub macos_min_version: String,
}

/// Compile and link flags for one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOptionSet {
    pub family: CompilerFamily,
    pub compile: Vec<String>,
    pub link: Vec<String>,
}

impl BuildOptionSet {
    /// Assemble the flag set, probing the compiler where the family needs it.
    ///
    /// MSVC builds never probe: they get the base flags and the version
    /// define only.
    pub fn assemble(request: &FlagRequest, compiler: &dyn FlagSupport) -> Result<Self, BuildError> {
        let family = request.family;
        let mut compile: Vec<String> = base_flags(family).iter().map(|f| f.to_string()).collect();
        let mut link = Vec::new();

        match family {
            CompilerFamily::Unix => {
                if request.host.is_darwin() {
                    let darwin = darwin_flags(&request.macos_min_version);
                    compile.extend(darwin.iter().cloned());
                    link.push("-undefined".to_string());
                    link.push("dynamic_lookup".to_string());
                    link.extend(darwin);
                }

                compile.push(version_define(family, &request.version));
                compile.push(cpp_flag(compiler, &request.std_candidates)?);

                if compiler.has_flag(VISIBILITY_HIDDEN)? {
                    compile.push(VISIBILITY_HIDDEN.to_string());
                }
            }
            CompilerFamily::Msvc => {
                compile.push(version_define(family, &request.version));
            }
        }

        tracing::debug!("{} compile flags: {:?}", family, compile);
        Ok(BuildOptionSet {
            family,
            compile,
            link,
        })
    }

    /// Give `ext` this build's flags.
    ///
    /// Compile flags replace whatever the module had. Link flags go before
    /// the module's own so that manifest flags can override them.
    pub fn apply(&self, ext: &mut ExtensionModule) {
        ext.extra_compile_args = self.compile.clone();

        let mut link = self.link.clone();
        link.append(&mut ext.extra_link_args);
        ext.extra_link_args = link;
    }
}
