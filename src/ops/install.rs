//! Implementation of `mecab-build install`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ops::build_ext::{build_configured, configure, BuildExtOptions, ConfiguredBuild};
use crate::util::context::GlobalContext;
use crate::util::fs::copy_into;

/// Options for the install command.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Destination directory; the interpreter's site directory when unset
    pub dest: Option<PathBuf>,
    pub build: BuildExtOptions,
}

/// Build every module, then copy the artifacts into the destination.
///
/// The destination is resolved before anything is compiled. Returns the
/// installed paths.
pub fn install(ctx: &GlobalContext, opts: &InstallOptions) -> Result<Vec<PathBuf>> {
    let build = configure(ctx, &opts.build)?;

    let dest = match opts.dest {
        Some(ref dest) => ctx.cwd().join(dest),
        None => site_dir(ctx, &build)?,
    };

    let artifacts = build_configured(ctx, &build, &opts.build)?;

    let mut installed = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let path = copy_into(&artifact.path, &dest)
            .with_context(|| format!("failed to install `{}`", artifact.module))?;
        if opts.build.status {
            eprintln!("  Installing {}", path.display());
        }
        installed.push(path);
    }

    Ok(installed)
}

/// The interpreter's `platlib`, from the same query the build uses.
fn site_dir(ctx: &GlobalContext, build: &ConfiguredBuild) -> Result<PathBuf> {
    build.headers().platlib()?.with_context(|| {
        format!(
            "`{}` reported no site directory; pass --dest",
            ctx.config().python().display()
        )
    })
}
