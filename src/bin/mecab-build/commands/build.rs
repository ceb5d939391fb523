//! `mecab-build build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use mecab_build::ops::{build_extensions, BuildExtOptions};

pub fn execute(args: BuildArgs) -> Result<()> {
    let ctx = super::context(&args.configure)?;

    let artifacts = build_extensions(&ctx, &BuildExtOptions::default())?;

    for artifact in &artifacts {
        let path = artifact
            .path
            .strip_prefix(ctx.cwd())
            .unwrap_or(&artifact.path);
        eprintln!("       Built `{}` -> {}", artifact.module, path.display());
    }

    Ok(())
}
