//! `mecab-build install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use mecab_build::ops::{install, InstallOptions};

pub fn execute(args: InstallArgs) -> Result<()> {
    let ctx = super::context(&args.configure)?;

    let opts = InstallOptions {
        dest: args.dest,
        ..Default::default()
    };
    let installed = install(&ctx, &opts)?;

    eprintln!("    Finished installing {} module(s)", installed.len());
    Ok(())
}
