//! `mecab-build clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use mecab_build::ops::clean;
use mecab_build::util::GlobalContext;

pub fn execute(args: CleanArgs) -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    if let Some(dir) = args.build_dir {
        ctx.config_mut().build.build_dir = Some(dir);
    }

    if clean(&ctx)? {
        eprintln!("     Removed {}", ctx.build_dir().display());
    } else {
        eprintln!("     Nothing to clean");
    }

    Ok(())
}
