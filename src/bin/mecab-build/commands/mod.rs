//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod flags;
pub mod install;

use anyhow::Result;

use crate::cli::ConfigureArgs;
use mecab_build::util::GlobalContext;

/// Context for the current directory with command-line overrides applied.
pub(crate) fn context(args: &ConfigureArgs) -> Result<GlobalContext> {
    let mut ctx = GlobalContext::new()?;

    let build = &mut ctx.config_mut().build;
    if let Some(ref dir) = args.build_dir {
        build.build_dir = Some(dir.clone());
    }
    if let Some(ref tool) = args.config_tool {
        build.config_tool = Some(tool.clone());
    }

    Ok(ctx)
}
