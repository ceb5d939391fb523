//! Implementation of `mecab-build clean`.

use anyhow::Result;

use crate::util::context::GlobalContext;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove the build directory. Returns whether there was anything to remove.
pub fn clean(ctx: &GlobalContext) -> Result<bool> {
    let dir = ctx.build_dir();
    let existed = dir.exists();
    remove_dir_all_if_exists(&dir)?;
    if existed {
        tracing::debug!("removed {}", dir.display());
    }
    Ok(existed)
}
