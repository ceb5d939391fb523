//! `mecab-build flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use mecab_build::ops::{resolve_flags, BuildExtOptions};

pub fn execute(args: FlagsArgs) -> Result<()> {
    let ctx = super::context(&args.configure)?;

    let opts = BuildExtOptions {
        status: false,
        ..Default::default()
    };
    let report = resolve_flags(&ctx, &opts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "# {} ({}, {} flags) on {}",
        report.compiler.display(),
        report.toolchain,
        report.family,
        report.host
    );

    println!("# Compile flags:");
    for flag in &report.compile {
        println!("{}", flag);
    }
    for dir in &report.include_dirs {
        println!("-I{}", dir.display());
    }

    println!();
    println!("# Link flags:");
    for flag in &report.link {
        println!("{}", flag);
    }
    for dir in &report.library_dirs {
        println!("-L{}", dir.display());
    }
    for lib in &report.libraries {
        println!("-l{}", lib);
    }

    Ok(())
}
