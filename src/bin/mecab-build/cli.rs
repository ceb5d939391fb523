//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// mecab-build - build the MeCab tagger extension module
#[derive(Parser)]
#[command(name = "mecab-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile and link the extension modules
    Build(BuildArgs),

    /// Build, then copy the extension modules into a site directory
    Install(InstallArgs),

    /// Show the compile and link flags a build would use
    Flags(FlagsArgs),

    /// Remove the build directory
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Overrides shared by every command that configures a build.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigureArgs {
    /// Directory for objects and built modules
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Configuration query tool reporting MeCab's paths
    #[arg(long, value_name = "TOOL", env = "MECAB_CONFIG")]
    pub config_tool: Option<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub configure: ConfigureArgs,
}

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub configure: ConfigureArgs,

    /// Install into this directory instead of the interpreter's site directory
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub configure: ConfigureArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Directory to remove instead of the configured build directory
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
