//! Command definitions (clap derive). Source of truth for the CLI surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tidytree")]
#[command(about = "Propose, review and reversibly apply repository layout fixes")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Debug logging and full error chains
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl GlobalOptions {
    /// Filter directive for the tracing subscriber.
    pub fn log_directive(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan the repository and print file statistics
    Analyze(AnalyzeOptions),

    /// Generate move/flag proposals with confidence and advisories
    Propose(ProposeOptions),

    /// Interactively apply move proposals (dry run unless --execute)
    Apply(ApplyOptions),

    /// Undo the most recent applied moves, newest first
    Rollback(RollbackOptions),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeOptions {
    /// Repository root
    #[arg(default_value = ".")]
    pub repo: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ProposeOptions {
    /// Repository root
    #[arg(default_value = ".")]
    pub repo: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include the before/after tree and impact summary
    #[arg(long)]
    pub preview: bool,

    /// Skip git awareness checks
    #[arg(long)]
    pub no_git: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyOptions {
    /// Repository root
    #[arg(default_value = ".")]
    pub repo: PathBuf,

    /// Perform the moves (default is a dry run)
    #[arg(long)]
    pub execute: bool,

    /// Approve every proposal without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Skip git awareness checks
    #[arg(long)]
    pub no_git: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RollbackOptions {
    /// Repository root
    #[arg(default_value = ".")]
    pub repo: PathBuf,

    /// Number of moves to undo
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Perform the rollback (default is a dry run)
    #[arg(long)]
    pub execute: bool,
}
