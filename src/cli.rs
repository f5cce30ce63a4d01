// src/cli.rs
//! CLI definitions for aamporter
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aamporter")]
#[command(version)]
#[command(about = "Mirror Adobe AAM updates and import them into Munki", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (TOML or plist)
    #[arg(short, long, global = true, default_value = aamporter::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download current updates for every configured product
    Mirror(MirrorArgs),

    /// Show how the feed resolves for configured channels
    Feed {
        /// Only show this channel
        #[arg(long)]
        channel: Option<String>,

        /// Read the feed from a file instead of the server
        #[arg(long)]
        feed_file: Option<PathBuf>,

        /// List every version, not only the resolved latest
        #[arg(short, long)]
        all: bool,
    },

    /// Import Creative Cloud Packager builds with munkiimport
    ImportCcp {
        /// Directory containing one folder per CCP package
        dir: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct MirrorArgs {
    /// Import downloaded updates with munkiimport
    #[arg(short, long)]
    pub munkiimport: bool,

    /// Also process versions that are revoked or superseded
    #[arg(short = 'r', long)]
    pub include_revoked: bool,

    /// Run munkiimport even when an identical item is already in the repo
    #[arg(short, long, requires = "munkiimport")]
    pub force_import: bool,

    /// Keep updates that are restricted by licensing type
    #[arg(long)]
    pub include_all_licensing: bool,

    /// Resolve updates and fetch details, but download nothing
    #[arg(long, conflicts_with = "munkiimport")]
    pub dry_run: bool,

    /// Read the feed from a file instead of the server
    #[arg(long)]
    pub feed_file: Option<PathBuf>,

    /// Disable download progress bars
    #[arg(long)]
    pub no_progress: bool,
}
