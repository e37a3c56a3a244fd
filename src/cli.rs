//! Command-line interface definitions for vidupe.
//!
//! Global options (verbosity, color, config file) apply to every
//! subcommand. Flags given here win over the configuration file and
//! environment.
//!
//! # Example
//!
//! ```bash
//! # Find videos sharing a name under two roots
//! vidupe scan /media /archive
//!
//! # Confirm matches by content, skip a folder, print JSON
//! vidupe scan /media --content -e /media/tmp --output json
//!
//! # Group by the full file name instead of the stem
//! vidupe scan /media --key-policy filename
//!
//! # Move one copy to the trash
//! vidupe delete /media/y/show.mp4 --trash
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::KeyPolicy;

/// Duplicate video finder.
///
/// Groups video files by name across one or more roots and can confirm
/// each group by hashing file contents.
#[derive(Debug, Parser)]
#[command(name = "vidupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Screen-reader friendly progress: plain text lines, no spinners
    #[arg(long, global = true)]
    pub accessible: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate videos
    Scan(ScanArgs),
    /// Delete a single file
    Delete(DeleteArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan, in order (defaults to configured paths, then ".")
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Path prefix to exclude (can be specified multiple times)
    #[arg(short, long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Confirm name matches by hashing full file contents
    #[arg(long, conflicts_with = "names_only")]
    pub content: bool,

    /// Report name matches without hashing, even if configured otherwise
    #[arg(long)]
    pub names_only: bool,

    /// How the grouping key is derived from file names
    #[arg(long, value_enum, value_name = "POLICY")]
    pub key_policy: Option<KeyPolicy>,

    /// Number of I/O threads for hashing
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Follow symbolic links during scan (cycles are detected and skipped)
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

impl ScanArgs {
    /// Content verification override implied by the flags.
    #[must_use]
    pub fn content_override(&self) -> Option<bool> {
        if self.content {
            Some(true)
        } else if self.names_only {
            Some(false)
        } else {
            None
        }
    }
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// File to delete
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Move to the system trash instead of deleting permanently
    #[arg(long)]
    pub trash: bool,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file
    #[arg(long)]
    pub write: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
