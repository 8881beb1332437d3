//! CLI argument parsing for cf-dns-edit.
//!
//! This module defines the command-line interface using clap.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use securefmt::Debug;

/// Main CLI structure.
#[derive(Parser, Debug)]
#[command(
    author,
    about = "Browse and edit Cloudflare DNS records from the terminal",
    disable_version_flag = true
)]
pub struct Cli {
    /// Print the version and exit.
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,

    /// Use this config file instead of the one in the user config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verify the stored API token and exit without starting the editor.
    #[arg(long)]
    pub check: bool,
}

/// The line printed by `--version`.
pub fn version_line() -> String {
    format!("cf-dns-edit version {}", env!("CARGO_PKG_VERSION"))
}
