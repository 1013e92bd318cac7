//! Command-line interface of `mycli-install`.
use clap::Parser;
use std::path::PathBuf;

/// Installer for the `mycli` command-line tool.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mycli-install",
    about = "Download, verify, and install the mycli binary, then add it to PATH",
    version
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Read installer settings from a TOML file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Install the binary but do not edit the shell profile
    #[arg(long)]
    pub skip_path: bool,

    /// Fail instead of building from source when the download is unusable
    #[arg(long)]
    pub no_build: bool,
}
