//! The `mycli` tool that the installer places on PATH.
//!
//! `mycli --version` printing `mycli 0.1.0` and exiting 0 is what the
//! installer's verification step relies on.
use clap::Parser;

/// Banner shown above the help text.
pub const BANNER: &str = r"
   __  ___     ________    ____
  /  |/  /_  _/ ____/ /   /  _/
 / /|_/ / / / / /   / /    / /
/ /  / / /_/ / /___/ /____/ /
/_/  /_/\__, /\____/_____/___/
       /____/
";

/// One-line description printed under the banner.
pub const TAGLINE: &str = "A modern CLI tool for project setup and management";

/// Command line of the `mycli` tool.
#[derive(Parser, Debug)]
#[command(
    name = "mycli",
    version = "0.1.0",
    about = format!("{BANNER}\n{TAGLINE}")
)]
pub struct ToolCli {
    /// Optional name to operate on
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Greeting printed for `--name`.
#[must_use]
pub fn greeting(name: &str) -> String {
    format!("Hello, {name}!")
}
