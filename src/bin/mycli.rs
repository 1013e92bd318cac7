//! `mycli`: the tool the installer places on `PATH`.
use clap::Parser;

use mycli::tool::{ToolCli, greeting};

#[allow(clippy::print_stdout)]
fn main() {
    let cli = ToolCli::parse();

    if let Some(name) = cli.name {
        println!("{}", greeting(&name));
    }
}
