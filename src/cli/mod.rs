//! Command-line interface

pub mod args;
pub mod commands;
pub mod errors;

use clap::Parser;

pub use args::{Cli, Command, PropertyAction, SchemaAction};
pub use errors::CliError;

/// Parses arguments and dispatches to the selected command.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    commands::run(&cli.config, cli.command)
}
