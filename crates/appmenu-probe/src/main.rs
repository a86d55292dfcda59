#![warn(missing_docs)]

//! Entry point for the `appmenu-probe` binary.

mod cli;
mod commands;
mod error;

use std::process;

use clap::Parser;
use tracing::error;

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    logging::init(&log.spec());

    let out = match command {
        Commands::Decode(args) => commands::decode_text(&args)?,
        Commands::Encode(args) => commands::encode_text(&args)?,
        Commands::Type(args) => commands::type_info(&args)?,
        Commands::Config(args) => commands::show_config(&args)?,
    };
    println!("{out}");
    Ok(())
}
