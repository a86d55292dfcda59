//! Command-line interface definitions for appmenu-probe.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `appmenu-probe` binary.
#[derive(Parser, Debug)]
#[command(
    name = "appmenu-probe",
    about = "Inspect variant values and configuration for the appmenu bridge",
    version
)]
pub struct Cli {
    /// Logging controls shared across appmenu binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// What to inspect.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level probe commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse variant text and show the decoded value.
    Decode(DecodeArgs),
    /// Parse variant text, decode it, and encode it again, optionally against
    /// a type string.
    Encode(EncodeArgs),
    /// Validate a type string and print it normalized.
    Type(TypeArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
}

/// Arguments for the `decode` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Variant text, e.g. `{'a': <int32 5>}`.
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Print the decoded value as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `encode` subcommand.
#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Variant text to round-trip.
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Type string that should direct the encoding, e.g. `au`.
    #[arg(long, value_name = "SIG")]
    pub schema: Option<String>,
}

/// Arguments for the `type` subcommand.
#[derive(Args, Debug, Clone)]
pub struct TypeArgs {
    /// Type string, e.g. `a{sv}`.
    #[arg(value_name = "SIG")]
    pub signature: String,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Load this file instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Only print which file would be used.
    #[arg(long)]
    pub path: bool,
}
