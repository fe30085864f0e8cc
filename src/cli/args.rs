//! Per-action argument structs, parsed by each handler.
use clap::Parser;
use std::path::PathBuf;

/// Arguments of `atexpand expand`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)] // Handlers receive the arguments after the action name.
pub struct ExpandArgs {
    /// The text to expand. If not provided, each line of stdin is expanded.
    pub text: Option<String>,

    /// Set string variables on top of the configuration (e.g., "KEY=VALUE").
    #[arg(long, short, num_args = 1)]
    pub var: Vec<String>,

    /// Read the configuration from this file instead of the default location.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Fail instead of printing an empty line when the input is malformed.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments of `atexpand vars`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct VarsArgs {
    /// Read the configuration from this file instead of the default location.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

/// Arguments of `atexpand init`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct InitArgs {
    /// Write to this file instead of the default location.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Overwrite an existing file without asking.
    #[arg(long)]
    pub force: bool,
}
