//! CLI command definitions for project-dashboard
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod options;
pub mod view;

use crate::format::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use options::OptionsArgs;
use view::ViewArgs;

/// Output format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    #[default]
    Markdown,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Projects and tasks dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Project export CSV (overrides config)
    #[arg(short, long, global = true)]
    pub projects: Option<String>,

    /// Task export CSV (overrides config)
    #[arg(short, long, global = true)]
    pub tasks: Option<String>,

    /// Text encoding of the exports (overrides config)
    #[arg(short, long, global = true)]
    pub encoding: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web dashboard (default if no subcommand given)
    Serve(ServeArgs),

    /// Print the filtered view
    View(ViewArgs),

    /// Print the selector choices
    Options(OptionsArgs),
}

/// Arguments for the serve subcommand
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port for the web dashboard (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Reload the exports when they change on disk
    #[arg(short, long)]
    pub watch: bool,
}
