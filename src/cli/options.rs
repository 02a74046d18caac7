//! Options subcommand: list the values each selector offers.

use super::FormatArg;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the options subcommand
#[derive(Args, Debug, Default)]
pub struct OptionsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Markdown)]
    pub format: FormatArg,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
