//! Result reporting
//!
//! Reports go to stdout in the configured format. Diagnostics never do.

pub mod json;
pub mod text;

use crate::config::workload::OutputFormat;
use crate::config::Config;
use crate::dispatch::RunOutcome;
use crate::Result;

/// Print `outcome` in the format `config` asks for
pub fn print_results(config: &Config, outcome: &RunOutcome) -> Result<()> {
    match config.format {
        OutputFormat::Text => text::print_results(config, outcome),
        OutputFormat::Json => json::print_results(config, outcome),
    }
}
