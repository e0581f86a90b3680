//! CLI to Config conversion utilities

use crate::config::cli;
use crate::config::workload;
use anyhow::{Context, Result};

/// Parse a size string (e.g., "1G", "100M", "4k") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size out of range: {}", s))
}

/// Parse a duration string (e.g., "60s", "5m", "1h") to seconds
pub fn parse_duration(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("s") || s.ends_with("sec") {
        (s.trim_end_matches("sec").trim_end_matches("s"), 1u64)
    } else if s.ends_with("m") || s.ends_with("min") {
        (s.trim_end_matches("min").trim_end_matches("m"), 60)
    } else if s.ends_with("h") || s.ends_with("hr") {
        (s.trim_end_matches("hr").trim_end_matches("h"), 3600)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {}", s))
}

/// Convert CLI DispatchMode to workload DispatchMode
pub fn convert_dispatch_mode(cli_mode: cli::DispatchMode) -> workload::DispatchMode {
    match cli_mode {
        cli::DispatchMode::Chained => workload::DispatchMode::Chained,
        cli::DispatchMode::Independent => workload::DispatchMode::Independent,
    }
}

/// Convert CLI ErrorPolicy to workload WorkerErrorPolicy
pub fn convert_error_policy(cli_policy: cli::ErrorPolicy) -> workload::WorkerErrorPolicy {
    match cli_policy {
        cli::ErrorPolicy::Report => workload::WorkerErrorPolicy::Report,
        cli::ErrorPolicy::Fail => workload::WorkerErrorPolicy::Fail,
    }
}

/// Convert CLI Format to workload OutputFormat
pub fn convert_format(cli_format: cli::Format) -> workload::OutputFormat {
    match cli_format {
        cli::Format::Text => workload::OutputFormat::Text,
        cli::Format::Json => workload::OutputFormat::Json,
    }
}
