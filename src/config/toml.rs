//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::{
    convert_dispatch_mode, convert_error_policy, convert_format, parse_duration, parse_size,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(ref file) = cli.file {
        config.path = file.clone();
    }
    if let Some(size) = cli.filesize {
        config.file_size_mib = size;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(reads) = cli.reads {
        config.reads = reads;
    }
    if let Some(ref chunk) = cli.chunk_size {
        config.chunk_size = parse_size(chunk).context("Invalid chunk size")?;
    }

    if let Some(mode) = cli.dispatch {
        config.dispatch = convert_dispatch_mode(mode);
    }
    if cli.direct {
        config.direct = true;
    }
    if let Some(buffer) = cli.request_buffer {
        config.request_buffer = buffer;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(ref timeout) = cli.timeout {
        config.timeout_secs = Some(parse_duration(timeout).context("Invalid timeout")?);
    }

    if let Some(policy) = cli.on_worker_error {
        config.on_worker_error = convert_error_policy(policy);
    }
    if let Some(format) = cli.format {
        config.format = convert_format(format);
    }
    if cli.debug {
        config.debug = true;
    }

    Ok(config)
}

/// Build the run configuration: TOML file (if any), then CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    merge_cli_with_config(cli, base)
}
