//! CLI argument parsing using clap
//!
//! Every workload option is optional here so that a TOML file can supply it;
//! unset options fall back to the file, then to [`Config::default`].
//!
//! [`Config::default`]: crate::config::Config

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// randread - Concurrent dependent random-read benchmark
#[derive(Parser, Debug, Default)]
#[command(name = "randread")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Name of the file to read from (created and filled if absent)
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Size of the file in MiB
    #[arg(short = 's', long)]
    pub filesize: Option<u64>,

    /// Number of readers issuing random reads concurrently
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Number of reads to perform
    #[arg(short = 'r', long)]
    pub reads: Option<u64>,

    /// Size of each read (e.g., 4k, 8192, 64k)
    #[arg(short = 'b', long)]
    pub chunk_size: Option<String>,

    // === Dispatch Options ===
    /// How request tokens become offsets
    #[arg(long, value_enum)]
    pub dispatch: Option<DispatchMode>,

    /// Open the file with O_DIRECT (chunk size must be a multiple of 512)
    #[arg(long)]
    pub direct: bool,

    /// Requests buffered between the generator and the readers (0 = hand-off)
    #[arg(long)]
    pub request_buffer: Option<usize>,

    /// Seed for the request generator (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop waiting for readers after this long (e.g., 30s, 5m)
    #[arg(long)]
    pub timeout: Option<String>,

    // === Error Handling Options ===
    /// Exit status when readers report errors
    #[arg(long, value_enum)]
    pub on_worker_error: Option<ErrorPolicy>,

    // === Output Options ===
    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    // === Configuration File ===
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dry run - validate configuration without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

/// Dispatch mode
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DispatchMode {
    /// XOR each token with the first word of the previous read
    Chained,
    /// Pre-bounded tokens, no chaining
    Independent,
}

/// Worker error policy
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ErrorPolicy {
    /// Report errors, exit 0
    Report,
    /// Report errors, exit non-zero
    Fail,
}

/// Report format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// Single JSON document
    Json,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    ///
    /// Only catches what clap cannot; the assembled configuration is checked
    /// again by [`crate::config::validator::validate_config`].
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == Some(0) {
            anyhow::bail!("concurrency must be at least 1");
        }

        if self.filesize == Some(0) {
            anyhow::bail!("filesize must be at least 1 MiB");
        }

        Ok(())
    }
}
