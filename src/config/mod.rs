//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! The result is a single immutable [`Config`] that is built once in `main`
//! and handed to the store, the generator and the worker pool.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use workload::*;

/// One MiB, the unit the store size is configured in
pub const MIB: u64 = 1024 * 1024;

/// Complete benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Backing store path (created if absent)
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Backing store size in MiB
    #[serde(default = "default_file_size_mib")]
    pub file_size_mib: u64,
    /// Number of concurrent readers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Total number of read requests to dispatch
    #[serde(default = "default_reads")]
    pub reads: u64,
    /// Size of each read and alignment of every offset, in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    /// Token to offset derivation
    #[serde(default)]
    pub dispatch: DispatchMode,
    /// Open the store with O_DIRECT
    #[serde(default)]
    pub direct: bool,
    /// Capacity of the request stream (0 = hand-off, no buffering)
    #[serde(default)]
    pub request_buffer: usize,
    /// Seed for the request generator (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Give up waiting for terminal signals after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Exit status policy when workers fail
    #[serde(default)]
    pub on_worker_error: WorkerErrorPolicy,
    /// Report format
    #[serde(default)]
    pub format: OutputFormat,
    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

fn default_path() -> PathBuf {
    PathBuf::from("benchmark.dat")
}

fn default_file_size_mib() -> u64 {
    4096
}

fn default_concurrency() -> usize {
    1
}

fn default_reads() -> u64 {
    1_000_000
}

fn default_chunk_size() -> u64 {
    4096
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: default_path(),
            file_size_mib: default_file_size_mib(),
            concurrency: default_concurrency(),
            reads: default_reads(),
            chunk_size: default_chunk_size(),
            dispatch: DispatchMode::default(),
            direct: false,
            request_buffer: 0,
            seed: None,
            timeout_secs: None,
            on_worker_error: WorkerErrorPolicy::default(),
            format: OutputFormat::default(),
            debug: false,
        }
    }
}

impl Config {
    /// Backing store size in bytes
    pub fn file_size_bytes(&self) -> u64 {
        self.file_size_mib * MIB
    }

    /// Number of whole chunks in the store, the modulus for every offset
    pub fn bound_count(&self) -> u64 {
        self.file_size_bytes() / self.chunk_size
    }

    /// Collector deadline, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// Display trait implementations

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  File: {} ({} MiB)", self.path.display(), self.file_size_mib)?;
        writeln!(f, "  Concurrency: {}", self.concurrency)?;
        writeln!(f, "  Reads: {}", self.reads)?;
        writeln!(f, "  Chunk size: {} bytes", self.chunk_size)?;
        write!(f, "  Dispatch: {}", self.dispatch)?;
        if self.direct {
            write!(f, ", O_DIRECT")?;
        }
        writeln!(f)?;
        if let Some(secs) = self.timeout_secs {
            writeln!(f, "  Timeout: {}s", secs)?;
        }
        write!(f, "  On worker error: {}", self.on_worker_error)
    }
}
