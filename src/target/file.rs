//! Backing store file
//!
//! # Features
//!
//! - Creation and population with independent pseudo-random `u64` values
//! - Reuse of an existing file as-is (its size is trusted)
//! - Read-only handles, optionally with O_DIRECT
//!
//! # Example
//!
//! ```no_run
//! use randread::target::file::BackingStore;
//! use std::path::PathBuf;
//!
//! let store = BackingStore::new(PathBuf::from("/tmp/benchmark.dat"), 16 * 1024 * 1024);
//! store.ensure()?;
//! let file = store.open_reader(false)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::BLOCK_SIZE;
use crate::engine::ReadError;
use crate::Result;
use anyhow::Context;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Blocks written per write call while populating
const FILL_BATCH_BLOCKS: usize = 256;

/// Fills larger than this report progress
const PROGRESS_THRESHOLD: u64 = 1024 * 1024 * 1024;

/// Backing store for the benchmark
#[derive(Debug, Clone)]
pub struct BackingStore {
    /// Path to the file
    path: PathBuf,

    /// Size the file is created at
    size_bytes: u64,

    /// Seed for the content generator (entropy when absent)
    seed: Option<u64>,
}

impl BackingStore {
    /// Create a new backing store description
    ///
    /// Nothing touches the filesystem until [`ensure`](Self::ensure).
    pub fn new(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            path,
            size_bytes,
            seed: None,
        }
    }

    /// Populate a newly created file from a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the store exists, creating and populating it if absent
    ///
    /// Returns `true` when the file was created by this call. An existing
    /// file is reused without checking its size or contents.
    pub fn ensure(&self) -> Result<bool> {
        if self.path.exists() {
            let actual = fs::metadata(&self.path)
                .with_context(|| format!("Failed to stat {}", self.path.display()))?
                .len();
            if actual < self.size_bytes {
                warn!(
                    path = %self.path.display(),
                    actual,
                    expected = self.size_bytes,
                    "existing file is smaller than configured, reads past its end will fail"
                );
            }
            debug!(path = %self.path.display(), size = actual, "reusing existing file");
            return Ok(false);
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .with_context(|| format!("Failed to create file: {}", self.path.display()))?;

        if let Err(e) = self.populate(file) {
            // A partially written store would be silently reused by the next run
            let _ = fs::remove_file(&self.path);
            return Err(e);
        }

        Ok(true)
    }

    /// Write `size_bytes` of random little-endian `u64` values in 4 KiB blocks
    fn populate(&self, mut file: File) -> Result<()> {
        let start = Instant::now();
        info!(
            path = %self.path.display(),
            bytes = self.size_bytes,
            "creating backing store"
        );

        let mut rng = match self.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut buffer = vec![0u8; BLOCK_SIZE * FILL_BATCH_BLOCKS];
        let mut written: u64 = 0;

        let show_progress = self.size_bytes > PROGRESS_THRESHOLD;
        let progress_interval = (self.size_bytes / 10).max(1);
        let mut next_progress = progress_interval;

        while written < self.size_bytes {
            let remaining = self.size_bytes - written;
            let len = std::cmp::min(remaining, buffer.len() as u64) as usize;

            fill_words(&mut rng, &mut buffer[..len]);

            file.write_all(&buffer[..len]).with_context(|| {
                format!(
                    "Failed to write {} bytes at offset {} to {}",
                    len,
                    written,
                    self.path.display()
                )
            })?;
            written += len as u64;

            if show_progress && written >= next_progress {
                let percent = (written as f64 / self.size_bytes as f64) * 100.0;
                info!("populating backing store: {:.0}%", percent);
                next_progress += progress_interval;
            }
        }

        file.sync_all()
            .with_context(|| format!("Failed to sync {}", self.path.display()))?;

        info!(
            "backing store created in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Open an independent read-only handle
    pub fn open_reader(&self, direct: bool) -> std::result::Result<File, ReadError> {
        let mut options = OpenOptions::new();
        options.read(true);

        if direct {
            options.custom_flags(libc::O_DIRECT);
        }

        options.open(&self.path).map_err(|source| ReadError::Open {
            path: self.path.clone(),
            source,
        })
    }
}

/// Fill `buf` with independent little-endian `u64` values
///
/// A trailing fragment shorter than 8 bytes gets the low bytes of one more value.
fn fill_words(rng: &mut Xoshiro256PlusPlus, buf: &mut [u8]) {
    let mut words = buf.chunks_exact_mut(8);
    for word in &mut words {
        word.copy_from_slice(&rng.next_u64().to_le_bytes());
    }
    let tail = words.into_remainder();
    if !tail.is_empty() {
        let bytes = rng.next_u64().to_le_bytes();
        let n = tail.len();
        tail.copy_from_slice(&bytes[..n]);
    }
}
