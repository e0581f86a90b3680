//! Positioned-read engines
//!
//! An engine performs one positioned read at a time on behalf of exactly one
//! worker. Engines are opened per worker by an [`EngineOpener`], so no read
//! handle is ever shared between workers.
//!
//! # Engine Types
//!
//! - **Synchronous**: blocking `pread` against the backing store file
//! - **Mock**: in-memory image with fault injection, for tests
//!
//! # Example
//!
//! ```no_run
//! use randread::engine::{EngineOpener, ReadEngine, StoreOpener};
//! use randread::target::file::BackingStore;
//!
//! let store = BackingStore::new("benchmark.dat".into(), 16 * 1024 * 1024);
//! let opener = StoreOpener::new(store, false);
//! let mut engine = opener.open()?;
//! let mut buffer = vec![0u8; 4096];
//! let n = engine.read_at(&mut buffer, 0)?;
//! assert_eq!(n, 4096);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::target::file::BackingStore;

pub mod mock;
pub mod sync;

/// Engine trait for all read backends
///
/// Engines must be `Send` so they can move into the worker thread that owns
/// them. They are never shared, so `Sync` is not required.
pub trait ReadEngine: Send {
    /// Read into `buf` starting at byte `offset`
    ///
    /// Returns the number of bytes actually read. A value smaller than
    /// `buf.len()` means the end of the data was reached.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

/// Opens one engine per worker
pub trait EngineOpener: Send + Sync {
    /// Open an independent read handle
    fn open(&self) -> Result<Box<dyn ReadEngine>, ReadError>;
}

/// First I/O failure of a worker, carried by its terminal signal
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read at offset {offset} failed: {source}")]
    Read {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },
}

impl ReadError {
    /// Short label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            ReadError::Open { .. } => "open",
            ReadError::Read { .. } => "read",
            ReadError::ShortRead { .. } => "short_read",
        }
    }
}

/// Opens the real backing store, once per worker
pub struct StoreOpener {
    store: BackingStore,
    direct: bool,
}

impl StoreOpener {
    pub fn new(store: BackingStore, direct: bool) -> Self {
        Self { store, direct }
    }
}

impl EngineOpener for StoreOpener {
    fn open(&self) -> Result<Box<dyn ReadEngine>, ReadError> {
        let file = self.store.open_reader(self.direct)?;
        Ok(Box::new(sync::SyncEngine::new(file)))
    }
}
