//! Mock read engine for testing
//!
//! Serves reads from an in-memory byte image instead of a file, so tests can
//! drive the worker pool deterministically without touching the disk.
//!
//! # Features
//!
//! - Reads are copied out of a shared, immutable image
//! - Every read offset is recorded for verification
//! - The Nth read of an engine can be made to fail
//! - The opener can refuse the first N opens
//!
//! # Example
//!
//! ```
//! use randread::engine::{EngineOpener, ReadEngine};
//! use randread::engine::mock::MockOpener;
//!
//! let image: Vec<u8> = (0..8192u32).map(|i| i as u8).collect();
//! let opener = MockOpener::new(image);
//!
//! let mut engine = opener.open().unwrap();
//! let mut buffer = [0u8; 4096];
//! assert_eq!(engine.read_at(&mut buffer, 4096).unwrap(), 4096);
//! assert_eq!(opener.recorded_offsets(), vec![4096]);
//! ```

use super::{EngineOpener, ReadEngine, ReadError};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock engine reading from an in-memory image
pub struct MockEngine {
    /// Bytes served by this engine
    image: Arc<Vec<u8>>,

    /// Offsets read so far, possibly shared with other engines
    offsets: Arc<Mutex<Vec<u64>>>,

    /// 1-based index of the read that fails, if any
    fail_on_read: Option<usize>,

    /// Reads attempted so far
    reads: usize,
}

impl MockEngine {
    /// Create a mock engine over `image` that never fails
    pub fn new(image: Arc<Vec<u8>>) -> Self {
        Self {
            image,
            offsets: Arc::new(Mutex::new(Vec::new())),
            fail_on_read: None,
            reads: 0,
        }
    }

    /// Fail the `nth` read (1-based) with an I/O error
    pub fn fail_on_read(mut self, nth: usize) -> Self {
        self.fail_on_read = Some(nth);
        self
    }

    /// Get a copy of all recorded read offsets
    pub fn recorded_offsets(&self) -> Vec<u64> {
        self.offsets.lock().unwrap().clone()
    }

    fn with_log(mut self, offsets: Arc<Mutex<Vec<u64>>>) -> Self {
        self.offsets = offsets;
        self
    }
}

impl ReadEngine for MockEngine {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.reads += 1;
        self.offsets.lock().unwrap().push(offset);

        if self.fail_on_read == Some(self.reads) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
        }

        let len = self.image.len() as u64;
        if offset >= len {
            return Ok(0);
        }

        let start = offset as usize;
        let end = std::cmp::min(self.image.len(), start + buf.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.image[start..end]);
        Ok(n)
    }
}

/// Opener handing out [`MockEngine`]s over one shared image
pub struct MockOpener {
    image: Arc<Vec<u8>>,
    offsets: Arc<Mutex<Vec<u64>>>,
    failing_opens: AtomicUsize,
    fail_on_read: Option<usize>,
    opened: AtomicUsize,
}

impl MockOpener {
    /// Create an opener whose engines all read `image`
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image: Arc::new(image),
            offsets: Arc::new(Mutex::new(Vec::new())),
            failing_opens: AtomicUsize::new(0),
            fail_on_read: None,
            opened: AtomicUsize::new(0),
        }
    }

    /// Refuse the first `count` opens (`usize::MAX` refuses every open)
    pub fn failing_opens(self, count: usize) -> Self {
        self.failing_opens.store(count, Ordering::SeqCst);
        self
    }

    /// Every engine fails its `nth` read (1-based)
    pub fn failing_read(mut self, nth: usize) -> Self {
        self.fail_on_read = Some(nth);
        self
    }

    /// Offsets read by every engine opened so far, in completion order
    pub fn recorded_offsets(&self) -> Vec<u64> {
        self.offsets.lock().unwrap().clone()
    }

    /// Number of successful opens
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Consume one open failure if any are left
    fn take_failure(&self) -> bool {
        self.failing_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl EngineOpener for MockOpener {
    fn open(&self) -> Result<Box<dyn ReadEngine>, ReadError> {
        if self.take_failure() {
            return Err(ReadError::Open {
                path: PathBuf::from("mock"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "injected open failure"),
            });
        }

        self.opened.fetch_add(1, Ordering::SeqCst);

        let mut engine = MockEngine::new(Arc::clone(&self.image)).with_log(Arc::clone(&self.offsets));
        engine.fail_on_read = self.fail_on_read;
        Ok(Box::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(len: usize) -> Arc<Vec<u8>> {
        Arc::new((0..len).map(|i| (i % 256) as u8).collect())
    }

    #[test]
    fn test_mock_engine_basic() {
        let mut engine = MockEngine::new(image(8192));
        let mut buffer = vec![0u8; 4096];

        let n = engine.read_at(&mut buffer, 4096).unwrap();
        assert_eq!(n, 4096);
        assert_eq!(buffer[0], 0);
        assert_eq!(buffer[1], 1);
        assert_eq!(engine.recorded_offsets(), vec![4096]);
    }

    #[test]
    fn test_mock_engine_failure() {
        let mut engine = MockEngine::new(image(8192)).fail_on_read(2);
        let mut buffer = vec![0u8; 16];

        assert!(engine.read_at(&mut buffer, 0).is_ok());
        let err = engine.read_at(&mut buffer, 16).unwrap_err();
        assert_eq!(err.to_string(), "injected read failure");
        assert!(engine.read_at(&mut buffer, 32).is_ok());
        assert_eq!(engine.recorded_offsets(), vec![0, 16, 32]);
    }

    #[test]
    fn test_mock_engine_partial_transfer() {
        let mut engine = MockEngine::new(image(6000));
        let mut buffer = vec![0u8; 4096];

        assert_eq!(engine.read_at(&mut buffer, 4096).unwrap(), 6000 - 4096);
        assert_eq!(engine.read_at(&mut buffer, 6000).unwrap(), 0);
    }

    #[test]
    fn test_mock_opener_failing_opens() {
        let opener = MockOpener::new(vec![0u8; 4096]).failing_opens(2);

        assert!(matches!(opener.open(), Err(ReadError::Open { .. })));
        assert!(matches!(opener.open(), Err(ReadError::Open { .. })));
        assert!(opener.open().is_ok());
        assert_eq!(opener.opened(), 1);
    }

    #[test]
    fn test_mock_opener_all_opens_fail() {
        let opener = MockOpener::new(vec![0u8; 4096]).failing_opens(usize::MAX);
        for _ in 0..100 {
            assert!(opener.open().is_err());
        }
        assert_eq!(opener.opened(), 0);
    }

    #[test]
    fn test_mock_opener_shares_offset_log() {
        let opener = MockOpener::new(vec![0u8; 8192]).failing_read(3);
        let mut a = opener.open().unwrap();
        let mut b = opener.open().unwrap();
        let mut buffer = [0u8; 8];

        a.read_at(&mut buffer, 0).unwrap();
        b.read_at(&mut buffer, 8).unwrap();
        a.read_at(&mut buffer, 16).unwrap();
        assert!(a.read_at(&mut buffer, 24).is_err());

        assert_eq!(opener.recorded_offsets(), vec![0, 8, 16, 24]);
    }
}
