//! Statistics collection
//!
//! Each worker owns one [`WorkerStats`] and updates it without
//! synchronisation. The driver merges them once every worker is terminal.
//!
//! Nothing here is persisted; statistics live only as long as the report.

pub mod histogram;

use crate::Result;
use histogram::LatencyHistogram;
use std::time::Duration;

/// Per-worker read statistics
///
/// # Example
///
/// ```
/// use randread::stats::WorkerStats;
/// use std::time::Duration;
///
/// let mut stats = WorkerStats::new();
/// stats.record_read(4096, Duration::from_micros(100));
/// stats.record_read(4096, Duration::from_micros(150));
///
/// assert_eq!(stats.reads(), 2);
/// assert_eq!(stats.bytes(), 8192);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkerStats {
    reads: u64,
    bytes: u64,
    latency: LatencyHistogram,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed read
    #[inline(always)]
    pub fn record_read(&mut self, bytes: usize, latency: Duration) {
        self.reads += 1;
        self.bytes += bytes as u64;
        self.latency.record(latency);
    }

    /// Completed reads
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Bytes read by completed reads
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn latency(&self) -> &LatencyHistogram {
        &self.latency
    }

    /// Merge statistics from another worker
    ///
    /// # Errors
    ///
    /// Returns an error if histogram merging fails.
    pub fn merge(&mut self, other: &WorkerStats) -> Result<()> {
        self.reads += other.reads;
        self.bytes += other.bytes;
        self.latency.merge(&other.latency)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_stats_new() {
        let stats = WorkerStats::new();
        assert_eq!(stats.reads(), 0);
        assert_eq!(stats.bytes(), 0);
        assert!(stats.latency().is_empty());
    }

    #[test]
    fn test_record_read() {
        let mut stats = WorkerStats::new();
        stats.record_read(4096, Duration::from_micros(100));
        stats.record_read(4096, Duration::from_micros(200));

        assert_eq!(stats.reads(), 2);
        assert_eq!(stats.bytes(), 8192);
        assert_eq!(stats.latency().len(), 2);
    }

    #[test]
    fn test_merge() {
        let mut total = WorkerStats::new();

        let mut a = WorkerStats::new();
        a.record_read(4096, Duration::from_micros(100));

        let mut b = WorkerStats::new();
        b.record_read(4096, Duration::from_micros(300));
        b.record_read(4096, Duration::from_micros(500));

        total.merge(&a).unwrap();
        total.merge(&b).unwrap();

        assert_eq!(total.reads(), 3);
        assert_eq!(total.bytes(), 3 * 4096);
        assert_eq!(total.latency().len(), 3);
        let max = total.latency().max().unwrap();
        assert!(max.as_micros() >= 495 && max.as_micros() <= 505);
    }
}
