//! Completion collector
//!
//! Fan-in side of the pool: waits for exactly one terminal signal per
//! launched worker and keys them by worker id.

use super::worker::WorkerReport;
use super::TerminalSignal;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::warn;

/// Gathers one [`WorkerReport`] per worker
pub struct CompletionCollector;

impl CompletionCollector {
    /// Block until `expected` workers have reported
    ///
    /// With a `deadline`, workers that have not reported when it passes are
    /// marked [`TerminalSignal::TimedOut`]. If every sender is gone before all
    /// reports arrived, the missing workers are marked
    /// [`TerminalSignal::Panicked`]. A second report for the same worker, or a
    /// report from an unknown worker, is discarded.
    pub fn collect(
        signals: &Receiver<WorkerReport>,
        expected: usize,
        deadline: Option<Instant>,
    ) -> BTreeMap<usize, WorkerReport> {
        let mut reports = BTreeMap::new();

        while reports.len() < expected {
            let received = match deadline {
                Some(deadline) => signals.recv_deadline(deadline),
                None => signals.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(report) => {
                    let id = report.worker_id;
                    if id >= expected {
                        warn!(worker = id, "discarding signal from unknown worker");
                    } else if reports.contains_key(&id) {
                        warn!(worker = id, "discarding duplicate terminal signal");
                    } else {
                        reports.insert(id, report);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    Self::fill_missing(&mut reports, expected, || TerminalSignal::TimedOut);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    Self::fill_missing(&mut reports, expected, || TerminalSignal::Panicked);
                }
            }
        }

        for (id, report) in &reports {
            if !report.signal.is_clean() {
                warn!(worker = id, "Error reported from reader: {}", report.signal);
            }
        }

        reports
    }

    fn fill_missing(
        reports: &mut BTreeMap<usize, WorkerReport>,
        expected: usize,
        signal: impl Fn() -> TerminalSignal,
    ) {
        for id in 0..expected {
            reports
                .entry(id)
                .or_insert_with(|| WorkerReport::without_signal(id, signal()));
        }
    }
}
