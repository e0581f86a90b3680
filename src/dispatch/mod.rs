//! Concurrent read dispatch
//!
//! The request generator fans tokens out over one shared multi-consumer
//! stream to a fixed pool of reader threads. Each reader fans in exactly one
//! terminal signal over a second channel to the completion collector. The
//! run is timed from just before the first token is dispatched until the
//! collector has every terminal signal.
//!
//! ```text
//! generator --tokens--> [request stream] --> worker 0..C --reports--> collector
//! ```
//!
//! Readers never talk to each other. A failing reader stops on its own and
//! leaves the remaining tokens to the others; when every reader has stopped
//! the generator notices the closed stream and gives up.

pub mod collector;
pub mod generator;
pub mod worker;

use crate::config::validator::DEPENDENCY_BYTES;
use crate::config::workload::WorkerErrorPolicy;
use crate::config::{Config, MIB};
use crate::engine::{EngineOpener, ReadError};
use crate::stats::WorkerStats;
use crate::util::time::Timestamp;
use crate::Result;
use anyhow::Context;
use collector::CompletionCollector;
use crossbeam::channel;
use generator::{DispatchSummary, RequestGenerator};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use worker::WorkerReport;

/// Byte offset of the chunk selected by `token` and `dependency`
///
/// The chunk index is `(token XOR dependency) mod bound_count`, so the result
/// always lies in `[0, (bound_count - 1) * chunk_size]`.
///
/// # Panics
///
/// Panics if `bound_count` is zero.
#[inline(always)]
pub fn compute_offset(token: u64, dependency: u64, bound_count: u64, chunk_size: u64) -> u64 {
    ((token ^ dependency) % bound_count) * chunk_size
}

/// How a worker ended
#[derive(Debug)]
pub enum TerminalSignal {
    /// The request stream closed and every pulled token was read
    Clean,
    /// The first I/O failure of the worker
    Failed(ReadError),
    /// No signal before the configured timeout
    TimedOut,
    /// The worker thread ended without a signal
    Panicked,
}

impl TerminalSignal {
    pub fn is_clean(&self) -> bool {
        matches!(self, TerminalSignal::Clean)
    }

    /// The read error, if the worker failed on I/O
    pub fn error(&self) -> Option<&ReadError> {
        match self {
            TerminalSignal::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Short label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            TerminalSignal::Clean => "clean",
            TerminalSignal::Failed(e) => e.kind(),
            TerminalSignal::TimedOut => "timed_out",
            TerminalSignal::Panicked => "panicked",
        }
    }
}

impl fmt::Display for TerminalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalSignal::Clean => write!(f, "clean"),
            TerminalSignal::Failed(e) => write!(f, "{}", e),
            TerminalSignal::TimedOut => write!(f, "timed out before reporting"),
            TerminalSignal::Panicked => write!(f, "reader thread panicked"),
        }
    }
}

/// Result of one benchmark run
#[derive(Debug)]
pub struct RunOutcome {
    /// Dispatch start to last terminal signal
    pub elapsed: Duration,
    /// Tokens the run was configured to dispatch
    pub requested: u64,
    /// One report per worker, keyed by worker id
    pub reports: BTreeMap<usize, WorkerReport>,
    /// Generator summary, absent if the run timed out before it finished
    pub dispatch: Option<DispatchSummary>,
}

impl RunOutcome {
    /// True only if every worker completed cleanly
    pub fn is_clean(&self) -> bool {
        self.reports.values().all(|r| r.signal.is_clean())
    }

    /// Reads that returned a full chunk
    pub fn successful_reads(&self) -> u64 {
        self.reports.values().map(|r| r.stats.reads()).sum()
    }

    /// Reads that ended a worker
    pub fn failed_reads(&self) -> u64 {
        self.reports
            .values()
            .filter(|r| {
                matches!(
                    r.signal,
                    TerminalSignal::Failed(ReadError::Read { .. })
                        | TerminalSignal::Failed(ReadError::ShortRead { .. })
                )
            })
            .count() as u64
    }

    /// Tokens no worker pulled
    ///
    /// Tokens pulled by a worker that timed out are unknown and counted here.
    pub fn undelivered(&self) -> u64 {
        let pulled: u64 = self.reports.values().map(|r| r.tokens).sum();
        self.requested.saturating_sub(pulled)
    }

    /// Every worker that did not complete cleanly
    pub fn failures(&self) -> impl Iterator<Item = (usize, &TerminalSignal)> {
        self.reports
            .iter()
            .filter(|(_, r)| !r.signal.is_clean())
            .map(|(id, r)| (*id, &r.signal))
    }

    /// I/O errors, one per failed worker
    pub fn errors(&self) -> impl Iterator<Item = (usize, &ReadError)> {
        self.reports
            .iter()
            .filter_map(|(id, r)| r.signal.error().map(|e| (*id, e)))
    }

    /// Apply the worker error policy to this outcome
    ///
    /// Under `Report` failures were already printed and the run succeeds.
    /// Under `Fail` any worker that did not complete cleanly fails the run.
    pub fn check(&self, policy: WorkerErrorPolicy) -> Result<()> {
        if policy == WorkerErrorPolicy::Fail && !self.is_clean() {
            anyhow::bail!(
                "{} of {} readers did not complete cleanly",
                self.failures().count(),
                self.reports.len()
            );
        }
        Ok(())
    }

    /// Statistics merged across every worker
    pub fn total_stats(&self) -> Result<WorkerStats> {
        let mut total = WorkerStats::new();
        for report in self.reports.values() {
            total.merge(&report.stats)?;
        }
        Ok(total)
    }
}

/// Fixed pool of reader threads fed by one request generator
pub struct ReadPool;

impl ReadPool {
    /// Run the benchmark once
    ///
    /// Spawns `config.concurrency` readers, each opening its own handle
    /// through `opener`, then starts the timer and the generator. Returns once
    /// every reader has reported (or the optional timeout expired).
    ///
    /// Worker errors do not fail the run; they are part of the outcome.
    pub fn run(config: &Config, opener: Arc<dyn EngineOpener>) -> Result<RunOutcome> {
        if config.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        // A chunk must hold the dependency word
        if config.chunk_size == 0 || config.chunk_size % DEPENDENCY_BYTES != 0 {
            anyhow::bail!(
                "chunk_size ({}) must be a non-zero multiple of {} bytes",
                config.chunk_size,
                DEPENDENCY_BYTES
            );
        }
        if config.file_size_mib.checked_mul(MIB).is_none() {
            anyhow::bail!("file_size_mib {} is too large", config.file_size_mib);
        }
        if config.bound_count() == 0 {
            anyhow::bail!(
                "file ({} bytes) holds no whole chunk of {} bytes",
                config.file_size_bytes(),
                config.chunk_size
            );
        }

        let config = Arc::new(config.clone());
        let (request_tx, request_rx) = channel::bounded::<u64>(config.request_buffer);
        let (signal_tx, signal_rx) = channel::unbounded::<WorkerReport>();

        let mut workers = Vec::with_capacity(config.concurrency);
        for worker_id in 0..config.concurrency {
            let requests = request_rx.clone();
            let signals = signal_tx.clone();
            let opener = Arc::clone(&opener);
            let config = Arc::clone(&config);

            let handle = thread::Builder::new()
                .name(format!("randread-worker-{}", worker_id))
                .spawn(move || {
                    let report = worker::launch(worker_id, opener.as_ref(), &config, requests);
                    let _ = signals.send(report);
                })
                .with_context(|| format!("Failed to spawn reader thread {}", worker_id))?;

            workers.push(handle);
        }

        // Only the workers hold these now
        drop(request_rx);
        drop(signal_tx);

        let generator = RequestGenerator::new(&config);

        info!(
            readers = config.concurrency,
            reads = config.reads,
            chunk_size = config.chunk_size,
            dispatch = %config.dispatch,
            "starting random reads"
        );

        let start = Timestamp::now();
        let generator_handle = thread::Builder::new()
            .name("randread-generator".to_string())
            .spawn(move || generator.run(request_tx))
            .context("Failed to spawn request generator thread")?;

        let deadline = config.timeout().map(|t| start.deadline(t));
        let reports = CompletionCollector::collect(&signal_rx, config.concurrency, deadline);
        let elapsed = start.elapsed();

        let timed_out = reports
            .values()
            .any(|r| matches!(r.signal, TerminalSignal::TimedOut));

        let dispatch = if timed_out {
            // Stalled readers may still hold the stream; joining could block forever
            warn!("timeout expired, leaving unfinished threads behind");
            None
        } else {
            let summary = generator_handle
                .join()
                .map_err(|_| anyhow::anyhow!("Request generator thread panicked"))?;

            for (worker_id, handle) in workers.into_iter().enumerate() {
                if handle.join().is_err() {
                    debug!(worker = worker_id, "reader thread panicked");
                }
            }
            Some(summary)
        };

        Ok(RunOutcome {
            elapsed,
            requested: config.reads,
            reports,
            dispatch,
        })
    }
}
