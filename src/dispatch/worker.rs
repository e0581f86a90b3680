//! Reader workers
//!
//! A worker opens its own read handle, then pulls tokens from the shared
//! request stream until it is closed. Each read offset is derived from the
//! token and the first 8 bytes of the worker's previous read, so a worker's
//! reads form a strict data-dependent chain.
//!
//! The first I/O failure ends the worker: no retry, no further pulls.

use super::{compute_offset, TerminalSignal};
use crate::config::workload::DispatchMode;
use crate::config::Config;
use crate::engine::{EngineOpener, ReadEngine, ReadError};
use crate::stats::WorkerStats;
use crate::util::buffer::AlignedBuffer;
use crate::util::time::Timestamp;
use crossbeam::channel::Receiver;
use tracing::debug;

/// Everything a worker hands back when it becomes terminal
#[derive(Debug)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub signal: TerminalSignal,
    /// Tokens pulled from the request stream
    pub tokens: u64,
    pub stats: WorkerStats,
}

impl WorkerReport {
    /// Report for a worker that never produced a signal of its own
    pub fn without_signal(worker_id: usize, signal: TerminalSignal) -> Self {
        Self {
            worker_id,
            signal,
            tokens: 0,
            stats: WorkerStats::new(),
        }
    }
}

/// Per-worker state, owned solely by the worker's thread
pub struct Worker {
    id: usize,
    dependency: u64,
    buffer: AlignedBuffer,
    engine: Box<dyn ReadEngine>,
    stats: WorkerStats,
    tokens: u64,
    bound_count: u64,
    chunk_size: u64,
    chained: bool,
}

impl Worker {
    /// Create a worker around an already opened engine
    pub fn new(id: usize, engine: Box<dyn ReadEngine>, config: &Config) -> Self {
        Self {
            id,
            dependency: 0,
            buffer: AlignedBuffer::for_chunk(config.chunk_size as usize, config.direct),
            engine,
            stats: WorkerStats::new(),
            tokens: 0,
            bound_count: config.bound_count(),
            chunk_size: config.chunk_size,
            chained: config.dispatch == DispatchMode::Chained,
        }
    }

    /// Drain the request stream and report how it ended
    ///
    /// The stream receiver is dropped before this returns, so a worker that
    /// stops early no longer counts as a consumer.
    pub fn run(mut self, requests: Receiver<u64>) -> WorkerReport {
        debug!(worker = self.id, "reader started");

        let signal = match self.drain(&requests) {
            Ok(()) => TerminalSignal::Clean,
            Err(e) => TerminalSignal::Failed(e),
        };
        drop(requests);

        debug!(
            worker = self.id,
            reads = self.stats.reads(),
            outcome = %signal,
            "reader finished"
        );

        WorkerReport {
            worker_id: self.id,
            signal,
            tokens: self.tokens,
            stats: self.stats,
        }
    }

    fn drain(&mut self, requests: &Receiver<u64>) -> Result<(), ReadError> {
        for token in requests.iter() {
            self.tokens += 1;
            self.read_one(token)?;
        }
        Ok(())
    }

    /// Read the chunk selected by `token` and fold it into the dependency
    #[inline]
    fn read_one(&mut self, token: u64) -> Result<(), ReadError> {
        let offset = compute_offset(token, self.dependency, self.bound_count, self.chunk_size);
        let expected = self.buffer.size();

        let start = Timestamp::now();
        let n = self
            .engine
            .read_at(self.buffer.as_mut_slice(), offset)
            .map_err(|source| ReadError::Read { offset, source })?;
        let latency = start.elapsed();

        if n != expected {
            return Err(ReadError::ShortRead {
                offset,
                expected,
                actual: n,
            });
        }

        self.stats.record_read(n, latency);
        if self.chained {
            self.dependency = self.buffer.leading_u64();
        }
        Ok(())
    }
}

/// Worker entry point: open a handle, then run until terminal
///
/// An open failure is terminal for this worker only.
pub fn launch(
    id: usize,
    opener: &dyn EngineOpener,
    config: &Config,
    requests: Receiver<u64>,
) -> WorkerReport {
    match opener.open() {
        Ok(engine) => Worker::new(id, engine, config).run(requests),
        Err(e) => {
            drop(requests);
            debug!(worker = id, error = %e, "reader could not open its handle");
            WorkerReport::without_signal(id, TerminalSignal::Failed(e))
        }
    }
}
