//! Request generator
//!
//! Draws R tokens from a uniform 64-bit source and pushes them, one at a
//! time, into the shared request stream. Dropping the sender closes the
//! stream, which is the only "no more requests" signal workers get.

use crate::config::workload::DispatchMode;
use crate::config::Config;
use crossbeam::channel::Sender;
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, warn};

/// What the generator managed to hand to the request stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DispatchSummary {
    /// Tokens requested by the configuration
    pub requested: u64,
    /// Tokens drawn from the random source
    pub generated: u64,
    /// Tokens accepted by the request stream
    pub enqueued: u64,
}

/// Produces the configured number of request tokens
pub struct RequestGenerator {
    reads: u64,
    mode: DispatchMode,
    bound_count: u64,
    rng: Xoshiro256PlusPlus,
}

impl RequestGenerator {
    /// Create a generator for `config`, seeded from `config.seed` or entropy
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        Self {
            reads: config.reads,
            mode: config.dispatch,
            bound_count: config.bound_count(),
            rng,
        }
    }

    /// Draw the next token
    ///
    /// Chained tokens are unconstrained. Independent tokens are already
    /// bounded to `[0, bound_count)` since no dependency will be mixed in.
    #[inline]
    pub fn next_token(&mut self) -> u64 {
        match self.mode {
            DispatchMode::Chained => self.rng.next_u64(),
            DispatchMode::Independent => self.rng.gen_range(0..self.bound_count),
        }
    }

    /// The full token sequence this generator would dispatch
    pub fn tokens(mut self) -> impl Iterator<Item = u64> {
        (0..self.reads).map(move |_| self.next_token())
    }

    /// Push every token into `requests`, then close the stream
    ///
    /// Stops early when every receiver has hung up, which only happens once
    /// every worker is terminal. The remaining tokens are left undelivered.
    pub fn run(mut self, requests: Sender<u64>) -> DispatchSummary {
        let mut summary = DispatchSummary {
            requested: self.reads,
            generated: 0,
            enqueued: 0,
        };

        for _ in 0..self.reads {
            let token = self.next_token();
            summary.generated += 1;

            if requests.send(token).is_err() {
                warn!(
                    undelivered = self.reads - summary.enqueued,
                    "all readers have stopped, abandoning remaining requests"
                );
                break;
            }
            summary.enqueued += 1;
        }

        // Closing the stream
        drop(requests);

        debug!(
            generated = summary.generated,
            enqueued = summary.enqueued,
            "request generator finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;
    use std::thread;

    fn config(reads: u64, mode: DispatchMode) -> Config {
        Config {
            file_size_mib: 16,
            reads,
            dispatch: mode,
            seed: Some(1234),
            ..Config::default()
        }
    }

    #[test]
    fn test_generates_exactly_reads_tokens() {
        let (tx, rx) = channel::unbounded();
        let summary = RequestGenerator::new(&config(1000, DispatchMode::Chained)).run(tx);

        assert_eq!(summary.requested, 1000);
        assert_eq!(summary.generated, 1000);
        assert_eq!(summary.enqueued, 1000);
        assert_eq!(rx.iter().count(), 1000);
    }

    #[test]
    fn test_stream_closed_after_run() {
        let (tx, rx) = channel::unbounded();
        RequestGenerator::new(&config(3, DispatchMode::Chained)).run(tx);

        assert_eq!(rx.iter().count(), 3);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_seeded_sequence_is_reproducible() {
        let a: Vec<u64> = RequestGenerator::new(&config(50, DispatchMode::Chained))
            .tokens()
            .collect();
        let b: Vec<u64> = RequestGenerator::new(&config(50, DispatchMode::Chained))
            .tokens()
            .collect();
        assert_eq!(a, b);

        // Sent tokens match the iterator
        let (tx, rx) = channel::unbounded();
        RequestGenerator::new(&config(50, DispatchMode::Chained)).run(tx);
        assert_eq!(rx.iter().collect::<Vec<_>>(), a);
    }

    #[test]
    fn test_chained_tokens_are_unbounded() {
        let cfg = config(1000, DispatchMode::Chained);
        let bound = cfg.bound_count();
        let tokens: Vec<u64> = RequestGenerator::new(&cfg).tokens().collect();
        assert!(tokens.iter().any(|&t| t >= bound));
    }

    #[test]
    fn test_independent_tokens_are_bounded() {
        let cfg = config(1000, DispatchMode::Independent);
        let bound = cfg.bound_count();
        assert!(RequestGenerator::new(&cfg).tokens().all(|t| t < bound));
    }

    #[test]
    fn test_stops_when_receivers_hang_up() {
        let (tx, rx) = channel::bounded(0);
        let generator = RequestGenerator::new(&config(1000, DispatchMode::Chained));
        let handle = thread::spawn(move || generator.run(tx));

        for _ in 0..10 {
            rx.recv().unwrap();
        }
        drop(rx);

        let summary = handle.join().unwrap();
        assert_eq!(summary.enqueued, 10);
        assert_eq!(summary.generated, 11);
        assert_eq!(summary.requested, 1000);
    }

    #[test]
    fn test_zero_reads() {
        let (tx, rx) = channel::unbounded();
        let summary = RequestGenerator::new(&config(0, DispatchMode::Chained)).run(tx);
        assert_eq!(summary.enqueued, 0);
        assert!(rx.recv().is_err());
    }
}
