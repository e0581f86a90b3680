//! randread - Concurrent dependent random-read benchmark
//!
//! randread measures how long it takes a fixed pool of readers to issue a
//! configured number of random chunk reads against a large pre-populated file.
//!
//! # Architecture
//!
//! - **Request generator**: pushes opaque 64-bit tokens into a shared stream
//! - **Worker pool**: each worker owns its file handle and chains every read
//!   offset to the contents of its previous read, so accesses cannot be
//!   predicted or prefetched
//! - **Completion collector**: one terminal signal per worker, errors surfaced
//!   after the whole pool has finished
//! - **Timer**: wall-clock interval from first dispatch to last terminal signal

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod logging;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{ReadPool, RunOutcome, TerminalSignal};
pub use engine::ReadEngine;

/// Result type used throughout randread
pub type Result<T> = anyhow::Result<T>;
