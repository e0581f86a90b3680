//! Read targets
//!
//! The only target is the backing store: a flat file of pseudo-random 8-byte
//! values that is created once and then opened read-only by every worker.

pub mod file;

pub use file::BackingStore;

/// Size of one populated block in the backing store
pub const BLOCK_SIZE: usize = 4096;
