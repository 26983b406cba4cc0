//! Proof-of-work block generation
//!
//! This module implements the PoW engine behind the node's `generate` call:
//! target arithmetic, mining jobs built on the chain tip, a pool of worker
//! threads sharing the nonce space, and the manager that turns a reservation
//! script and a block count into mined block hashes.
//!
//! ## Module Organization
//!
//! - [`pow`]: Proof-of-Work hashing and target validation (double SHA256)
//! - [`job`]: Mining job definitions and mined block results
//! - [`worker`]: Worker thread loop claiming nonce ranges from a shared budget
//! - [`manager`]: Owns the workers and implements `generate_blocks`

pub mod error;
pub mod job;
pub mod manager;
pub mod pow;
pub mod worker;

#[cfg(test)]
pub mod tests;

// Re-export main types for easier access
pub use error::MiningError;
pub use job::{JobControl, MinedBlock, MiningJob};
pub use manager::{MiningConfig, MiningManager, SessionStats};
pub use pow::{ProofOfWork, Target};
pub use worker::{MinerWorker, WorkerEvent, WorkerStats};

/// Nonce budget meaning "never give up"
pub const UNBOUNDED_TRIES: u64 = u64::MAX;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::job::{MinedBlock, MiningJob};
    pub use crate::manager::{MiningConfig, MiningManager, SessionStats};
    pub use crate::pow::{ProofOfWork, Target};
    pub use crate::worker::{MinerWorker, WorkerStats};
    pub use crate::UNBOUNDED_TRIES;
}
