//! Stake kernel: sha256(tip ∥ wallet ∥ timestamp) compared against the
//! kernel target scaled by the staker's weight.

use consensus_core::Hash;
use mining::Target;
use primitive_types::U256;
use sha2::{Digest, Sha256};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeKernel {
    target: U256,
    bits: u32,
}

impl StakeKernel {
    pub fn new(bits: u32, weight: u64) -> Self {
        let target = Target::from_bits(bits).as_u256().saturating_mul(U256::from(weight));
        Self { target, bits }
    }

    pub fn hash(tip: &Hash, wallet: &str, timestamp: u64) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(tip.as_bytes());
        hasher.update(wallet.as_bytes());
        hasher.update(timestamp.to_le_bytes());
        Hash::from_bytes(hasher.finalize().into())
    }

    /// Whether `wallet` may stake on top of `tip` at `timestamp`
    pub fn check(&self, tip: &Hash, wallet: &str, timestamp: u64) -> bool {
        let hash = Self::hash(tip, wallet, timestamp);
        U256::from_big_endian(hash.as_bytes()) <= self.target
    }

    /// Chance that a single evaluation hits
    pub fn hit_probability(&self) -> f64 {
        let top = (self.target >> 192).low_u64() as f64;
        (top / 18_446_744_073_709_551_616.0).min(1.0)
    }

    /// Unscaled difficulty of the kernel bits
    pub fn difficulty(&self) -> f64 {
        Target::from_bits(self.bits).difficulty()
    }
}
