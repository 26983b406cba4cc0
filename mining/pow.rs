//! Proof-of-Work implementation using double SHA256 hashing
//!
//! This module provides the core cryptographic functions for verifying and computing
//! proof-of-work proofs, with compact-bits targets in the Bitcoin/Kaspa format.

use consensus_core::{double_sha256, Hash};
use primitive_types::U256;
use std::cmp::Ordering;

/// Target represents the difficulty threshold for valid blocks
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Target(U256);

impl Target {
    /// Creates a new Target from a U256 value
    pub fn new(value: U256) -> Self {
        Target(value)
    }

    /// Creates a Target from compact bits representation
    /// Format: [1 byte exponent][3 bytes mantissa]
    pub fn from_bits(bits: u32) -> Self {
        let size = (bits >> 24) as usize;
        let word = bits & 0x007fffff;

        let value = if size <= 3 {
            U256::from(word >> (8 * (3 - size)))
        } else if size > 34 {
            U256::MAX
        } else {
            U256::from(word) << (8 * (size - 3))
        };

        Target(value)
    }

    /// Converts Target to compact bits representation
    pub fn to_bits(&self) -> u32 {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);

        // Find first non-zero byte
        let size = bytes.iter().position(|&b| b != 0).map(|i| 32 - i).unwrap_or(0);

        let mut word = if size <= 3 {
            let low = u32::from_be_bytes([0, bytes[29], bytes[30], bytes[31]]);
            low << (8 * (3 - size))
        } else {
            let offset = 32 - size;
            u32::from_be_bytes([0, bytes[offset], bytes[offset + 1], bytes[offset + 2]])
        };
        let mut size = size as u32;

        // The mantissa's top bit is a sign bit in the compact format
        if word & 0x0080_0000 != 0 {
            word >>= 8;
            size += 1;
        }
        (size << 24) | word
    }

    /// Returns the inner U256 value
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Relative difficulty against the easiest target (`0x207fffff`)
    pub fn difficulty(&self) -> f64 {
        let easiest = Target::from_bits(0x207fffff).0;
        if self.0.is_zero() {
            return f64::INFINITY;
        }
        u256_to_f64(easiest) / u256_to_f64(self.0)
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value.0.iter().rev().fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}

impl From<U256> for Target {
    fn from(value: U256) -> Self {
        Target(value)
    }
}

impl From<Target> for U256 {
    fn from(target: Target) -> Self {
        target.0
    }
}

/// Proof-of-Work handler
pub struct ProofOfWork;

impl ProofOfWork {
    /// Computes the SHA256(SHA256(header)) hash of a serialized block header
    pub fn compute_hash(header_bytes: &[u8]) -> Hash {
        double_sha256(header_bytes)
    }

    /// Verifies if a block header meets the proof-of-work target
    ///
    /// # Returns
    /// true if the hash is less than or equal to the target
    pub fn is_valid_pow(header_bytes: &[u8], target: &Target) -> bool {
        let hash = Self::compute_hash(header_bytes);
        Self::compare_hash_to_target(&hash, target) != Ordering::Greater
    }

    /// Calculates the hash rate (hashes per second)
    pub fn calculate_hash_rate(hashes: u64, duration_ms: u64) -> f64 {
        if duration_ms == 0 {
            return 0.0;
        }
        (hashes as f64) / (duration_ms as f64 / 1000.0)
    }

    /// Compares hash (read as a big-endian integer) against target
    pub fn compare_hash_to_target(hash: &Hash, target: &Target) -> Ordering {
        U256::from_big_endian(hash.as_bytes()).cmp(&target.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bits_roundtrip() {
        for bits in [0x207fffffu32, 0x1d00ffff, 0x1f00ffff] {
            assert_eq!(Target::from_bits(bits).to_bits(), bits);
        }
    }

    #[test]
    fn test_target_ordering() {
        let target1 = Target::from_bits(0x207fffff);
        let target2 = Target::from_bits(0x1fffffff);
        assert!(target2 < target1); // Lower bits value = harder target
    }

    #[test]
    fn test_max_target_accepts_everything() {
        let target = Target::new(U256::MAX);
        assert!(ProofOfWork::is_valid_pow(b"anything", &target));
        assert!(!ProofOfWork::is_valid_pow(b"anything", &Target::new(U256::zero())));
    }

    #[test]
    fn test_difficulty_of_easiest_is_one() {
        let diff = Target::from_bits(0x207fffff).difficulty();
        assert!((diff - 1.0).abs() < 1e-9);
        assert!(Target::from_bits(0x1f00ffff).difficulty() > 1.0);
    }

    #[test]
    fn test_hash_rate_calculation() {
        let rate = ProofOfWork::calculate_hash_rate(1_000_000, 1000);
        assert!(rate > 900_000.0 && rate < 1_100_000.0);
        assert_eq!(ProofOfWork::calculate_hash_rate(1_000_000, 0), 0.0);
    }
}
