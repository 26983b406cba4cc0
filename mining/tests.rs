//! Comprehensive tests for the mining module
//!
//! This module contains integration tests for the mining system including
//! PoW verification, job budgets, worker coordination and block generation.

#[cfg(test)]
mod tests {
    use crate::job::MiningJob;
    use crate::manager::{MiningConfig, MiningManager};
    use crate::pow::{ProofOfWork, Target};
    use crate::UNBOUNDED_TRIES;
    use consensus_core::constants::DEVNET_BITS;
    use consensus_core::{BlockKind, Chain, Hash, Header, ScriptPublicKey};
    use std::sync::Arc;
    use std::thread;

    fn script(tag: u8) -> ScriptPublicKey {
        ScriptPublicKey::from_vec(0, vec![0x76, 0xa9, 0x14, tag, 0x88, 0xac])
    }

    fn manager(num_workers: usize, bits: u32) -> MiningManager {
        MiningManager::new(MiningConfig { num_workers, bits }, Arc::new(Chain::new())).unwrap()
    }

    // ==================== PoW Tests ====================

    #[test]
    fn test_pow_hash_deterministic() {
        let data = b"consistent_data";
        let hash1 = ProofOfWork::compute_hash(data);
        let hash2 = ProofOfWork::compute_hash(data);
        assert_eq!(hash1, hash2, "Same data should produce same hash");
    }

    #[test]
    fn test_pow_different_inputs_different_hashes() {
        let hash1 = ProofOfWork::compute_hash(b"data1");
        let hash2 = ProofOfWork::compute_hash(b"data2");
        assert_ne!(hash1, hash2, "Different data should produce different hashes");
    }

    // ==================== Job Tests ====================

    #[test]
    fn test_job_target_follows_header_bits() {
        let header = Header::new(BlockKind::ProofOfWork, Hash::default(), 1, 1000, 0x1d00ffff, script(1));
        let job = MiningJob::new(header, UNBOUNDED_TRIES);
        assert_eq!(job.target, Target::from_bits(0x1d00ffff));
        assert_eq!(job.control.remaining(), UNBOUNDED_TRIES);
        assert!(job.age_ms() < 1000);
    }

    // ==================== Manager Tests ====================

    #[test]
    fn test_generate_extends_chain_with_coinbase() {
        let manager = manager(2, DEVNET_BITS);
        let hashes = manager.generate_blocks(&script(7), 3, UNBOUNDED_TRIES).unwrap();

        assert_eq!(hashes.len(), 3);
        assert_eq!(manager.chain().height(), 3);
        assert_eq!(manager.chain().tip().hash, hashes[2]);

        let mut parent = Header::genesis().hash();
        for hash in &hashes {
            let header = manager.chain().get(hash).unwrap();
            assert_eq!(header.parent, parent);
            assert_eq!(header.kind, BlockKind::ProofOfWork);
            assert_eq!(header.coinbase, script(7));
            assert!(ProofOfWork::is_valid_pow(&header.bytes_with_nonce(header.nonce), &Target::from_bits(header.bits)));
            parent = *hash;
        }
        assert_eq!(manager.get_session_stats().total_blocks, 3);
    }

    #[test]
    fn test_generate_zero_count_does_no_work() {
        let manager = manager(1, DEVNET_BITS);
        assert!(manager.generate_blocks(&script(1), 0, UNBOUNDED_TRIES).unwrap().is_empty());
        assert_eq!(manager.chain().height(), 0);
        assert_eq!(manager.get_session_stats().total_iterations, 0);
    }

    #[test]
    fn test_generate_zero_tries_returns_empty() {
        let manager = manager(2, DEVNET_BITS);
        assert!(manager.generate_blocks(&script(1), 5, 0).unwrap().is_empty());
        assert_eq!(manager.chain().height(), 0);
    }

    #[test]
    fn test_generate_exhausts_budget_on_hard_target() {
        let manager = manager(2, 0x1d00ffff);
        let hashes = manager.generate_blocks(&script(1), 1, 2_000).unwrap();
        assert!(hashes.is_empty());
        assert!(manager.get_session_stats().total_iterations <= 2_000);
    }

    #[test]
    fn test_generate_builds_on_foreign_tip() {
        let manager = manager(1, DEVNET_BITS);
        let tip = manager.chain().tip();
        let staked = Header::new(BlockKind::ProofOfStake, tip.hash, 1, tip.timestamp + 1, DEVNET_BITS, script(9));
        let staked_hash = manager.chain().append(staked).unwrap();

        let hashes = manager.generate_blocks(&script(1), 1, UNBOUNDED_TRIES).unwrap();
        let header = manager.chain().get(&hashes[0]).unwrap();
        assert_eq!(header.parent, staked_hash);
        assert_eq!(header.height, 2);
    }

    #[test]
    fn test_concurrent_generate_calls_serialize() {
        let manager = Arc::new(manager(2, DEVNET_BITS));
        let handles: Vec<_> = (0..3u8)
            .map(|i| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.generate_blocks(&script(i), 2, UNBOUNDED_TRIES).unwrap())
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap().len()).sum();
        assert_eq!(total, 6);
        assert_eq!(manager.chain().height(), 6);
        assert!(!manager.is_generating());
    }

    #[test]
    fn test_manager_stop_then_generate_fails() {
        let mut manager = manager(1, DEVNET_BITS);
        manager.stop();
        assert!(manager.generate_blocks(&script(1), 1, UNBOUNDED_TRIES).is_err());
    }
}
