//! Mining job definitions
//!
//! A MiningJob carries the header template built on the chain tip, its target
//! and the shared JobControl through which every worker claims nonces from a
//! common budget.

use crate::pow::Target;
use consensus_core::{Hash, Header};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Nonce budget and solution flag shared by all workers of one job
#[derive(Debug)]
pub struct JobControl {
    found: AtomicBool,
    next_nonce: AtomicU64,
    remaining: AtomicU64,
}

impl JobControl {
    pub fn new(max_tries: u64) -> Self {
        Self { found: AtomicBool::new(false), next_nonce: AtomicU64::new(0), remaining: AtomicU64::new(max_tries) }
    }

    /// Claims up to `batch` nonces. Returns the first nonce and the number
    /// claimed, or None once the budget is spent or a solution was found.
    pub fn claim(&self, batch: u64) -> Option<(u64, u64)> {
        if self.is_found() {
            return None;
        }
        let mut taken = 0;
        let claimed = self.remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
            taken = remaining.min(batch);
            (taken > 0).then(|| remaining - taken)
        });
        match claimed {
            Ok(_) => Some((self.next_nonce.fetch_add(taken, Ordering::AcqRel), taken)),
            Err(_) => None,
        }
    }

    /// Marks the job solved. Only the first caller gets `true`.
    pub fn try_mark_found(&self) -> bool {
        self.found.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    pub fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// Nonces not yet handed out
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }
}

/// Represents a mining job that workers process
#[derive(Clone, Debug)]
pub struct MiningJob {
    /// Header template; its nonce field is ignored while mining
    pub header: Header,
    /// The difficulty target to meet
    pub target: Target,
    /// Timestamp when this job was created
    pub job_timestamp: u64,
    /// Job identifier for tracking
    pub job_id: u64,
    pub control: Arc<JobControl>,
}

impl MiningJob {
    /// Creates a job whose target comes from the header bits
    pub fn new(header: Header, max_tries: u64) -> Self {
        let target = Target::from_bits(header.bits);
        Self::with_target(header, target, max_tries)
    }

    pub fn with_target(header: Header, target: Target, max_tries: u64) -> Self {
        Self {
            header,
            target,
            job_timestamp: current_timestamp(),
            job_id: generate_job_id(),
            control: Arc::new(JobControl::new(max_tries)),
        }
    }

    /// Serialized header with the given nonce
    pub fn header_with_nonce(&self, nonce: u64) -> Vec<u8> {
        self.header.bytes_with_nonce(nonce)
    }

    /// Gets the age of the job in milliseconds
    pub fn age_ms(&self) -> u64 {
        current_timestamp().saturating_sub(self.job_timestamp)
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }
}

/// Mined block result that workers send back
#[derive(Clone, Debug)]
pub struct MinedBlock {
    /// The job that produced this block
    pub job_id: u64,
    /// The worker ID that mined this block
    pub worker_id: usize,
    /// The nonce that produced valid PoW
    pub nonce: u64,
    /// The hash of the mined block
    pub block_hash: Hash,
    /// Number of iterations performed to find this block
    pub iterations: u64,
    /// Time taken to mine in milliseconds
    pub time_ms: u64,
}

impl MinedBlock {
    pub fn new(job_id: u64, worker_id: usize, nonce: u64, block_hash: Hash, iterations: u64, time_ms: u64) -> Self {
        Self { job_id, worker_id, nonce, block_hash, iterations, time_ms }
    }

    /// Calculates the hash rate for this mining result
    pub fn hash_rate(&self) -> f64 {
        if self.time_ms == 0 {
            return 0.0;
        }
        (self.iterations as f64) / (self.time_ms as f64 / 1000.0)
    }
}

/// Gets the current timestamp in milliseconds since UNIX_EPOCH
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Generates a unique job ID
fn generate_job_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::{BlockKind, ScriptPublicKey};

    fn header() -> Header {
        Header::new(BlockKind::ProofOfWork, Hash::default(), 1, 1000, 0x207fffff, ScriptPublicKey::from_vec(0, vec![0x51]))
    }

    #[test]
    fn test_claim_respects_budget() {
        let control = JobControl::new(10);
        assert_eq!(control.claim(4), Some((0, 4)));
        assert_eq!(control.claim(4), Some((4, 4)));
        assert_eq!(control.claim(4), Some((8, 2)));
        assert_eq!(control.claim(4), None);
        assert_eq!(control.remaining(), 0);
    }

    #[test]
    fn test_claim_stops_after_found() {
        let control = JobControl::new(u64::MAX);
        assert!(control.try_mark_found());
        assert!(!control.try_mark_found());
        assert_eq!(control.claim(100), None);
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = MiningJob::new(header(), 1);
        let b = MiningJob::new(header(), 1);
        assert_ne!(a.job_id, b.job_id);
        assert_eq!(a.target, Target::from_bits(0x207fffff));
    }

    #[test]
    fn test_header_with_nonce_matches_header_hash() {
        let job = MiningJob::new(header(), 1);
        let mut solved = job.header.clone();
        solved.nonce = 42;
        assert_eq!(crate::pow::ProofOfWork::compute_hash(&job.header_with_nonce(42)), solved.hash());
    }

    #[test]
    fn test_mined_block_hash_rate() {
        let block = MinedBlock::new(1, 0, 12345, Hash::default(), 1_000_000, 1000);
        let rate = block.hash_rate();
        assert!(rate > 900_000.0 && rate < 1_100_000.0);
    }
}
