//! Mining worker thread implementation
//!
//! This module implements the MinerWorker that runs in separate threads
//! and performs proof-of-work iterations on mining jobs.

use crate::job::{MinedBlock, MiningJob};
use crate::pow::ProofOfWork;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Nonces claimed from the shared budget at a time
pub const NONCE_BATCH: u64 = 4096;

/// Report sent by a worker once it is finished with a job
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    Done {
        job_id: u64,
        worker_id: usize,
        iterations: u64,
        time_ms: u64,
        found: Option<MinedBlock>,
    },
}

/// A mining worker that processes jobs in a separate thread
#[derive(Debug)]
pub struct MinerWorker {
    /// Unique identifier for this worker
    pub id: usize,
    /// Receives mining jobs from the manager
    pub job_rx: Receiver<MiningJob>,
    /// Sends one `WorkerEvent::Done` per job back to the manager
    pub event_tx: Sender<WorkerEvent>,
    /// Shared flag to signal shutdown
    pub shutdown: Arc<AtomicBool>,
}

impl MinerWorker {
    pub fn new(id: usize, job_rx: Receiver<MiningJob>, event_tx: Sender<WorkerEvent>, shutdown: Arc<AtomicBool>) -> Self {
        Self { id, job_rx, event_tx, shutdown }
    }

    /// Runs the mining loop (blocking, should be run in a thread)
    pub fn run(&mut self) {
        log::info!("Worker {} started", self.id);

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                log::info!("Worker {} shutting down", self.id);
                break;
            }

            match self.job_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(job) => {
                    log::debug!("Worker {} received job {}", self.id, job.job_id);
                    let event = self.mine_job(&job);
                    if let Err(e) = self.event_tx.send(event) {
                        log::error!("Worker {} failed to report job {}: {}", self.id, job.job_id, e);
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("Worker {} job channel disconnected", self.id);
                    break;
                }
            }
        }

        log::info!("Worker {} stopped", self.id);
    }

    /// Searches claimed nonce ranges until the job is solved, its budget is
    /// spent or shutdown is requested
    pub fn mine_job(&self, job: &MiningJob) -> WorkerEvent {
        let start_time = Instant::now();
        let mut iterations: u64 = 0;
        let mut found = None;

        'claims: while let Some((first, count)) = job.control.claim(NONCE_BATCH) {
            for offset in 0..count {
                if offset % 1024 == 0 && (job.control.is_found() || self.shutdown.load(Ordering::Relaxed)) {
                    break 'claims;
                }

                let nonce = first.wrapping_add(offset);
                let header_bytes = job.header_with_nonce(nonce);
                iterations += 1;

                if ProofOfWork::is_valid_pow(&header_bytes, &job.target) {
                    if job.control.try_mark_found() {
                        let time_ms = start_time.elapsed().as_millis() as u64;
                        let block_hash = ProofOfWork::compute_hash(&header_bytes);
                        let mined_block = MinedBlock::new(job.job_id, self.id, nonce, block_hash, iterations, time_ms);

                        log::info!(
                            "Worker {} found block for job {} with nonce {} after {} iterations in {}ms (hash rate: {:.2} MH/s)",
                            self.id,
                            job.job_id,
                            nonce,
                            iterations,
                            time_ms,
                            mined_block.hash_rate() / 1_000_000.0
                        );
                        found = Some(mined_block);
                    }
                    break 'claims;
                }
            }
        }

        WorkerEvent::Done {
            job_id: job.job_id,
            worker_id: self.id,
            iterations,
            time_ms: start_time.elapsed().as_millis() as u64,
            found,
        }
    }
}

/// Statistics for a mining worker session
#[derive(Debug, Clone, Default)]
pub struct WorkerStats {
    /// Total blocks mined by this worker
    pub blocks_mined: u64,
    /// Total iterations performed
    pub total_iterations: u64,
    /// Total mining time in milliseconds
    pub total_time_ms: u64,
    /// Average hash rate in hashes per second
    pub average_hash_rate: f64,
}

impl WorkerStats {
    /// Folds a finished job into the statistics
    pub fn update(&mut self, event: &WorkerEvent) {
        let WorkerEvent::Done { iterations, time_ms, found, .. } = event;
        if found.is_some() {
            self.blocks_mined += 1;
        }
        self.total_iterations += iterations;
        self.total_time_ms += time_ms;

        if self.total_time_ms > 0 {
            self.average_hash_rate = (self.total_iterations as f64) / (self.total_time_ms as f64 / 1000.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::{BlockKind, Hash, Header, ScriptPublicKey};
    use std::sync::mpsc;

    fn create_test_job(max_tries: u64) -> MiningJob {
        let header = Header::new(BlockKind::ProofOfWork, Hash::default(), 1, 1000, 0x207fffff, ScriptPublicKey::from_vec(0, vec![0x51]));
        MiningJob::new(header, max_tries)
    }

    fn worker() -> MinerWorker {
        let (event_tx, _event_rx) = mpsc::channel();
        let (_job_tx, job_rx) = mpsc::channel();
        MinerWorker::new(0, job_rx, event_tx, Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn test_worker_solves_easy_job() {
        let job = create_test_job(u64::MAX);
        let WorkerEvent::Done { found, .. } = worker().mine_job(&job);
        let block = found.expect("easy target should be solved");

        let mut header = job.header.clone();
        header.nonce = block.nonce;
        assert_eq!(header.hash(), block.block_hash);
        assert!(job.control.is_found());
    }

    #[test]
    fn test_worker_respects_zero_budget() {
        let job = create_test_job(0);
        let WorkerEvent::Done { iterations, found, .. } = worker().mine_job(&job);
        assert_eq!(iterations, 0);
        assert!(found.is_none());
    }

    #[test]
    fn test_worker_skips_solved_job() {
        let job = create_test_job(u64::MAX);
        job.control.try_mark_found();
        let WorkerEvent::Done { iterations, found, .. } = worker().mine_job(&job);
        assert_eq!(iterations, 0);
        assert!(found.is_none());
    }

    #[test]
    fn test_worker_stats_update() {
        let mut stats = WorkerStats::default();
        let mined_block = MinedBlock::new(1, 0, 42, Hash::default(), 1_000_000, 1000);
        let event = WorkerEvent::Done { job_id: 1, worker_id: 0, iterations: 1_000_000, time_ms: 1000, found: Some(mined_block) };

        stats.update(&event);
        assert_eq!(stats.blocks_mined, 1);
        assert_eq!(stats.total_iterations, 1_000_000);
        assert_eq!(stats.total_time_ms, 1000);
        assert!(stats.average_hash_rate > 900_000.0);
    }
}
