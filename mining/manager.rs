//! Mining manager that coordinates workers and job distribution
//!
//! This module manages the lifecycle of mining workers, builds jobs on the
//! chain tip, collects worker reports and appends solved headers to the chain.

use crate::error::MiningError;
use crate::job::{current_timestamp, MiningJob};
use crate::worker::{MinerWorker, WorkerEvent, WorkerStats};
use consensus_core::constants::DEVNET_BITS;
use consensus_core::{BlockKind, Chain, ConsensusError, Hash, Header, ScriptPublicKey};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Configuration for the mining manager
#[derive(Clone, Debug)]
pub struct MiningConfig {
    /// Number of worker threads
    pub num_workers: usize,
    /// Compact difficulty bits for mined headers
    pub bits: u32,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self { num_workers: num_cpus::get(), bits: DEVNET_BITS }
    }
}

/// Manages mining operations
pub struct MiningManager {
    config: MiningConfig,
    chain: Arc<Chain>,
    /// Channels to send jobs to workers
    job_senders: Vec<Sender<MiningJob>>,
    /// Worker reports; holding this lock also serializes `generate_blocks`
    event_rx: Mutex<Receiver<WorkerEvent>>,
    /// Worker thread handles
    worker_threads: Vec<JoinHandle<()>>,
    /// Shutdown signal
    shutdown: Arc<AtomicBool>,
    worker_stats: Mutex<Vec<WorkerStats>>,
    generating: AtomicBool,
    blocks_mined: AtomicU64,
    /// Start time of mining session
    session_start: Instant,
}

impl MiningManager {
    /// Spawns `config.num_workers` worker threads mining on top of `chain`
    pub fn new(config: MiningConfig, chain: Arc<Chain>) -> Result<Self, MiningError> {
        if config.num_workers == 0 {
            return Err(MiningError::InvalidConfig("num_workers must be at least 1".to_string()));
        }

        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut job_senders = Vec::with_capacity(config.num_workers);
        let mut worker_threads = Vec::with_capacity(config.num_workers);

        for worker_id in 0..config.num_workers {
            let (job_tx, job_rx) = mpsc::channel();
            let event_tx = event_tx.clone();
            let shutdown = Arc::clone(&shutdown);

            let handle = thread::Builder::new()
                .name(format!("miner-{}", worker_id))
                .spawn(move || MinerWorker::new(worker_id, job_rx, event_tx, shutdown).run())
                .map_err(|e| MiningError::InvalidConfig(format!("failed to spawn worker {}: {}", worker_id, e)))?;

            job_senders.push(job_tx);
            worker_threads.push(handle);
        }

        log::info!("Mining manager started with {} workers", config.num_workers);

        Ok(Self {
            worker_stats: Mutex::new(vec![WorkerStats::default(); config.num_workers]),
            config,
            chain,
            job_senders,
            event_rx: Mutex::new(event_rx),
            worker_threads,
            shutdown,
            generating: AtomicBool::new(false),
            blocks_mined: AtomicU64::new(0),
            session_start: Instant::now(),
        })
    }

    /// Mines up to `count` blocks paying `script` and appends them to the chain.
    ///
    /// `max_tries` bounds the nonces tried across the whole call. When it is
    /// spent the blocks produced so far are returned.
    pub fn generate_blocks(&self, script: &ScriptPublicKey, count: u64, max_tries: u64) -> Result<Vec<Hash>, MiningError> {
        let mut hashes = Vec::new();
        if count == 0 {
            return Ok(hashes);
        }

        let events = self.event_rx.lock().unwrap_or_else(|e| e.into_inner());
        self.generating.store(true, Ordering::SeqCst);
        let result = self.mine_sequence(&events, script, count, max_tries, &mut hashes);
        self.generating.store(false, Ordering::SeqCst);
        result.map(|_| hashes)
    }

    fn mine_sequence(
        &self,
        events: &Receiver<WorkerEvent>,
        script: &ScriptPublicKey,
        count: u64,
        max_tries: u64,
        hashes: &mut Vec<Hash>,
    ) -> Result<(), MiningError> {
        let mut budget = max_tries;

        while (hashes.len() as u64) < count && budget > 0 {
            let job = MiningJob::new(self.next_header(script), budget);
            let solved = self.run_job(events, &job)?;
            budget = job.control.remaining();

            let Some(nonce) = solved else {
                log::info!("Nonce budget exhausted after {} of {} block(s)", hashes.len(), count);
                break;
            };

            let height = job.height();
            let mut header = job.header;
            header.nonce = nonce;
            match self.chain.append(header) {
                Ok(hash) => {
                    log::info!("Mined block {} at height {}", hash, height);
                    self.blocks_mined.fetch_add(1, Ordering::Relaxed);
                    hashes.push(hash);
                }
                // The PoS side extended the tip while we were hashing
                Err(ConsensusError::NotExtendingTip { tip, .. }) => {
                    log::debug!("Tip moved to {} during job {}, rebuilding", tip, job.job_id);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn next_header(&self, script: &ScriptPublicKey) -> Header {
        let tip = self.chain.tip();
        let timestamp = current_timestamp().max(tip.timestamp + 1);
        Header::new(BlockKind::ProofOfWork, tip.hash, tip.height + 1, timestamp, self.config.bits, script.clone())
    }

    /// Hands `job` to every worker and waits until all of them report back.
    /// Returns the winning nonce, if any.
    fn run_job(&self, events: &Receiver<WorkerEvent>, job: &MiningJob) -> Result<Option<u64>, MiningError> {
        log::debug!("Dispatching job {} for height {} to {} workers", job.job_id, job.height(), self.job_senders.len());

        let mut pending = 0;
        for (i, sender) in self.job_senders.iter().enumerate() {
            match sender.send(job.clone()) {
                Ok(()) => pending += 1,
                Err(e) => log::warn!("Failed to send job to worker {}: {}", i, e),
            }
        }
        if pending == 0 {
            return Err(MiningError::WorkersStopped);
        }

        let mut solved = None;
        while pending > 0 {
            let event = events.recv().map_err(|_| MiningError::WorkersStopped)?;
            let WorkerEvent::Done { job_id, worker_id, found, .. } = &event;
            if *job_id != job.job_id {
                continue;
            }
            pending -= 1;

            if let Some(block) = found {
                solved = Some(block.nonce);
            }
            let mut stats = self.worker_stats.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = stats.get_mut(*worker_id) {
                entry.update(&event);
            }
        }
        Ok(solved)
    }

    /// Gets the current statistics for all workers
    pub fn get_worker_stats(&self) -> Vec<WorkerStats> {
        self.worker_stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Gets overall mining session statistics
    pub fn get_session_stats(&self) -> SessionStats {
        let stats = self.get_worker_stats();
        let session_duration_ms = self.session_start.elapsed().as_millis() as u64;

        let total_iterations = stats.iter().map(|s| s.total_iterations).sum();
        let total_time_ms = stats.iter().map(|s| s.total_time_ms).sum::<u64>();

        let overall_hash_rate =
            if session_duration_ms > 0 { (total_iterations as f64) / (session_duration_ms as f64 / 1000.0) } else { 0.0 };

        SessionStats {
            session_duration_ms,
            total_blocks: self.blocks_mined.load(Ordering::Relaxed),
            total_iterations,
            total_time_ms,
            overall_hash_rate,
            worker_count: self.config.num_workers,
            worker_stats: stats,
        }
    }

    /// Whether a `generate_blocks` call is in flight
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Stops the mining manager and waits for workers to finish
    pub fn stop(&mut self) {
        log::info!("Stopping mining manager");
        self.shutdown.store(true, Ordering::Relaxed);

        for handle in self.worker_threads.drain(..) {
            match handle.join() {
                Ok(_) => log::debug!("Worker thread stopped gracefully"),
                Err(e) => log::error!("Worker thread panicked: {:?}", e),
            }
        }

        log::info!("Mining manager stopped");
    }

    pub fn chain(&self) -> &Arc<Chain> {
        &self.chain
    }

    pub fn bits(&self) -> u32 {
        self.config.bits
    }

    /// Returns the number of active workers
    pub fn worker_count(&self) -> usize {
        self.config.num_workers
    }
}

impl Drop for MiningManager {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Statistics for a mining session
#[derive(Clone, Debug)]
pub struct SessionStats {
    pub session_duration_ms: u64,
    pub total_blocks: u64,
    pub total_iterations: u64,
    pub total_time_ms: u64,
    pub overall_hash_rate: f64,
    pub worker_count: usize,
    pub worker_stats: Vec<WorkerStats>,
}

impl SessionStats {
    /// Formats session stats as a readable string
    pub fn format_summary(&self) -> String {
        format!(
            "Mining Session Stats:\n  Duration: {}ms\n  Total Blocks: {}\n  Total Iterations: {}\n  \
             Workers: {}\n  Overall Hash Rate: {:.2} MH/s",
            self.session_duration_ms,
            self.total_blocks,
            self.total_iterations,
            self.worker_count,
            self.overall_hash_rate / 1_000_000.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mining_manager_creation() {
        let config = MiningConfig { num_workers: 2, bits: DEVNET_BITS };
        let manager = MiningManager::new(config, Arc::new(Chain::new())).unwrap();
        assert_eq!(manager.worker_count(), 2);
        assert!(!manager.is_generating());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = MiningConfig { num_workers: 0, bits: DEVNET_BITS };
        assert!(matches!(MiningManager::new(config, Arc::new(Chain::new())), Err(MiningError::InvalidConfig(_))));
    }

    #[test]
    fn test_mining_config_default() {
        let config = MiningConfig::default();
        assert!(config.num_workers > 0);
        assert_eq!(config.bits, DEVNET_BITS);
    }

    #[test]
    fn test_session_stats_formatting() {
        let stats = SessionStats {
            session_duration_ms: 1000,
            total_blocks: 10,
            total_iterations: 10_000_000,
            total_time_ms: 5000,
            overall_hash_rate: 2_000_000.0,
            worker_count: 4,
            worker_stats: vec![],
        };
        let summary = stats.format_summary();
        assert!(summary.contains("Mining Session Stats"));
    }
}
