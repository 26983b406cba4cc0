use consensus_core::ConsensusError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MiningError {
    #[error("Mining workers are not running")]
    WorkersStopped,

    #[error("Invalid mining configuration: {0}")]
    InvalidConfig(String),

    #[error("Chain rejected mined block: {0}")]
    Chain(#[from] ConsensusError),
}
