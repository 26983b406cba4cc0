use consensus_core::ConsensusError;
use thiserror::Error;
use wallet::WalletError;

#[derive(Error, Debug)]
pub enum StakingError {
    #[error("Staking needs a running tokio runtime")]
    NoRuntime,

    #[error("Staker for wallet '{0}' is no longer running")]
    StakerGone(String),

    #[error("Invalid staking settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Chain(#[from] ConsensusError),
}
