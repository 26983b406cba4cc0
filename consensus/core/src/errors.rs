use thiserror::Error;

use crate::Hash;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Header {child} does not extend tip {tip}")]
    NotExtendingTip { child: Hash, tip: Hash },

    #[error("Invalid block version {0}")]
    InvalidBlockVersion(u16),

    #[error("Invalid proof of work for header {0}")]
    InvalidProofOfWork(Hash),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
