//! RPC data models and types

use consensus_core::{Hash, ScriptPublicKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use staking::{Credential, StakingInfo};

/// RPC error type
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Engine failure: {0}")]
    EngineFailure(String),
}

impl RpcError {
    /// JSON-RPC error code for this kind
    pub fn code(&self) -> i32 {
        match self {
            RpcError::InvalidArgument(_) => -8,
            RpcError::NotFound(_) => -5,
            RpcError::Unauthorized(_) => -14,
            RpcError::Unsupported(_) => -32601,
            RpcError::EngineFailure(_) => -25,
        }
    }

    /// Message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            RpcError::InvalidArgument(m)
            | RpcError::NotFound(m)
            | RpcError::Unauthorized(m)
            | RpcError::Unsupported(m)
            | RpcError::EngineFailure(m) => m,
        }
    }
}

/// Script that receives the reward of one block being mined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationHandle {
    script: ScriptPublicKey,
}

impl ReservationHandle {
    pub fn new(script: ScriptPublicKey) -> Self {
        Self { script }
    }

    pub fn script(&self) -> &ScriptPublicKey {
        &self.script
    }
}

/// Mining information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningInfo {
    pub blocks: u64,
    pub tip_hash: Hash,
    pub bits: u32,
    pub difficulty: f64,
    /// Blocks mined by this node since start
    pub blocks_mined: u64,
    pub hash_rate: f64,
    pub workers: usize,
    pub generating: bool,
}
