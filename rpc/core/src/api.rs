//! RPC API trait definitions

use async_trait::async_trait;
use consensus_core::Hash;

use crate::model::*;

/// Mining and staking control methods exposed over RPC
#[async_trait]
pub trait RpcApi: Send + Sync {
    // Mining methods
    /// Mines `block_count` blocks paying fresh addresses of the mining wallet
    async fn generate(&self, block_count: i64) -> Result<Vec<Hash>, RpcError>;
    async fn get_mining_info(&self) -> Result<MiningInfo, RpcError>;

    // Staking methods
    async fn start_staking(&self, wallet_name: String, password: String) -> Result<bool, RpcError>;
    async fn stop_staking(&self, wallet_name: String) -> Result<bool, RpcError>;
    /// Only the structured rendering exists; `is_json == false` is unsupported
    async fn get_staking_info(&self, is_json: bool) -> Result<StakingInfo, RpcError>;
}
