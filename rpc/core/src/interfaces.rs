//! Narrow views of the collaborators the coordinator drives.

use std::sync::Arc;

use async_trait::async_trait;
use consensus_core::{Hash, ScriptPublicKey};
use mining::MiningError;
use staking::{Credential, StakingError, StakingInfo};
use wallet::{AccountRef, Wallet, WalletAddress, WalletError};

use crate::model::MiningInfo;

/// Wallet and address registry
pub trait WalletRegistry: Send + Sync {
    fn list_wallet_names(&self) -> Vec<String>;
    fn list_accounts(&self, wallet_name: &str) -> Result<Vec<AccountRef>, WalletError>;
    /// Selects an unused address and marks it used in the same step
    fn get_unused_address(&self, account: &AccountRef) -> Result<WalletAddress, WalletError>;
    fn get_wallet(&self, wallet_name: &str) -> Result<Wallet, WalletError>;
}

/// Proof-of-work block producer. Calls block the current thread.
pub trait BlockGenerator: Send + Sync {
    fn generate_blocks(&self, script: &ScriptPublicKey, count: u64, max_tries: u64) -> Result<Vec<Hash>, MiningError>;
    fn mining_info(&self) -> MiningInfo;
}

/// Proof-of-stake engine
#[async_trait]
pub trait StakingEngine: Send + Sync {
    /// Starts or resumes staking for the credential's wallet
    async fn stake(&self, credential: Credential) -> Result<(), StakingError>;
    async fn stop(&self, wallet_name: &str) -> Result<bool, StakingError>;
    async fn staking_info(&self) -> StakingInfo;
}

/// Lazily activated staking subsystem
pub trait StakingProvider: Send + Sync {
    fn active(&self) -> Option<Arc<dyn StakingEngine>>;
    fn get_or_activate(&self) -> Result<Arc<dyn StakingEngine>, StakingError>;
}
