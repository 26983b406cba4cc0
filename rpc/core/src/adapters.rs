//! Collaborator trait implementations for the node's concrete subsystems.

use std::sync::Arc;

use async_trait::async_trait;
use consensus_core::{Hash, ScriptPublicKey};
use mining::{MiningError, MiningManager, Target};
use staking::{Credential, PosMinting, StakingError, StakingFeature, StakingInfo};
use wallet::{AccountRef, Wallet, WalletAddress, WalletError, WalletManager};

use crate::interfaces::{BlockGenerator, StakingEngine, StakingProvider, WalletRegistry};
use crate::model::MiningInfo;

impl WalletRegistry for WalletManager {
    fn list_wallet_names(&self) -> Vec<String> {
        WalletManager::list_wallet_names(self)
    }

    fn list_accounts(&self, wallet_name: &str) -> Result<Vec<AccountRef>, WalletError> {
        WalletManager::list_accounts(self, wallet_name)
    }

    fn get_unused_address(&self, account: &AccountRef) -> Result<WalletAddress, WalletError> {
        WalletManager::get_unused_address(self, account)
    }

    fn get_wallet(&self, wallet_name: &str) -> Result<Wallet, WalletError> {
        WalletManager::get_wallet(self, wallet_name)
    }
}

impl BlockGenerator for MiningManager {
    fn generate_blocks(&self, script: &ScriptPublicKey, count: u64, max_tries: u64) -> Result<Vec<Hash>, MiningError> {
        MiningManager::generate_blocks(self, script, count, max_tries)
    }

    fn mining_info(&self) -> MiningInfo {
        let tip = self.chain().tip();
        let stats = self.get_session_stats();
        MiningInfo {
            blocks: tip.height,
            tip_hash: tip.hash,
            bits: self.bits(),
            difficulty: Target::from_bits(self.bits()).difficulty(),
            blocks_mined: stats.total_blocks,
            hash_rate: stats.overall_hash_rate,
            workers: stats.worker_count,
            generating: self.is_generating(),
        }
    }
}

#[async_trait]
impl StakingEngine for PosMinting {
    async fn stake(&self, credential: Credential) -> Result<(), StakingError> {
        PosMinting::stake(self, credential).await
    }

    async fn stop(&self, wallet_name: &str) -> Result<bool, StakingError> {
        PosMinting::stop(self, wallet_name).await
    }

    async fn staking_info(&self) -> StakingInfo {
        PosMinting::staking_info(self).await
    }
}

impl StakingProvider for StakingFeature {
    fn active(&self) -> Option<Arc<dyn StakingEngine>> {
        StakingFeature::active(self).map(|engine| engine as Arc<dyn StakingEngine>)
    }

    fn get_or_activate(&self) -> Result<Arc<dyn StakingEngine>, StakingError> {
        Ok(StakingFeature::get_or_activate(self)? as Arc<dyn StakingEngine>)
    }
}
