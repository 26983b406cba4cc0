use std::sync::Arc;

use consensus_core::Hash;
use mining::{MiningError, UNBOUNDED_TRIES};
use staking::StakingError;
use tracing::{debug, info, warn};
use wallet::{AccountRef, WalletError};

use crate::api::RpcApi;
use crate::interfaces::{BlockGenerator, StakingProvider, WalletRegistry};
use crate::model::*;

/// Knobs of the control surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Wallet paid by `generate`; the lexicographically first wallet when unset
    pub mining_wallet: Option<String>,
    /// Nonce budget handed to the PoW engine per block
    pub max_tries: u64,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self { mining_wallet: None, max_tries: UNBOUNDED_TRIES }
    }
}

/// RPC Coordinator implementing the RpcApi trait
pub struct RpcCoordinator {
    registry: Arc<dyn WalletRegistry>,
    miner: Arc<dyn BlockGenerator>,
    staking: Option<Arc<dyn StakingProvider>>,
    settings: CoordinatorSettings,
}

impl RpcCoordinator {
    pub fn new(
        registry: Arc<dyn WalletRegistry>,
        miner: Arc<dyn BlockGenerator>,
        staking: Option<Arc<dyn StakingProvider>>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self { registry, miner, staking, settings }
    }

    /// First account of the wallet that receives mining rewards
    fn reward_account(&self) -> Result<AccountRef, RpcError> {
        let names = self.registry.list_wallet_names();
        if names.is_empty() {
            return Err(RpcError::NotFound("no wallet loaded".to_string()));
        }

        let wallet = match &self.settings.mining_wallet {
            Some(configured) => names
                .into_iter()
                .find(|name| name == configured)
                .ok_or_else(|| RpcError::NotFound(format!("mining wallet '{}' is not loaded", configured)))?,
            None => names.into_iter().min().unwrap_or_default(),
        };

        let accounts = self.registry.list_accounts(&wallet).map_err(registry_fault)?;
        accounts.into_iter().min_by_key(|account| account.index).ok_or_else(|| RpcError::NotFound("wallet has no account".to_string()))
    }
}

fn registry_fault(e: WalletError) -> RpcError {
    RpcError::NotFound(e.to_string())
}

fn mining_fault(e: MiningError) -> RpcError {
    RpcError::EngineFailure(e.to_string())
}

fn staking_fault(e: StakingError) -> RpcError {
    RpcError::EngineFailure(e.to_string())
}

#[async_trait::async_trait]
impl RpcApi for RpcCoordinator {
    async fn generate(&self, block_count: i64) -> Result<Vec<Hash>, RpcError> {
        if block_count <= 0 {
            return Err(RpcError::InvalidArgument(format!("block count must be positive, got {}", block_count)));
        }
        let requested = usize::try_from(block_count)
            .map_err(|_| RpcError::InvalidArgument(format!("block count {} is too large for this platform", block_count)))?;
        let account = self.reward_account()?;
        debug!("Generating {} block(s) for account {}", requested, account);

        let mut hashes = Vec::with_capacity(requested.min(1024));
        while hashes.len() < requested {
            let address = self.registry.get_unused_address(&account).map_err(registry_fault)?;
            let reservation = ReservationHandle::new(address.script_pub_key().map_err(registry_fault)?);

            let miner = Arc::clone(&self.miner);
            let max_tries = self.settings.max_tries;
            let batch = tokio::task::spawn_blocking(move || miner.generate_blocks(reservation.script(), 1, max_tries))
                .await
                .map_err(|e| RpcError::EngineFailure(format!("mining task failed: {}", e)))?
                .map_err(mining_fault)?;

            if batch.is_empty() {
                info!("Mining stopped after {} of {} block(s): nonce budget exhausted", hashes.len(), requested);
                break;
            }
            hashes.extend(batch);
        }

        Ok(hashes)
    }

    async fn get_mining_info(&self) -> Result<MiningInfo, RpcError> {
        Ok(self.miner.mining_info())
    }

    async fn start_staking(&self, wallet_name: String, password: String) -> Result<bool, RpcError> {
        if wallet_name.is_empty() {
            return Err(RpcError::InvalidArgument("wallet name must not be empty".to_string()));
        }

        let wallet = self.registry.get_wallet(&wallet_name).map_err(registry_fault)?;

        // Key derivation is CPU bound
        let checked = tokio::task::spawn_blocking(move || wallet.verify_password(&password).map(|_| password))
            .await
            .map_err(|e| RpcError::EngineFailure(format!("password check failed: {}", e)))?;
        let password = checked.map_err(|e| {
            warn!("Rejected staking credential for wallet '{}'", wallet_name);
            RpcError::Unauthorized(e.to_string())
        })?;

        let provider = self.staking.as_ref().ok_or_else(|| RpcError::Unsupported("staking is not available on this node".to_string()))?;
        let engine = provider.get_or_activate().map_err(staking_fault)?;
        engine.stake(Credential::new(wallet_name.clone(), password)).await.map_err(staking_fault)?;

        info!("Staking requested for wallet '{}'", wallet_name);
        Ok(true)
    }

    async fn stop_staking(&self, wallet_name: String) -> Result<bool, RpcError> {
        if wallet_name.is_empty() {
            return Err(RpcError::InvalidArgument("wallet name must not be empty".to_string()));
        }
        match self.staking.as_ref().and_then(|provider| provider.active()) {
            Some(engine) => engine.stop(&wallet_name).await.map_err(staking_fault),
            None => Ok(false),
        }
    }

    async fn get_staking_info(&self, is_json: bool) -> Result<StakingInfo, RpcError> {
        if !is_json {
            return Err(RpcError::Unsupported("only the JSON rendering of staking info is available".to_string()));
        }
        match self.staking.as_ref().and_then(|provider| provider.active()) {
            Some(engine) => Ok(engine.staking_info().await),
            None => Ok(StakingInfo::default()),
        }
    }
}
