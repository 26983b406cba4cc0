//! PoS minting engine: one staker actor per wallet name.

use std::collections::HashMap;
use std::sync::Arc;

use consensus_core::Chain;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use wallet::WalletManager;

use crate::actor::{query_status, StakerCommand, StakerHandle};
use crate::credential::Credential;
use crate::error::StakingError;
use crate::info::{StakerStatus, StakingInfo};
use crate::settings::StakingSettings;

pub struct PosMinting {
    settings: StakingSettings,
    registry: Arc<WalletManager>,
    chain: Arc<Chain>,
    runtime: Handle,
    stakers: Mutex<HashMap<String, StakerHandle>>,
}

impl PosMinting {
    pub fn new(settings: StakingSettings, registry: Arc<WalletManager>, chain: Arc<Chain>, runtime: Handle) -> Result<Self, StakingError> {
        settings.validate()?;
        Ok(Self { settings, registry, chain, runtime, stakers: Mutex::new(HashMap::new()) })
    }

    /// Starts staking for the credential's wallet, or resumes its existing staker
    pub async fn stake(&self, credential: Credential) -> Result<(), StakingError> {
        let wallet = credential.wallet_name().to_string();
        let existing = {
            let mut stakers = self.stakers.lock();
            match stakers.get(&wallet) {
                Some(handle) if handle.is_running() => Some(handle.sender()),
                _ => {
                    let handle =
                        StakerHandle::spawn(&self.runtime, credential.clone(), self.settings.clone(), self.registry.clone(), self.chain.clone());
                    if stakers.insert(wallet.clone(), handle).is_some() {
                        warn!("Replaced exited staker for wallet '{}'", wallet);
                    }
                    info!("Spawned staker for wallet '{}'", wallet);
                    None
                }
            }
        };

        if let Some(sender) = existing {
            debug!("Staker for wallet '{}' already exists, sending start", wallet);
            sender.send(StakerCommand::Start(credential)).await.map_err(|_| StakingError::StakerGone(wallet))?;
        }
        Ok(())
    }

    /// Stops the wallet's staker. Returns false when that wallet was not staking.
    pub async fn stop(&self, wallet: &str) -> Result<bool, StakingError> {
        let Some(sender) = self.sender_for(wallet) else {
            return Ok(false);
        };
        if !query_status(&sender, wallet).await?.staking {
            return Ok(false);
        }
        sender.send(StakerCommand::Stop).await.map_err(|_| StakingError::StakerGone(wallet.to_string()))?;
        Ok(true)
    }

    /// Status of every live staker, ordered by wallet name
    pub async fn statuses(&self) -> Vec<StakerStatus> {
        let mut senders: Vec<_> = self.stakers.lock().iter().map(|(wallet, handle)| (wallet.clone(), handle.sender())).collect();
        senders.sort_by(|a, b| a.0.cmp(&b.0));

        let mut statuses = Vec::with_capacity(senders.len());
        for (wallet, sender) in senders {
            match query_status(&sender, &wallet).await {
                Ok(status) => statuses.push(status),
                Err(e) => debug!("Skipping staker: {}", e),
            }
        }
        statuses
    }

    pub async fn staking_info(&self) -> StakingInfo {
        StakingInfo::aggregate(&self.settings, &self.statuses().await)
    }

    /// Number of staker actors, stopped ones included
    pub fn staker_count(&self) -> usize {
        self.stakers.lock().len()
    }

    pub fn settings(&self) -> &StakingSettings {
        &self.settings
    }

    /// Shuts every staker down and waits for them to exit
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.stakers.lock().drain().map(|(_, handle)| handle).collect();
        info!("Shutting down {} staker(s)", handles.len());
        for handle in handles {
            handle.shutdown().await;
        }
    }

    fn sender_for(&self, wallet: &str) -> Option<tokio::sync::mpsc::Sender<StakerCommand>> {
        self.stakers.lock().get(wallet).map(StakerHandle::sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::BlockKind;
    use std::time::Duration;
    use wallet::{Address, KdfParams};

    fn setup(bits: u32) -> (PosMinting, Arc<WalletManager>, Arc<Chain>) {
        let registry = Arc::new(WalletManager::in_memory().with_kdf(KdfParams::insecure()));
        registry.create_wallet("main", "pw", 1).unwrap();
        registry.create_wallet("side", "pw", 1).unwrap();
        let chain = Arc::new(Chain::new());
        let settings = StakingSettings { search_interval: Duration::from_millis(5), weight: 1, bits };
        let engine = PosMinting::new(settings, registry.clone(), chain.clone(), Handle::current()).unwrap();
        (engine, registry, chain)
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        for _ in 0..400 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_stake_twice_keeps_one_actor() {
        let (engine, _, _) = setup(0x1d00ffff);
        engine.stake(Credential::new("main", "pw")).await.unwrap();
        engine.stake(Credential::new("main", "pw")).await.unwrap();
        assert_eq!(engine.staker_count(), 1);

        let statuses = engine.statuses().await;
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].staking);
    }

    #[tokio::test]
    async fn test_stop_then_resume() {
        let (engine, _, _) = setup(0x1d00ffff);
        assert!(!engine.stop("main").await.unwrap());

        engine.stake(Credential::new("main", "pw")).await.unwrap();
        assert!(engine.stop("main").await.unwrap());
        assert!(!engine.staking_info().await.staking);
        assert!(!engine.stop("main").await.unwrap());

        engine.stake(Credential::new("main", "pw")).await.unwrap();
        assert!(engine.staking_info().await.staking);
        assert_eq!(engine.staker_count(), 1);
    }

    #[tokio::test]
    async fn test_easy_kernel_appends_pos_blocks() {
        let (engine, registry, chain) = setup(0x207fffff);
        engine.stake(Credential::new("main", "pw")).await.unwrap();

        let watched = chain.clone();
        wait_for(move || watched.count_of_kind(BlockKind::ProofOfStake) >= 2).await;
        engine.stop("main").await.unwrap();

        let tip = chain.tip();
        let header = chain.get(&tip.hash).unwrap();
        assert_eq!(header.kind, BlockKind::ProofOfStake);

        let wallet = registry.get_wallet("main").unwrap();
        let owned: Vec<_> = wallet.accounts()[0].addresses.iter().filter(|a| a.used).map(|a| a.address.clone()).collect();
        assert!(owned.contains(&Address::from_script_pub_key(&header.coinbase).unwrap()));

        let info = engine.staking_info().await;
        assert!(info.enabled);
        assert!(info.blocks_staked >= 2);
        assert!(info.current_block_size > 0);
    }

    #[tokio::test]
    async fn test_info_aggregates_wallets() {
        let (engine, _, _) = setup(0x1d00ffff);
        engine.stake(Credential::new("main", "pw")).await.unwrap();
        engine.stake(Credential::new("side", "pw")).await.unwrap();
        engine.stop("side").await.unwrap();

        let info = engine.staking_info().await;
        assert_eq!(info.stakers, 2);
        assert!(info.staking);
        assert_eq!(info.weight, 1);
        assert_eq!(info.search_interval, 5);
    }

    #[tokio::test]
    async fn test_missing_wallet_reports_error() {
        let (engine, _, _) = setup(0x207fffff);
        engine.stake(Credential::new("ghost", "pw")).await.unwrap();

        for _ in 0..400 {
            if !engine.staking_info().await.errors.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(engine.staking_info().await.errors.starts_with("ghost: "));
    }

    #[tokio::test]
    async fn test_shutdown_drains_stakers() {
        let (engine, _, _) = setup(0x1d00ffff);
        engine.stake(Credential::new("main", "pw")).await.unwrap();
        engine.shutdown().await;
        assert_eq!(engine.staker_count(), 0);
        assert_eq!(engine.staking_info().await.stakers, 0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let settings = StakingSettings { weight: 0, ..Default::default() };
        let result = PosMinting::new(settings, Arc::new(WalletManager::in_memory()), Arc::new(Chain::new()), runtime.handle().clone());
        assert!(matches!(result, Err(StakingError::InvalidSettings(_))));
    }
}
