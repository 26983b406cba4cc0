//! Per-wallet staker actor.
//!
//! The actor task owns all of its wallet's staking state; the engine talks to
//! it only through [`StakerCommand`] messages.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use consensus_core::{BlockKind, Chain, ConsensusError, Hash, Header};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use wallet::{AccountRef, WalletError, WalletManager};

use crate::credential::Credential;
use crate::error::StakingError;
use crate::info::StakerStatus;
use crate::kernel::StakeKernel;
use crate::settings::StakingSettings;

const COMMAND_BUFFER: usize = 16;

pub enum StakerCommand {
    /// Start or resume staking, replacing the held credential
    Start(Credential),
    Stop,
    Status(oneshot::Sender<StakerStatus>),
    Shutdown,
}

/// Engine-side handle of a running actor
pub struct StakerHandle {
    commands: mpsc::Sender<StakerCommand>,
    task: JoinHandle<()>,
}

impl StakerHandle {
    /// Spawns a staker that starts in the staking state
    pub fn spawn(
        runtime: &tokio::runtime::Handle,
        credential: Credential,
        settings: StakingSettings,
        registry: Arc<WalletManager>,
        chain: Arc<Chain>,
    ) -> Self {
        let (staker, commands) = Staker::new(credential, settings, registry, chain);
        let task = runtime.spawn(staker.run());
        Self { commands, task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished() && !self.commands.is_closed()
    }

    pub fn sender(&self) -> mpsc::Sender<StakerCommand> {
        self.commands.clone()
    }

    /// Requests shutdown and waits for the task to end
    pub async fn shutdown(self) {
        let _ = self.commands.send(StakerCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            warn!("Staker task ended abnormally: {}", e);
        }
    }
}

/// Asks the actor behind `sender` for its status
pub async fn query_status(sender: &mpsc::Sender<StakerCommand>, wallet: &str) -> Result<StakerStatus, StakingError> {
    let (reply, response) = oneshot::channel();
    sender.send(StakerCommand::Status(reply)).await.map_err(|_| StakingError::StakerGone(wallet.to_string()))?;
    response.await.map_err(|_| StakingError::StakerGone(wallet.to_string()))
}

struct Staker {
    credential: Credential,
    settings: StakingSettings,
    kernel: StakeKernel,
    registry: Arc<WalletManager>,
    chain: Arc<Chain>,
    inbox: mpsc::Receiver<StakerCommand>,
    staking: bool,
    blocks_staked: u64,
    last_block_size: u64,
    last_error: Option<String>,
}

impl Staker {
    fn new(
        credential: Credential,
        settings: StakingSettings,
        registry: Arc<WalletManager>,
        chain: Arc<Chain>,
    ) -> (Self, mpsc::Sender<StakerCommand>) {
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let kernel = StakeKernel::new(settings.bits, settings.weight);
        let staker = Staker {
            credential,
            settings,
            kernel,
            registry,
            chain,
            inbox,
            staking: true,
            blocks_staked: 0,
            last_block_size: 0,
            last_error: None,
        };
        (staker, commands)
    }

    async fn run(mut self) {
        info!("Staker for wallet '{}' started", self.wallet());
        let mut ticker = time::interval(self.settings.search_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(StakerCommand::Start(credential)) => {
                        if !self.staking {
                            info!("Staking resumed for wallet '{}'", self.wallet());
                        }
                        self.credential = credential;
                        self.staking = true;
                    }
                    Some(StakerCommand::Stop) => {
                        if self.staking {
                            info!("Staking stopped for wallet '{}'", self.wallet());
                        }
                        self.staking = false;
                    }
                    Some(StakerCommand::Status(reply)) => {
                        let _ = reply.send(self.status());
                    }
                    Some(StakerCommand::Shutdown) | None => break,
                },
                _ = ticker.tick(), if self.staking => self.search(),
            }
        }

        info!("Staker for wallet '{}' exited after {} block(s)", self.wallet(), self.blocks_staked);
    }

    fn wallet(&self) -> &str {
        self.credential.wallet_name()
    }

    fn status(&self) -> StakerStatus {
        StakerStatus {
            wallet: self.wallet().to_string(),
            staking: self.staking,
            blocks_staked: self.blocks_staked,
            last_block_size: self.last_block_size,
            last_error: self.last_error.clone(),
        }
    }

    /// One kernel evaluation against the current tip
    fn search(&mut self) {
        let tip = self.chain.tip();
        let timestamp = now_millis().max(tip.timestamp + 1);
        if !self.kernel.check(&tip.hash, self.wallet(), timestamp) {
            return;
        }

        match self.stake_block(tip.hash, tip.height + 1, timestamp) {
            Ok(hash) => {
                self.blocks_staked += 1;
                self.last_error = None;
                info!("Wallet '{}' staked block {} at height {}", self.wallet(), hash, tip.height + 1);
            }
            // A PoW block landed first; the next tick evaluates the new tip
            Err(StakingError::Chain(ConsensusError::NotExtendingTip { .. })) => {
                debug!("Tip moved before wallet '{}' could stake", self.wallet());
            }
            Err(e) => {
                warn!("Wallet '{}' failed to stake: {}", self.wallet(), e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn stake_block(&mut self, parent: Hash, height: u64, timestamp: u64) -> Result<Hash, StakingError> {
        let wallet = self.wallet().to_string();
        let first = self
            .registry
            .list_accounts(&wallet)?
            .into_iter()
            .next()
            .ok_or(WalletError::AccountNotFound { wallet: wallet.clone(), index: 0 })?;
        let reward = self.registry.get_unused_address(&AccountRef::new(wallet, first.index))?;

        let header = Header::new(BlockKind::ProofOfStake, parent, height, timestamp, self.settings.bits, reward.script_pub_key()?);
        let size = header.bytes_with_nonce(header.nonce).len() as u64;
        let hash = self.chain.append(header)?;
        self.last_block_size = size;
        Ok(hash)
    }
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}
