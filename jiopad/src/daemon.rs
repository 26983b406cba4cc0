use crate::config::Config;
use crate::ui;
use consensus_core::{BlockKind, Chain};
use mining::MiningManager;
use rpc_core::{RpcApi, RpcCoordinator, StakingProvider};
use rpc_wrpc::WrpcServer;
use staking::StakingFeature;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::{error, info};
use wallet::WalletManager;

pub struct Daemon {
    config: Config,
    shutdown_tx: broadcast::Sender<()>,

    chain: Arc<Chain>,
    registry: Arc<WalletManager>,
    staking: Option<Arc<StakingFeature>>,
    coordinator: Arc<RpcCoordinator>,
    rpc_server: Option<WrpcServer>,
}

impl Daemon {
    /// Create new daemon instance
    pub async fn new(config: Config) -> Result<Self, String> {
        ui::print_section("Initializing Components");

        let (shutdown_tx, _) = broadcast::channel(1);

        let chain = Arc::new(Chain::new());
        info!("Chain initialized at genesis {}", chain.tip().hash);

        ui::print_component_status("Wallet Registry", ui::ComponentStatus::Starting);
        info!("Opening wallet directory {:?}", config.wallet.wallet_dir);
        let registry = Arc::new(
            WalletManager::open_dir(&config.wallet.wallet_dir).map_err(|e| format!("Failed to open wallet directory: {}", e))?,
        );
        ui::print_component_status("Wallet Registry", ui::ComponentStatus::Running);

        ui::print_component_status("PoW Engine", ui::ComponentStatus::Starting);
        info!("Starting {} mining worker(s)", config.mining.num_workers);
        let miner = Arc::new(
            MiningManager::new(config.engine_config(), chain.clone()).map_err(|e| format!("Failed to start mining workers: {}", e))?,
        );
        ui::print_component_status("PoW Engine", ui::ComponentStatus::Running);

        let staking = if config.staking.enabled {
            let settings = config.staking_settings();
            settings.validate().map_err(|e| format!("Invalid staking configuration: {}", e))?;
            ui::print_status("ℹ", "Staking available, engine starts on first startstaking call", ui::StatusType::Info);
            Some(Arc::new(StakingFeature::new(settings, registry.clone(), chain.clone())))
        } else {
            ui::print_status("ℹ", "Staking not enabled", ui::StatusType::Info);
            None
        };

        let coordinator = Arc::new(RpcCoordinator::new(
            registry.clone(),
            miner,
            staking.clone().map(|feature| feature as Arc<dyn StakingProvider>),
            config.coordinator_settings(),
        ));

        let rpc_server = if config.rpc.enabled {
            ui::print_component_status("RPC Server", ui::ComponentStatus::Starting);
            info!("Initializing RPC server on {}:{}", config.rpc.bind_address, config.rpc.port);
            let api: Arc<dyn RpcApi> = coordinator.clone();
            let server = WrpcServer::bind(api, &config.rpc.bind_address, config.rpc.port).await?;
            ui::print_component_status("RPC Server", ui::ComponentStatus::Running);
            Some(server)
        } else {
            None
        };

        ui::print_status("✓", "All components initialized successfully", ui::StatusType::Success);
        Ok(Self { config, shutdown_tx, chain, registry, staking, coordinator, rpc_server })
    }

    /// Creates a wallet in the configured wallet directory
    pub fn create_wallet(&self, name: &str, password: &str, accounts: u32) -> Result<(), String> {
        self.registry.create_wallet(name, password, accounts).map_err(|e| format!("Failed to create wallet '{}': {}", name, e))?;
        ui::print_status("✓", &format!("Created wallet '{}'", name), ui::StatusType::Success);
        Ok(())
    }

    /// The control surface the RPC server serves
    pub fn api(&self) -> Arc<dyn RpcApi> {
        self.coordinator.clone()
    }

    pub fn chain(&self) -> &Arc<Chain> {
        &self.chain
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bound RPC address, when the server is enabled
    pub fn rpc_addr(&self) -> Option<SocketAddr> {
        self.rpc_server.as_ref().and_then(|server| server.local_addr().ok())
    }

    /// Sending on the returned channel stops `run`
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run the daemon
    pub async fn run(mut self) -> Result<(), String> {
        ui::print_section("Starting Services");
        info!("Starting JIOPad daemon");

        let shutdown_rx = self.shutdown_tx.subscribe();
        let start_time = Instant::now();

        let server_handle = self.rpc_server.take().map(|server| {
            tokio::spawn(async move {
                if let Err(e) = server.run().await {
                    error!("RPC server stopped: {}", e);
                }
            })
        });

        ui::print_status("✓", "JIOPad daemon is now running", ui::StatusType::Success);
        ui::print_status("ℹ", "Press Ctrl+C to stop the daemon", ui::StatusType::Info);
        println!();

        let status_handle = {
            let chain = self.chain.clone();
            let registry = self.registry.clone();
            let api = self.api();

            tokio::spawn(async move {
                let mut interval = interval(Duration::from_secs(30));
                loop {
                    interval.tick().await;

                    let mining = api.get_mining_info().await.unwrap_or_default();
                    let staking = api.get_staking_info(true).await.unwrap_or_default();
                    let status = ui::NodeStatus {
                        uptime: start_time.elapsed(),
                        height: chain.height(),
                        pow_blocks: chain.count_of_kind(BlockKind::ProofOfWork),
                        pos_blocks: chain.count_of_kind(BlockKind::ProofOfStake),
                        wallets: registry.list_wallet_names().len(),
                        mining_hashrate: mining.hash_rate,
                        stakers: staking.stakers,
                        staking: staking.staking,
                    };

                    print!("{}", status);
                }
            })
        };

        self.wait_for_shutdown(shutdown_rx).await;

        status_handle.abort();
        if let Some(handle) = server_handle {
            handle.abort();
            ui::print_component_status("RPC Server", ui::ComponentStatus::Stopped);
        }

        if let Some(engine) = self.staking.as_ref().and_then(|feature| feature.active()) {
            info!("Stopping staking");
            engine.shutdown().await;
            ui::print_component_status("PoS Engine", ui::ComponentStatus::Stopped);
        }

        info!("All components stopped");
        Ok(())
    }

    async fn wait_for_shutdown(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        tokio::select! {
            _ = signal::ctrl_c() => {
                ui::print_status("ℹ", "Received Ctrl+C, shutting down gracefully...", ui::StatusType::Warning);
                info!("Received Ctrl+C, shutting down");
            }
            _ = shutdown_rx.recv() => {
                ui::print_status("ℹ", "Received shutdown signal", ui::StatusType::Info);
                info!("Received shutdown signal");
            }
        }
    }
}
