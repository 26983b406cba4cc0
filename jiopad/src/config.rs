use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use consensus_core::constants::DEVNET_BITS;
use mining::{MiningConfig as EngineConfig, UNBOUNDED_TRIES};
use rpc_core::CoordinatorSettings;
use staking::settings::DEFAULT_STAKE_BITS;
use staking::StakingSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcConfig,
    pub mining: MiningConfig,
    pub staking: StakingConfig,
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    pub num_workers: usize,
    pub bits: u32,
    pub max_tries: u64,
    /// Wallet paid by `generate`; the first wallet by name when unset
    pub wallet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    pub enabled: bool,
    pub search_interval_ms: u64,
    pub weight: u64,
    pub bits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub wallet_dir: PathBuf,
}

impl Config {
    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load(path: &Path) -> Result<Self, String> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
            Self::from_toml(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Override config with CLI arguments
    pub fn apply_cli_overrides(&mut self, args: &crate::cli::Args) {
        if let Some(wallet_dir) = &args.wallet_dir {
            self.wallet.wallet_dir = wallet_dir.clone();
        }

        if let Some(rpc_port) = args.rpc_port {
            self.rpc.port = rpc_port;
        }

        if let Some(bind) = &args.rpc_bind {
            self.rpc.bind_address = bind.clone();
        }

        if args.no_rpc {
            self.rpc.enabled = false;
        }

        if let Some(wallet) = &args.mining_wallet {
            self.mining.wallet = Some(wallet.clone());
        }

        if let Some(workers) = args.mining_workers {
            self.mining.num_workers = workers;
        }

        if let Some(max_tries) = args.max_tries {
            self.mining.max_tries = max_tries;
        }

        if args.enable_staking {
            self.staking.enabled = true;
        }

        if let Some(interval) = args.stake_interval_ms {
            self.staking.search_interval_ms = interval;
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig { num_workers: self.mining.num_workers, bits: self.mining.bits }
    }

    pub fn staking_settings(&self) -> StakingSettings {
        StakingSettings {
            search_interval: Duration::from_millis(self.staking.search_interval_ms),
            weight: self.staking.weight,
            bits: self.staking.bits,
        }
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings { mining_wallet: self.mining.wallet.clone(), max_tries: self.mining.max_tries }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            mining: MiningConfig::default(),
            staking: StakingConfig::default(),
            wallet: WalletConfig::default(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { enabled: true, bind_address: "127.0.0.1".to_string(), port: 16110 }
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self { num_workers: num_cpus::get().max(1), bits: DEVNET_BITS, max_tries: UNBOUNDED_TRIES, wallet: None }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self { enabled: false, search_interval_ms: 1000, weight: 1, bits: DEFAULT_STAKE_BITS }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self { wallet_dir: PathBuf::from("./data/wallets") }
    }
}
