use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "jiopad")]
#[command(about = "JIO node daemon exposing the mining and staking control surface", long_about = None)]
pub struct Args {
    /// Path to configuration file (optional, uses defaults if not provided)
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,

    /// Directory holding the wallet files
    #[arg(short, long)]
    pub wallet_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// RPC server port
    #[arg(long)]
    pub rpc_port: Option<u16>,

    /// RPC bind address
    #[arg(long)]
    pub rpc_bind: Option<String>,

    /// Disable RPC server
    #[arg(long)]
    pub no_rpc: bool,

    /// Wallet receiving `generate` rewards
    #[arg(long)]
    pub mining_wallet: Option<String>,

    /// Number of PoW worker threads
    #[arg(long)]
    pub mining_workers: Option<usize>,

    /// Nonce budget per generated block
    #[arg(long)]
    pub max_tries: Option<u64>,

    /// Enable the proof-of-stake engine
    #[arg(long)]
    pub enable_staking: bool,

    /// Milliseconds between kernel searches
    #[arg(long)]
    pub stake_interval_ms: Option<u64>,

    /// Create this wallet before starting (requires --wallet-password)
    #[arg(long)]
    pub create_wallet: Option<String>,

    /// Password for --create-wallet
    #[arg(long)]
    pub wallet_password: Option<String>,

    /// Accounts in a wallet made by --create-wallet
    #[arg(long, default_value = "1")]
    pub wallet_accounts: u32,
}

pub fn parse_args() -> Args {
    Args::parse()
}
