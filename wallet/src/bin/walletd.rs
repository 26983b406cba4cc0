use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wallet::{AccountRef, WalletManager};

/// Simple wallet management CLI for the `wallet` crate
#[derive(Parser)]
#[command(name = "walletd")]
struct Cli {
    /// Wallet directory (default: ./data/wallets)
    #[arg(short, long, default_value = "data/wallets")]
    wallet_dir: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet and write its encrypted keystore
    Create {
        #[arg(short, long)]
        name: String,
        /// Password to encrypt the keystore
        #[arg(short, long)]
        password: String,
        /// Number of accounts to create
        #[arg(short, long, default_value = "1")]
        accounts: u32,
    },

    /// List wallets in the directory
    List,

    /// List accounts of a wallet with their address usage
    Accounts {
        #[arg(short, long)]
        name: String,
    },

    /// Reserve the next unused receiving address of an account
    NewAddress {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "0")]
        account: u32,
    },

    /// Check a wallet password without starting anything
    CheckPassword {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        password: String,
    },
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let manager = WalletManager::open_dir(&cli.wallet_dir).map_err(|e| e.to_string())?;

    match cli.cmd {
        Commands::Create { name, password, accounts } => {
            let wallet = manager.create_wallet(&name, &password, accounts).map_err(|e| e.to_string())?;
            println!("Created wallet '{}' in {}", wallet.name, cli.wallet_dir.display());
            for account in wallet.accounts() {
                if let Some(first) = account.addresses.first() {
                    println!("  account {}: first address {}", account.index, first.address);
                }
            }
        }

        Commands::List => {
            for name in manager.list_wallet_names() {
                println!("{}", name);
            }
        }

        Commands::Accounts { name } => {
            let wallet = manager.get_wallet(&name).map_err(|e| e.to_string())?;
            for account in wallet.accounts() {
                println!("{}  {}  {} address(es), {} used", account.index, account.name, account.addresses.len(), account.used_count());
            }
        }

        Commands::NewAddress { name, account } => {
            let address = manager.get_unused_address(&AccountRef::new(name, account)).map_err(|e| e.to_string())?;
            println!("{}", address.address);
        }

        Commands::CheckPassword { name, password } => {
            let wallet = manager.get_wallet(&name).map_err(|e| e.to_string())?;
            wallet.verify_password(&password).map_err(|e| e.to_string())?;
            println!("Password OK");
        }
    }

    Ok(())
}
