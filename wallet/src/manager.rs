//! Registry of loaded wallets.
//!
//! Address issuance (pick an unused address and mark it used) happens under
//! one write lock so concurrent callers never receive the same address.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::account::{Account, AccountRef, WalletAddress};
use crate::error::WalletError;
use crate::keys::Keys;
use crate::keystore::{KdfParams, Keystore};

const WALLET_FILE_SUFFIX: &str = ".wallet.json";

/// Addresses derived up front for each new account
const ADDRESS_LOOKAHEAD: u32 = 20;

/// A loaded wallet; persisted as `<name>.wallet.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub name: String,
    pub created_at: u64,
    keystore: Keystore,
    accounts: Vec<Account>,
}

impl Wallet {
    /// Creates a wallet with a fresh random seed and `account_count` accounts
    pub fn create(name: &str, password: &str, account_count: u32, kdf: KdfParams) -> Result<Self, WalletError> {
        validate_name(name)?;
        let keys = Keys::new();
        let keystore = Keystore::seal(password, keys.seed(), kdf)?;

        let mut accounts = Vec::with_capacity(account_count as usize);
        for index in 0..account_count {
            let mut account = Account::new(index, format!("account {}", index), keys.account_xpub(index)?);
            account.extend_pool(ADDRESS_LOOKAHEAD)?;
            accounts.push(account);
        }

        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Ok(Self { name: name.to_string(), created_at, keystore, accounts })
    }

    /// Checks `password` against the encrypted seed
    pub fn verify_password(&self, password: &str) -> Result<(), WalletError> {
        self.keystore.open(&self.name, password).map(|_| ())
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    fn account_mut(&mut self, index: u32) -> Result<&mut Account, WalletError> {
        let wallet = self.name.clone();
        self.accounts.iter_mut().find(|a| a.index == index).ok_or(WalletError::AccountNotFound { wallet, index })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WalletError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), WalletError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(WalletError::InvalidName(name.to_string()))
    }
}

/// Holds every loaded wallet, optionally backed by a directory of wallet files
pub struct WalletManager {
    wallets: RwLock<BTreeMap<String, Wallet>>,
    wallet_dir: Option<PathBuf>,
    kdf: KdfParams,
}

impl WalletManager {
    /// Registry kept only in memory
    pub fn in_memory() -> Self {
        Self { wallets: RwLock::new(BTreeMap::new()), wallet_dir: None, kdf: KdfParams::default() }
    }

    /// Loads every `*.wallet.json` in `dir`, creating the directory if needed
    pub fn open_dir<P: AsRef<Path>>(dir: P) -> Result<Self, WalletError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut wallets = BTreeMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_wallet = path.file_name().and_then(|n| n.to_str()).map(|n| n.ends_with(WALLET_FILE_SUFFIX)).unwrap_or(false);
            if !is_wallet {
                continue;
            }
            match Wallet::load(&path) {
                Ok(wallet) => {
                    debug!("Loaded wallet '{}' from {}", wallet.name, path.display());
                    wallets.insert(wallet.name.clone(), wallet);
                }
                Err(e) => warn!("Skipping unreadable wallet file {}: {}", path.display(), e),
            }
        }

        info!("Wallet registry opened at {} with {} wallet(s)", dir.display(), wallets.len());
        Ok(Self { wallets: RwLock::new(wallets), wallet_dir: Some(dir), kdf: KdfParams::default() })
    }

    /// Overrides the key derivation cost used for wallets created from now on
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Creates, registers and (when directory-backed) persists a new wallet
    pub fn create_wallet(&self, name: &str, password: &str, account_count: u32) -> Result<Wallet, WalletError> {
        if self.wallets.read().contains_key(name) {
            return Err(WalletError::WalletExists(name.to_string()));
        }
        let wallet = Wallet::create(name, password, account_count, self.kdf)?;

        let mut wallets = self.wallets.write();
        if wallets.contains_key(name) {
            return Err(WalletError::WalletExists(name.to_string()));
        }
        self.persist(&wallet)?;
        wallets.insert(name.to_string(), wallet.clone());
        info!("Created wallet '{}' with {} account(s)", name, account_count);
        Ok(wallet)
    }

    /// Names of loaded wallets in lexicographic order
    pub fn list_wallet_names(&self) -> Vec<String> {
        self.wallets.read().keys().cloned().collect()
    }

    pub fn get_wallet(&self, name: &str) -> Result<Wallet, WalletError> {
        self.wallets.read().get(name).cloned().ok_or_else(|| WalletError::WalletNotFound(name.to_string()))
    }

    pub fn list_accounts(&self, wallet_name: &str) -> Result<Vec<AccountRef>, WalletError> {
        let wallets = self.wallets.read();
        let wallet = wallets.get(wallet_name).ok_or_else(|| WalletError::WalletNotFound(wallet_name.to_string()))?;
        Ok(wallet.accounts.iter().map(|a| AccountRef::new(wallet_name, a.index)).collect())
    }

    /// Selects an unused address of `account` and marks it used in one step
    pub fn get_unused_address(&self, account: &AccountRef) -> Result<WalletAddress, WalletError> {
        let mut wallets = self.wallets.write();
        let wallet = wallets.get_mut(&account.wallet_name).ok_or_else(|| WalletError::WalletNotFound(account.wallet_name.clone()))?;
        let address = wallet.account_mut(account.index)?.take_unused_address()?;
        self.persist(wallet)?;
        debug!("Issued address {} (index {}) from account {}", address.address, address.index, account);
        Ok(address)
    }

    fn persist(&self, wallet: &Wallet) -> Result<(), WalletError> {
        match &self.wallet_dir {
            Some(dir) => wallet.save(dir.join(format!("{}{}", wallet.name, WALLET_FILE_SUFFIX))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn manager() -> WalletManager {
        WalletManager::in_memory().with_kdf(KdfParams::insecure())
    }

    #[test]
    fn test_names_are_sorted() {
        let manager = manager();
        manager.create_wallet("zeta", "pw", 1).unwrap();
        manager.create_wallet("alpha", "pw", 1).unwrap();
        assert_eq!(manager.list_wallet_names(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let manager = manager();
        manager.create_wallet("main", "pw", 1).unwrap();
        assert!(matches!(manager.create_wallet("main", "pw", 1), Err(WalletError::WalletExists(_))));
        assert!(matches!(manager.create_wallet("../evil", "pw", 1), Err(WalletError::InvalidName(_))));
    }

    #[test]
    fn test_missing_wallet_and_account() {
        let manager = manager();
        manager.create_wallet("main", "pw", 1).unwrap();
        assert!(matches!(manager.get_wallet("other"), Err(WalletError::WalletNotFound(_))));
        let result = manager.get_unused_address(&AccountRef::new("main", 3));
        assert!(matches!(result, Err(WalletError::AccountNotFound { index: 3, .. })));
    }

    #[test]
    fn test_verify_password() {
        let manager = manager();
        manager.create_wallet("main", "secret", 1).unwrap();
        let wallet = manager.get_wallet("main").unwrap();
        assert!(wallet.verify_password("secret").is_ok());
        assert!(matches!(wallet.verify_password("nope"), Err(WalletError::InvalidPassword(_))));
    }

    #[test]
    fn test_concurrent_issuance_never_repeats() {
        let manager = Arc::new(manager());
        manager.create_wallet("main", "pw", 1).unwrap();
        let account = AccountRef::new("main", 0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let account = account.clone();
                thread::spawn(move || (0..10).map(|_| manager.get_unused_address(&account).unwrap().address).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for address in handle.join().unwrap() {
                assert!(seen.insert(address), "address issued twice");
            }
        }
        assert_eq!(seen.len(), 80);
    }

    #[test]
    fn test_used_flags_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let issued = {
            let manager = WalletManager::open_dir(dir.path()).unwrap().with_kdf(KdfParams::insecure());
            manager.create_wallet("main", "pw", 2).unwrap();
            manager.get_unused_address(&AccountRef::new("main", 1)).unwrap()
        };

        let reopened = WalletManager::open_dir(dir.path()).unwrap();
        assert_eq!(reopened.list_accounts("main").unwrap().len(), 2);
        let next = reopened.get_unused_address(&AccountRef::new("main", 1)).unwrap();
        assert_ne!(next.address, issued.address);
        assert!(reopened.get_wallet("main").unwrap().verify_password("pw").is_ok());
    }
}
