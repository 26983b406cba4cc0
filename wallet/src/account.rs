use consensus_core::ScriptPublicKey;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::WalletError;
use crate::keys::ExtendedPublicKey;

/// Identifies an account inside the registry
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub wallet_name: String,
    pub index: u32,
}

impl AccountRef {
    pub fn new(wallet_name: impl Into<String>, index: u32) -> Self {
        Self { wallet_name: wallet_name.into(), index }
    }
}

impl std::fmt::Display for AccountRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.wallet_name, self.index)
    }
}

/// A derived receiving address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddress {
    pub index: u32,
    pub address: String,
    pub public_key: String,
    pub used: bool,
}

impl WalletAddress {
    fn derive(xpub: &ExtendedPublicKey, index: u32) -> Result<Self, WalletError> {
        let public_key = xpub.derive_child(index)?;
        Ok(Self { index, address: Address::from_public_key(&public_key), public_key: hex::encode(public_key.serialize()), used: false })
    }

    /// Receiving script for this address
    pub fn script_pub_key(&self) -> Result<ScriptPublicKey, WalletError> {
        let bytes = hex::decode(&self.public_key).map_err(|e| WalletError::InvalidAddress(e.to_string()))?;
        let public_key = PublicKey::from_slice(&bytes).map_err(|e| WalletError::InvalidAddress(e.to_string()))?;
        Ok(Address::p2pkh_script(&Address::pubkey_hash(&public_key)))
    }
}

/// Account state persisted in the wallet file
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub index: u32,
    pub name: String,
    pub xpub: ExtendedPublicKey,
    pub addresses: Vec<WalletAddress>,
}

impl Account {
    pub fn new(index: u32, name: impl Into<String>, xpub: ExtendedPublicKey) -> Self {
        Self { index, name: name.into(), xpub, addresses: Vec::new() }
    }

    /// Marks and returns the first unused address, deriving a new one when
    /// every known address is used.
    pub(crate) fn take_unused_address(&mut self) -> Result<WalletAddress, WalletError> {
        if let Some(entry) = self.addresses.iter_mut().find(|a| !a.used) {
            entry.used = true;
            return Ok(entry.clone());
        }

        let next_index = self.addresses.len() as u32;
        let mut entry = WalletAddress::derive(&self.xpub, next_index)?;
        entry.used = true;
        self.addresses.push(entry.clone());
        Ok(entry)
    }

    /// Derives `count` further addresses ahead of use
    pub fn extend_pool(&mut self, count: u32) -> Result<(), WalletError> {
        let start = self.addresses.len() as u32;
        for index in start..start + count {
            self.addresses.push(WalletAddress::derive(&self.xpub, index)?);
        }
        Ok(())
    }

    pub fn used_count(&self) -> usize {
        self.addresses.iter().filter(|a| a.used).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keys;

    fn account() -> Account {
        Account::new(0, "default", Keys::from_seed([11u8; 64]).account_xpub(0).unwrap())
    }

    #[test]
    fn test_take_unused_marks_used() {
        let mut account = account();
        let first = account.take_unused_address().unwrap();
        let second = account.take_unused_address().unwrap();
        assert!(first.used);
        assert_ne!(first.address, second.address);
        assert_eq!(account.used_count(), 2);
    }

    #[test]
    fn test_pool_entries_are_used_in_order() {
        let mut account = account();
        account.extend_pool(3).unwrap();
        let taken = account.take_unused_address().unwrap();
        assert_eq!(taken.index, 0);
        assert_eq!(account.addresses.len(), 3);
        assert!(!account.addresses[1].used);
    }

    #[test]
    fn test_script_matches_address() {
        let mut account = account();
        let entry = account.take_unused_address().unwrap();
        let script = entry.script_pub_key().unwrap();
        assert_eq!(Address::from_script_pub_key(&script).unwrap(), entry.address);
    }
}
