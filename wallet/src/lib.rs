//! Wallet and address registry.
//!
//! Wallets hold an encrypted master seed and a set of accounts. Each account
//! keeps an extended public key so receiving addresses can be derived without
//! unlocking the wallet.

pub mod account;
pub mod address;
pub mod error;
pub mod keys;
pub mod keystore;
pub mod manager;

pub use account::{Account, AccountRef, WalletAddress};
pub use address::Address;
pub use error::WalletError;
pub use keys::{ExtendedPublicKey, Keys};
pub use keystore::{KdfParams, Keystore};
pub use manager::{Wallet, WalletManager};
