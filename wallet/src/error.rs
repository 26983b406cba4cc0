use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet '{0}' not found")]
    WalletNotFound(String),

    #[error("Wallet '{0}' already exists")]
    WalletExists(String),

    #[error("Account {index} not found in wallet '{wallet}'")]
    AccountNotFound { wallet: String, index: u32 },

    #[error("Invalid wallet name '{0}'")]
    InvalidName(String),

    #[error("Invalid password for wallet '{0}'")]
    InvalidPassword(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Keystore error: {0}")]
    Keystore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
