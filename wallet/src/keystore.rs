use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::keys::hex_array;

/// Argon2id cost parameters, stored next to the ciphertext
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { m_cost: Params::DEFAULT_M_COST, t_cost: Params::DEFAULT_T_COST, p_cost: Params::DEFAULT_P_COST }
    }
}

impl KdfParams {
    /// Minimal Argon2 cost, only for tests and throwaway devnet wallets
    pub const fn insecure() -> Self {
        Self { m_cost: 8, t_cost: 1, p_cost: 1 }
    }

    fn argon2(&self) -> Result<Argon2<'static>, WalletError> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, Some(32)).map_err(|e| WalletError::Keystore(format!("Invalid KDF parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Encrypted master seed of a wallet
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keystore {
    version: u32,
    kdf: KdfParams,
    #[serde(with = "hex_array")]
    salt: [u8; 32],
    #[serde(with = "hex_array")]
    nonce: [u8; 12],
    encrypted_seed: String,
}

impl std::fmt::Debug for Keystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystore").field("version", &self.version).field("kdf", &self.kdf).finish_non_exhaustive()
    }
}

impl Keystore {
    /// Encrypt a master seed under `password`
    pub fn seal(password: &str, seed: &[u8; 64], kdf: KdfParams) -> Result<Self, WalletError> {
        let mut salt = [0u8; 32];
        OsRng.fill_bytes(&mut salt);

        let mut nonce = [0u8; 12];
        OsRng.fill_bytes(&mut nonce);

        let cipher = Self::cipher(password, &salt, &kdf)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), seed.as_ref())
            .map_err(|e| WalletError::Keystore(format!("Encryption failed: {}", e)))?;

        Ok(Self { version: 1, kdf, salt, nonce, encrypted_seed: hex::encode(ciphertext) })
    }

    /// Decrypt the master seed; a wrong password surfaces as `InvalidPassword`
    pub fn open(&self, wallet_name: &str, password: &str) -> Result<[u8; 64], WalletError> {
        let ciphertext = hex::decode(&self.encrypted_seed).map_err(|e| WalletError::Keystore(format!("Corrupted ciphertext: {}", e)))?;
        let cipher = Self::cipher(password, &self.salt, &self.kdf)?;

        let decrypted = cipher
            .decrypt(Nonce::from_slice(&self.nonce), ciphertext.as_ref())
            .map_err(|_| WalletError::InvalidPassword(wallet_name.to_string()))?;

        decrypted.try_into().map_err(|_| WalletError::Keystore("Decrypted seed has wrong length".to_string()))
    }

    fn cipher(password: &str, salt: &[u8; 32], kdf: &KdfParams) -> Result<Aes256Gcm, WalletError> {
        // Derive key from password using Argon2
        let mut key = [0u8; 32];
        kdf.argon2()?
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| WalletError::Keystore(format!("Key derivation failed: {}", e)))?;

        Aes256Gcm::new_from_slice(&key).map_err(|e| WalletError::Keystore(format!("Cipher creation failed: {:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIGHT: KdfParams = KdfParams::insecure();

    #[test]
    fn test_keystore_seal_open() {
        let seed = [42u8; 64];
        let keystore = Keystore::seal("test_password", &seed, LIGHT).unwrap();
        assert_eq!(keystore.open("w", "test_password").unwrap(), seed);
    }

    #[test]
    fn test_wrong_password() {
        let keystore = Keystore::seal("correct_password", &[0u8; 64], LIGHT).unwrap();
        let result = keystore.open("w", "wrong_password");
        assert!(matches!(result, Err(WalletError::InvalidPassword(name)) if name == "w"));
    }

    #[test]
    fn test_json_roundtrip_keeps_kdf() {
        let keystore = Keystore::seal("pw", &[5u8; 64], LIGHT).unwrap();
        let json = serde_json::to_string(&keystore).unwrap();
        let loaded: Keystore = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.kdf, LIGHT);
        assert_eq!(loaded.open("w", "pw").unwrap(), [5u8; 64]);
    }
}
