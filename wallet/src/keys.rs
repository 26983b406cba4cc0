use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::Sha512;

use crate::error::WalletError;

/// First hardened child index
pub const HARDENED: u32 = 0x8000_0000;

/// BIP44 purpose and coin type used for JIO accounts
const PURPOSE: u32 = 44;
const COIN_TYPE: u32 = 111_111;

type HmacSha512 = Hmac<Sha512>;

fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64], WalletError> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|e| WalletError::KeyDerivation(format!("HMAC error: {}", e)))?;
    mac.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn scalar(bytes: &[u8]) -> Result<Scalar, WalletError> {
    let mut array = [0u8; 32];
    array.copy_from_slice(&bytes[..32]);
    Scalar::from_be_bytes(array).map_err(|_| WalletError::KeyDerivation("tweak out of range".to_string()))
}

/// HD wallet key management (BIP32/BIP44 style)
#[derive(Clone)]
pub struct Keys {
    master_seed: [u8; 64],
    secp: Secp256k1<secp256k1::All>,
}

impl Keys {
    /// Create new keys from random seed
    pub fn new() -> Self {
        let mut seed = [0u8; 64];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Create keys from existing seed
    pub fn from_seed(seed: [u8; 64]) -> Self {
        Self { master_seed: seed, secp: Secp256k1::new() }
    }

    pub fn seed(&self) -> &[u8; 64] {
        &self.master_seed
    }

    /// Derive the private key and chain code at path
    pub fn derive_key(&self, path: &[u32]) -> Result<(SecretKey, [u8; 32]), WalletError> {
        let master = hmac_sha512(b"Bitcoin seed", &self.master_seed)?;
        let mut key = SecretKey::from_slice(&master[..32]).map_err(|e| WalletError::KeyDerivation(format!("Invalid secret key: {}", e)))?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&master[32..]);

        for &index in path {
            let mut data = Vec::with_capacity(37);
            if index >= HARDENED {
                data.push(0);
                data.extend_from_slice(&key.secret_bytes());
            } else {
                data.extend_from_slice(&PublicKey::from_secret_key(&self.secp, &key).serialize());
            }
            data.extend_from_slice(&index.to_be_bytes());

            let i = hmac_sha512(&chain_code, &data)?;
            key = key.add_tweak(&scalar(&i[..32])?).map_err(|e| WalletError::KeyDerivation(e.to_string()))?;
            chain_code.copy_from_slice(&i[32..]);
        }

        Ok((key, chain_code))
    }

    /// Get public key from secret key
    pub fn public_key(&self, secret_key: &SecretKey) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, secret_key)
    }

    /// Extended public key of account `index` (path m/44'/coin'/index')
    pub fn account_xpub(&self, index: u32) -> Result<ExtendedPublicKey, WalletError> {
        let path = [PURPOSE + HARDENED, COIN_TYPE + HARDENED, index + HARDENED];
        let (secret_key, chain_code) = self.derive_key(&path)?;
        Ok(ExtendedPublicKey { public_key: self.public_key(&secret_key), chain_code })
    }
}

impl Default for Keys {
    fn default() -> Self {
        Self::new()
    }
}

/// Public half of an account key, enough to derive non-hardened receiving keys
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedPublicKey {
    #[serde(with = "public_key_hex")]
    pub public_key: PublicKey,
    #[serde(with = "hex_array")]
    pub chain_code: [u8; 32],
}

impl ExtendedPublicKey {
    /// Derive the non-hardened child public key at `index`
    pub fn derive_child(&self, index: u32) -> Result<PublicKey, WalletError> {
        if index >= HARDENED {
            return Err(WalletError::KeyDerivation("hardened index needs the private key".to_string()));
        }
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&self.public_key.serialize());
        data.extend_from_slice(&index.to_be_bytes());
        let i = hmac_sha512(&self.chain_code, &data)?;

        let secp = Secp256k1::verification_only();
        self.public_key.add_exp_tweak(&secp, &scalar(&i[..32])?).map_err(|e| WalletError::KeyDerivation(e.to_string()))
    }
}

mod public_key_hex {
    use secp256k1::PublicKey;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &PublicKey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(key.serialize()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PublicKey, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        PublicKey::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        bytes.try_into().map_err(|v: Vec<u8>| serde::de::Error::invalid_length(v.len(), &"fixed-size hex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation_is_deterministic() {
        let seed = [42u8; 64];
        let path = [HARDENED, 1, 2];
        let (sk, cc) = Keys::from_seed(seed).derive_key(&path).unwrap();
        let (sk2, cc2) = Keys::from_seed(seed).derive_key(&path).unwrap();
        assert_eq!(sk, sk2);
        assert_eq!(cc, cc2);
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let keys = Keys::from_seed([7u8; 64]);
        let xpub = keys.account_xpub(0).unwrap();

        let path = [PURPOSE + HARDENED, COIN_TYPE + HARDENED, HARDENED, 5];
        let (child_sk, _) = keys.derive_key(&path).unwrap();
        assert_eq!(xpub.derive_child(5).unwrap(), keys.public_key(&child_sk));
    }

    #[test]
    fn test_accounts_differ() {
        let keys = Keys::from_seed([1u8; 64]);
        assert_ne!(keys.account_xpub(0).unwrap(), keys.account_xpub(1).unwrap());
    }

    #[test]
    fn test_hardened_public_derivation_rejected() {
        let xpub = Keys::from_seed([3u8; 64]).account_xpub(0).unwrap();
        assert!(xpub.derive_child(HARDENED).is_err());
    }
}
