use consensus_core::ScriptPublicKey;
use ripemd::Ripemd160;
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};

use crate::error::WalletError;

/// Version byte of JIO P2PKH addresses
const P2PKH_VERSION: u8 = 0x00;

/// Base58check P2PKH address encoding
pub struct Address;

impl Address {
    /// Generate new address from public key
    pub fn from_public_key(public_key: &PublicKey) -> String {
        let pubkey_hash = Self::pubkey_hash(public_key);

        let mut versioned_payload = vec![P2PKH_VERSION];
        versioned_payload.extend_from_slice(&pubkey_hash);

        // Double SHA256 for checksum
        let checksum = Sha256::digest(Sha256::digest(&versioned_payload));
        versioned_payload.extend_from_slice(&checksum[0..4]);

        bs58::encode(&versioned_payload).into_string()
    }

    /// HASH160 of the compressed public key
    pub fn pubkey_hash(public_key: &PublicKey) -> [u8; 20] {
        let sha256_hash = Sha256::digest(public_key.serialize());
        Ripemd160::digest(sha256_hash).into()
    }

    /// Validate address format and checksum
    pub fn validate(address: &str) -> bool {
        Self::decode_payload(address).is_ok()
    }

    fn decode_payload(address: &str) -> Result<[u8; 20], WalletError> {
        let decoded = bs58::decode(address).into_vec().map_err(|e| WalletError::InvalidAddress(format!("Base58 decode error: {}", e)))?;

        // version + payload + checksum
        if decoded.len() != 25 {
            return Err(WalletError::InvalidAddress(format!("expected 25 bytes, got {}", decoded.len())));
        }
        if decoded[0] != P2PKH_VERSION {
            return Err(WalletError::InvalidAddress(format!("unknown version byte {:#04x}", decoded[0])));
        }
        let checksum = Sha256::digest(Sha256::digest(&decoded[..21]));
        if checksum[..4] != decoded[21..] {
            return Err(WalletError::InvalidAddress("checksum mismatch".to_string()));
        }

        let mut payload = [0u8; 20];
        payload.copy_from_slice(&decoded[1..21]);
        Ok(payload)
    }

    /// P2PKH script paying the given public key hash
    pub fn p2pkh_script(pubkey_hash: &[u8; 20]) -> ScriptPublicKey {
        let mut script = vec![0x76, 0xa9, 0x14]; // OP_DUP OP_HASH160 PUSH(20)
        script.extend_from_slice(pubkey_hash);
        script.extend_from_slice(&[0x88, 0xac]); // OP_EQUALVERIFY OP_CHECKSIG
        ScriptPublicKey::from_vec(0, script)
    }

    /// Get script public key for address
    pub fn to_script_pub_key(address: &str) -> Result<ScriptPublicKey, WalletError> {
        let payload = Self::decode_payload(address)?;
        Ok(Self::p2pkh_script(&payload))
    }

    /// Get address from script public key
    pub fn from_script_pub_key(script: &ScriptPublicKey) -> Result<String, WalletError> {
        let script_bytes = script.script();
        if script_bytes.len() == 25 &&
           script_bytes[0] == 0x76 && // OP_DUP
           script_bytes[1] == 0xa9 && // OP_HASH160
           script_bytes[2] == 0x14 && // PUSH(20)
           script_bytes[23] == 0x88 && // OP_EQUALVERIFY
           script_bytes[24] == 0xac { // OP_CHECKSIG

            let mut versioned_payload = vec![P2PKH_VERSION];
            versioned_payload.extend_from_slice(&script_bytes[3..23]);

            let checksum = Sha256::digest(Sha256::digest(&versioned_payload));
            versioned_payload.extend_from_slice(&checksum[0..4]);

            Ok(bs58::encode(&versioned_payload).into_string())
        } else {
            Err(WalletError::InvalidAddress("Not a standard P2PKH script".to_string()))
        }
    }
}
