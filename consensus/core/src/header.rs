use serde::{Deserialize, Serialize};

use crate::constants::{BLOCK_REWARD, BLOCK_VERSION, DEVNET_BITS, GENESIS_TIMESTAMP};
use crate::hash::{double_sha256, Hash, ZERO_HASH};
use crate::script::ScriptPublicKey;

/// Which subsystem produced a block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    ProofOfWork,
    ProofOfStake,
}

impl BlockKind {
    fn tag(self) -> u8 {
        match self {
            BlockKind::ProofOfWork => 0,
            BlockKind::ProofOfStake => 1,
        }
    }
}

/// Block header. The coinbase script is committed directly in the header, the
/// node does not carry transaction bodies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub version: u16,
    pub kind: BlockKind,
    pub parent: Hash,
    pub height: u64,
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
    pub coinbase_value: u64,
    pub coinbase: ScriptPublicKey,
}

impl Header {
    pub fn new(kind: BlockKind, parent: Hash, height: u64, timestamp: u64, bits: u32, coinbase: ScriptPublicKey) -> Self {
        Self { version: BLOCK_VERSION, kind, parent, height, timestamp, bits, nonce: 0, coinbase_value: BLOCK_REWARD, coinbase }
    }

    /// Deterministic genesis header shared by every node of a network
    pub fn genesis() -> Self {
        Self {
            version: BLOCK_VERSION,
            kind: BlockKind::ProofOfWork,
            parent: ZERO_HASH,
            height: 0,
            timestamp: GENESIS_TIMESTAMP,
            bits: DEVNET_BITS,
            nonce: 0,
            coinbase_value: 0,
            coinbase: ScriptPublicKey::default(),
        }
    }

    /// Serialization of every field except the nonce
    ///
    /// Format: version || kind || parent || height || timestamp || bits || coinbase_value || coinbase
    pub fn pre_pow_bytes(&self) -> Vec<u8> {
        let coinbase = self.coinbase.to_bytes();
        let mut bytes = Vec::with_capacity(2 + 1 + 32 + 8 + 8 + 4 + 8 + coinbase.len());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.push(self.kind.tag());
        bytes.extend_from_slice(self.parent.as_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&self.bits.to_le_bytes());
        bytes.extend_from_slice(&self.coinbase_value.to_le_bytes());
        bytes.extend_from_slice(&coinbase);
        bytes
    }

    /// Full header serialization with the given nonce appended
    pub fn bytes_with_nonce(&self, nonce: u64) -> Vec<u8> {
        let mut bytes = self.pre_pow_bytes();
        bytes.extend_from_slice(&nonce.to_le_bytes());
        bytes
    }

    /// Header hash (double SHA256 over the full serialization)
    pub fn hash(&self) -> Hash {
        double_sha256(&self.bytes_with_nonce(self.nonce))
    }
}
