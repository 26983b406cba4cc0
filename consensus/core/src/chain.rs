//! In-memory header chain shared by the PoW and PoS block producers.
//!
//! Both producers build on the current tip and race to append; `append`
//! rejects a header whose parent is no longer the tip, so the loser rebuilds
//! on the new tip.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::errors::ConsensusError;
use crate::hash::Hash;
use crate::header::{BlockKind, Header};

/// Snapshot of the chain tip a new block is built on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainTip {
    pub hash: Hash,
    pub height: u64,
    pub timestamp: u64,
    pub bits: u32,
}

#[derive(Default)]
struct ChainInner {
    headers: Vec<Header>,
    hashes: Vec<Hash>,
    index: HashMap<Hash, usize>,
}

pub struct Chain {
    inner: RwLock<ChainInner>,
}

impl Chain {
    /// Creates a chain holding only the genesis header
    pub fn new() -> Self {
        Self::with_genesis(Header::genesis())
    }

    pub fn with_genesis(genesis: Header) -> Self {
        let hash = genesis.hash();
        let mut inner = ChainInner::default();
        inner.index.insert(hash, 0);
        inner.hashes.push(hash);
        inner.headers.push(genesis);
        Self { inner: RwLock::new(inner) }
    }

    pub fn tip(&self) -> ChainTip {
        let inner = self.inner.read();
        let last = inner.headers.len() - 1;
        let header = &inner.headers[last];
        ChainTip { hash: inner.hashes[last], height: header.height, timestamp: header.timestamp, bits: header.bits }
    }

    /// Appends a header on top of the current tip and returns its hash
    pub fn append(&self, header: Header) -> Result<Hash, ConsensusError> {
        let hash = header.hash();
        let mut inner = self.inner.write();
        let tip = inner.hashes[inner.hashes.len() - 1];
        if header.parent != tip {
            return Err(ConsensusError::NotExtendingTip { child: hash, tip });
        }
        let position = inner.headers.len();
        inner.index.insert(hash, position);
        inner.hashes.push(hash);
        inner.headers.push(header);
        Ok(hash)
    }

    pub fn get(&self, hash: &Hash) -> Option<Header> {
        let inner = self.inner.read();
        inner.index.get(hash).map(|&i| inner.headers[i].clone())
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.read().index.contains_key(hash)
    }

    /// Height of the tip (genesis is height 0)
    pub fn height(&self) -> u64 {
        self.tip().height
    }

    /// Number of non-genesis blocks produced by the given subsystem
    pub fn count_of_kind(&self, kind: BlockKind) -> u64 {
        self.inner.read().headers.iter().skip(1).filter(|h| h.kind == kind).count() as u64
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEVNET_BITS;
    use crate::script::ScriptPublicKey;

    fn child_of(tip: &ChainTip, kind: BlockKind) -> Header {
        Header::new(kind, tip.hash, tip.height + 1, tip.timestamp + 1, DEVNET_BITS, ScriptPublicKey::from_vec(0, vec![0xac]))
    }

    #[test]
    fn test_append_extends_tip() {
        let chain = Chain::new();
        let header = child_of(&chain.tip(), BlockKind::ProofOfWork);
        let hash = chain.append(header).unwrap();
        assert_eq!(chain.tip().hash, hash);
        assert_eq!(chain.height(), 1);
        assert!(chain.contains(&hash));
    }

    #[test]
    fn test_stale_parent_is_rejected() {
        let chain = Chain::new();
        let genesis_tip = chain.tip();
        chain.append(child_of(&genesis_tip, BlockKind::ProofOfWork)).unwrap();
        let stale = child_of(&genesis_tip, BlockKind::ProofOfStake);
        assert!(matches!(chain.append(stale), Err(ConsensusError::NotExtendingTip { .. })));
        assert_eq!(chain.height(), 1);
    }

    #[test]
    fn test_count_of_kind_skips_genesis() {
        let chain = Chain::new();
        chain.append(child_of(&chain.tip(), BlockKind::ProofOfStake)).unwrap();
        assert_eq!(chain.count_of_kind(BlockKind::ProofOfStake), 1);
        assert_eq!(chain.count_of_kind(BlockKind::ProofOfWork), 0);
    }
}
