//! Shared primitives for the JIO node: hashes, scripts, headers and the
//! in-memory chain both block producers extend.

pub mod chain;
pub mod constants;
pub mod errors;
pub mod hash;
pub mod header;
pub mod script;

pub use chain::{Chain, ChainTip};
pub use errors::ConsensusError;
pub use hash::{double_sha256, Hash, ZERO_HASH};
pub use header::{BlockKind, Header};
pub use script::{ScriptPublicKey, ScriptVec};
