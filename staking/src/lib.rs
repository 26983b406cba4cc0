//! Proof-of-stake minting.
//!
//! [`PosMinting`] keeps one staker actor per wallet. Each actor periodically
//! evaluates the stake kernel against the shared chain tip and appends a
//! proof-of-stake header when it hits. [`StakingFeature`] owns the pieces the
//! engine is built from and activates it on first use.

pub mod actor;
pub mod credential;
pub mod engine;
pub mod error;
pub mod feature;
pub mod info;
pub mod kernel;
pub mod settings;

pub use credential::Credential;
pub use engine::PosMinting;
pub use error::StakingError;
pub use feature::StakingFeature;
pub use info::{StakerStatus, StakingInfo};
pub use kernel::StakeKernel;
pub use settings::StakingSettings;
