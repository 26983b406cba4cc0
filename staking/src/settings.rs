use std::time::Duration;

use crate::error::StakingError;

/// Roughly the PoW devnet target divided by 128
pub const DEFAULT_STAKE_BITS: u32 = 0x2000ffff;

/// Parameters every staker actor runs with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakingSettings {
    /// Time between two kernel evaluations
    pub search_interval: Duration,
    /// Stake weight credited to each staking wallet
    pub weight: u64,
    /// Compact bits of the kernel target before weight scaling
    pub bits: u32,
}

impl Default for StakingSettings {
    fn default() -> Self {
        Self { search_interval: Duration::from_millis(1000), weight: 1, bits: DEFAULT_STAKE_BITS }
    }
}

impl StakingSettings {
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.search_interval.is_zero() {
            return Err(StakingError::InvalidSettings("search interval must be positive".to_string()));
        }
        if self.weight == 0 {
            return Err(StakingError::InvalidSettings("weight must be positive".to_string()));
        }
        Ok(())
    }
}
