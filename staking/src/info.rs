use serde::{Deserialize, Serialize};

use crate::kernel::StakeKernel;
use crate::settings::StakingSettings;

/// Status reported by one staker actor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakerStatus {
    pub wallet: String,
    pub staking: bool,
    pub blocks_staked: u64,
    /// Serialized size of the last assembled header
    pub last_block_size: u64,
    pub last_error: Option<String>,
}

/// Staking status snapshot returned by `getstakinginfo`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingInfo {
    pub enabled: bool,
    pub staking: bool,
    pub errors: String,
    pub current_block_size: u64,
    pub current_block_tx: u64,
    pub pooled_tx: u64,
    pub difficulty: f64,
    /// Milliseconds between kernel evaluations
    pub search_interval: u64,
    pub weight: u64,
    pub net_stake_weight: u64,
    /// Expected seconds until the next staked block, zero when not staking
    pub expected_time: u64,
    pub stakers: u64,
    pub blocks_staked: u64,
}

impl StakingInfo {
    /// Builds the snapshot of an active engine from its stakers' reports
    pub fn aggregate(settings: &StakingSettings, statuses: &[StakerStatus]) -> Self {
        let active = statuses.iter().filter(|s| s.staking).count() as u64;
        let weight = active.saturating_mul(settings.weight);
        let errors = statuses
            .iter()
            .filter_map(|s| s.last_error.as_ref().map(|e| format!("{}: {}", s.wallet, e)))
            .collect::<Vec<_>>()
            .join("; ");
        let current_block_size = statuses.iter().map(|s| s.last_block_size).max().unwrap_or(0);

        Self {
            enabled: true,
            staking: active > 0,
            errors,
            current_block_size,
            current_block_tx: u64::from(current_block_size > 0),
            pooled_tx: 0,
            difficulty: StakeKernel::new(settings.bits, 1).difficulty(),
            search_interval: settings.search_interval.as_millis() as u64,
            weight,
            net_stake_weight: weight,
            expected_time: expected_time(settings, weight),
            stakers: statuses.len() as u64,
            blocks_staked: statuses.iter().map(|s| s.blocks_staked).sum(),
        }
    }
}

fn expected_time(settings: &StakingSettings, weight: u64) -> u64 {
    if weight == 0 {
        return 0;
    }
    let probability = StakeKernel::new(settings.bits, weight).hit_probability();
    if probability <= 0.0 {
        return u64::MAX;
    }
    // float to int casts saturate
    (settings.search_interval.as_secs_f64() / probability) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(wallet: &str, staking: bool, blocks: u64, error: Option<&str>) -> StakerStatus {
        StakerStatus {
            wallet: wallet.to_string(),
            staking,
            blocks_staked: blocks,
            last_block_size: if blocks > 0 { 120 } else { 0 },
            last_error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_default_is_zero_value() {
        let info = StakingInfo::default();
        assert!(!info.enabled);
        assert!(!info.staking);
        assert_eq!(info.current_block_size, 0);
        assert_eq!(info.blocks_staked, 0);
        assert!(info.errors.is_empty());
    }

    #[test]
    fn test_aggregate_sums_stakers() {
        let settings = StakingSettings { weight: 3, ..Default::default() };
        let statuses = vec![status("a", true, 2, None), status("b", false, 1, Some("wallet has no account"))];
        let info = StakingInfo::aggregate(&settings, &statuses);

        assert!(info.enabled);
        assert!(info.staking);
        assert_eq!(info.stakers, 2);
        assert_eq!(info.blocks_staked, 3);
        assert_eq!(info.weight, 3);
        assert_eq!(info.current_block_size, 120);
        assert_eq!(info.current_block_tx, 1);
        assert_eq!(info.search_interval, 1000);
        assert_eq!(info.errors, "b: wallet has no account");
        assert!(info.expected_time > 0);
    }

    #[test]
    fn test_aggregate_without_active_stakers() {
        let info = StakingInfo::aggregate(&StakingSettings::default(), &[status("a", false, 0, None)]);
        assert!(info.enabled);
        assert!(!info.staking);
        assert_eq!(info.weight, 0);
        assert_eq!(info.expected_time, 0);
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let json = serde_json::to_value(StakingInfo::default()).unwrap();
        for key in ["currentBlockSize", "currentBlockTx", "pooledTx", "searchInterval", "netStakeWeight", "expectedTime", "blocksStaked"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
