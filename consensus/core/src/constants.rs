/// Current block version
pub const BLOCK_VERSION: u16 = 1;

/// Reward paid to the coinbase script of each produced block (in sompi)
pub const BLOCK_REWARD: u64 = 50 * 100_000_000;

/// Easiest compact target accepted on the development network
pub const DEVNET_BITS: u32 = 0x207f_ffff;

/// Timestamp of the genesis header (milliseconds)
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000_000;
