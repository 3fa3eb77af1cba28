pub(crate) const DEFAULT_L1_URL: &str = "http://localhost:8545";

pub(crate) const DEFAULT_L2_URL: &str = "http://localhost:8547";

pub(crate) const DEFAULT_L1_CHAIN_ID: u64 = 2023;

pub(crate) const DEFAULT_L2_CHAIN_ID: u64 = 2320;

/// Whole units deposited when no amount is given.
pub(crate) const DEFAULT_DEPOSIT_UNITS: u64 = 1;

pub(crate) const DEFAULT_ADDRESSES_DIR: &str = "L2/optimism/remote/bridge/";
