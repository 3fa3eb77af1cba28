//! Constants of the OP-stack rollup that do not change between deployments.

use alloy::primitives::{address, Address};

/// Predeployed address of the `L2CrossDomainMessenger` on the destination ledger.
pub const L2_CROSS_DOMAIN_MESSENGER: Address =
    address!("4200000000000000000000000000000000000007");

/// Number of wei in one whole unit of the native asset.
pub const WEI_PER_UNIT: u128 = 1_000_000_000_000_000_000;

/// Number of decimal digits dropped when showing a wei amount in Gwei.
pub const GWEI_DECIMALS: usize = 9;
