//! This module provides the constant values used throughout the crate.

use std::time::Duration;

/// Default number of blocks a source transaction must be buried under to be considered final.
///
/// A depth of 1 means the transaction is final as soon as it is included.
pub(crate) const DEFAULT_SOURCE_FINALITY_DEPTH: u64 = 1;

/// Default interval between receipt reads while waiting for source confirmation.
pub(crate) const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default gas limit requested for the relay of the deposit on the destination ledger.
pub(crate) const DEFAULT_MIN_GAS_LIMIT: u32 = 200_000;

/// Gas used by a plain native-asset transfer.
pub(crate) const NATIVE_TRANSFER_GAS: u64 = 21_000;
