//! Configuration for the OP-stack bridge client.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MIN_GAS_LIMIT, DEFAULT_RECEIPT_POLL_INTERVAL, DEFAULT_SOURCE_FINALITY_DEPTH,
};

/// Tunables of [`crate::bridge::OpBridgeClient`].
///
/// You should construct a [`BridgeClientConfig`] with [`Default::default`] and modify it with the
/// member methods on this struct. Every field may be omitted when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeClientConfig {
    /// Number of blocks the source transaction must be buried under to be considered final,
    /// defaults to [`DEFAULT_SOURCE_FINALITY_DEPTH`].
    pub(crate) source_finality_depth: u64,

    /// Interval between receipt reads while waiting for source confirmation.
    pub(crate) receipt_poll_interval: Duration,

    /// Gas limit requested for the execution of the deposit on the destination ledger.
    pub(crate) min_gas_limit: u32,
}

impl BridgeClientConfig {
    /// Updates the finality depth and returns the updated config.
    ///
    /// A depth of 0 is treated like 1: a transaction cannot be final before it is included.
    pub fn with_source_finality_depth(mut self, depth: u64) -> Self {
        self.source_finality_depth = depth.max(1);
        self
    }

    /// Updates the receipt poll interval and returns the updated config.
    pub const fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }

    /// Updates the destination gas limit and returns the updated config.
    pub const fn with_min_gas_limit(mut self, gas: u32) -> Self {
        self.min_gas_limit = gas;
        self
    }

    /// Returns the configured finality depth, never less than 1.
    pub fn source_finality_depth(&self) -> u64 {
        self.source_finality_depth.max(1)
    }

    /// Returns the configured receipt poll interval.
    pub const fn receipt_poll_interval(&self) -> Duration {
        self.receipt_poll_interval
    }

    /// Returns the configured destination gas limit.
    pub const fn min_gas_limit(&self) -> u32 {
        self.min_gas_limit
    }
}

impl Default for BridgeClientConfig {
    fn default() -> Self {
        Self {
            source_finality_depth: DEFAULT_SOURCE_FINALITY_DEPTH,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            min_gas_limit: DEFAULT_MIN_GAS_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: BridgeClientConfig = toml::from_str("source_finality_depth = 3").unwrap();
        assert_eq!(config.source_finality_depth(), 3);
        assert_eq!(config.min_gas_limit(), DEFAULT_MIN_GAS_LIMIT);
        assert_eq!(config.receipt_poll_interval(), DEFAULT_RECEIPT_POLL_INTERVAL);
    }

    #[test]
    fn zero_depth_is_clamped() {
        let config = BridgeClientConfig::default().with_source_finality_depth(0);
        assert_eq!(config.source_finality_depth(), 1);

        let parsed: BridgeClientConfig = toml::from_str("source_finality_depth = 0").unwrap();
        assert_eq!(parsed.source_finality_depth(), 1);
    }
}
