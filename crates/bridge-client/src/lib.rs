//! # `rollup-deposit-bridge-client`
//!
//! Access to the two ledgers of the rollup and the deposit-specific capability built on top of
//! them.
//!
//! - [`chain::ChainClient`] talks to one ledger: balances, receipts, head height and plain
//!   transfers.
//! - [`bridge::BridgeClient`] is the capability the deposit orchestrator consumes: submit a
//!   native-asset deposit, wait for its confirmation, query the relay status of the resulting
//!   cross-domain message and take balance snapshots.
//! - [`bridge::OpBridgeClient`] implements [`bridge::BridgeClient`] for an OP-stack rollup.

pub mod bridge;
pub mod chain;
pub mod config;
mod constants;
mod contracts;
pub mod deposit_tx;
pub mod errors;
