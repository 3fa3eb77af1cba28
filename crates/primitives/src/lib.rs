//! This crate contains the types and pure functions shared by the deposit crates: ledger
//! endpoints, the contract registry, deposit requests and handles, the relay status of a
//! cross-domain message and balance snapshots.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it does not depend on any
//! other crate in this workspace.

pub mod constants;
pub mod registry;
pub mod status;
pub mod types;
pub mod units;
