//! Drives a single native-asset deposit from the source ledger to the rollup.
//!
//! - [`orchestrator::DepositOrchestrator`] runs the lifecycle: snapshot balances, submit, wait
//!   for source finality, poll the relay status until the message is relayed, snapshot again.
//! - [`policy::DepositPolicy`] bounds every wait of a run.
//! - [`checkpoint::Checkpoint`]s record the progress of a run and [`report::Reporter`] renders
//!   them for humans.

pub mod checkpoint;
mod constants;
pub mod errors;
pub mod orchestrator;
pub mod policy;
pub mod report;
pub mod state;

#[cfg(test)]
mod testing;
