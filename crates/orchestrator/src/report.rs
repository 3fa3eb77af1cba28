//! The result of a deposit run and its rendering for the console.

use std::time::Duration;

use rollup_deposit_primitives::{
    status::MessageStatus,
    types::{BalanceSnapshot, DepositHandle},
    units::format_gwei,
};

use crate::{checkpoint::Checkpoint, errors::DepositError, state::DepositPhase};

/// Everything a run observed, returned whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct DepositReport {
    /// `Ok` if the message was relayed and both balance snapshots were taken.
    pub outcome: Result<(), DepositError>,

    /// The furthest phase the run reached.
    pub final_phase: DepositPhase,

    /// The handle of the submitted deposit, if submission succeeded.
    pub handle: Option<DepositHandle>,

    /// Every checkpoint reached, in order.
    pub checkpoints: Vec<Checkpoint>,

    /// Number of status reads issued, failed reads included.
    pub polls: u32,

    /// Time since submission started; zero if the run ended before that.
    pub elapsed: Duration,
}

impl DepositReport {
    /// Whether the run succeeded.
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The furthest message status observed, if the deposit was submitted.
    pub const fn final_status(&self) -> Option<MessageStatus> {
        self.final_phase.status()
    }

    /// The failure of the run, if any.
    pub fn error(&self) -> Option<&DepositError> {
        self.outcome.as_ref().err()
    }
}

/// Renders snapshots and checkpoints as single console lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter;

impl Reporter {
    /// Balances of both accounts in Gwei.
    pub fn balances(snapshot: &BalanceSnapshot) -> String {
        format!(
            "On L1: {} Gwei    On L2: {} Gwei",
            format_gwei(snapshot.source_balance()),
            format_gwei(snapshot.destination_balance())
        )
    }

    /// Seconds with millisecond precision.
    pub fn seconds(elapsed: Duration) -> String {
        format!("{}.{:03}", elapsed.as_secs(), elapsed.subsec_millis())
    }

    /// One line describing `checkpoint`.
    pub fn checkpoint(checkpoint: &Checkpoint) -> String {
        match checkpoint {
            Checkpoint::BalancesBefore(snapshot) => {
                format!("Balances before deposit: {}", Self::balances(snapshot))
            }
            Checkpoint::Submitted(handle) => {
                format!("Deposit transaction: {}", handle.source_tx())
            }
            Checkpoint::SourceConfirmed { elapsed } => {
                format!(
                    "Deposit final on L1 after {} seconds",
                    Self::seconds(*elapsed)
                )
            }
            Checkpoint::StatusAdvanced {
                status,
                polls,
                elapsed,
            } => format!(
                "Message status {status} after {polls} polls, {} seconds",
                Self::seconds(*elapsed)
            ),
            Checkpoint::BalancesAfter(snapshot) => {
                format!("Balances after deposit: {}", Self::balances(snapshot))
            }
            Checkpoint::Completed { elapsed } => {
                format!("depositETH took {} seconds", Self::seconds(*elapsed))
            }
        }
    }

    /// One line for the error stream describing a failed run.
    pub fn failure(error: &DepositError) -> String {
        format!("Error {}: {error}", error.kind())
    }
}
