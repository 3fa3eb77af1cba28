//! Observable progress of a deposit run.

use std::time::Duration;

use rollup_deposit_primitives::{
    status::MessageStatus,
    types::{BalanceSnapshot, DepositHandle},
};

/// A point of progress recorded by a run, in the order it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkpoint {
    /// Balances before anything was submitted.
    BalancesBefore(BalanceSnapshot),

    /// The deposit transaction was broadcast.
    Submitted(DepositHandle),

    /// The deposit transaction became final on the source ledger.
    SourceConfirmed {
        /// Time since submission.
        elapsed: Duration,
    },

    /// A status read returned a status further along than any seen before.
    StatusAdvanced {
        /// The new status.
        status: MessageStatus,
        /// Number of status reads issued so far, including this one.
        polls: u32,
        /// Time since submission.
        elapsed: Duration,
    },

    /// Balances after the message was relayed.
    BalancesAfter(BalanceSnapshot),

    /// The run succeeded.
    Completed {
        /// Time from submission to the final balance snapshot.
        elapsed: Duration,
    },
}
