//! The lifecycle of a single deposit as seen by the orchestrator.

use std::fmt;

use rollup_deposit_primitives::status::MessageStatus;

/// Where a deposit run stands.
///
/// The derived ordering follows the lifecycle: `Unsubmitted` precedes every status of a
/// submitted deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DepositPhase {
    /// Nothing has been broadcast yet.
    #[default]
    Unsubmitted,

    /// The deposit transaction was broadcast; its message is in the given status.
    Submitted(MessageStatus),
}

impl DepositPhase {
    /// Moves to `status` if that is strictly further along the lifecycle.
    ///
    /// Returns whether the phase changed. Equal or earlier statuses carry no new information and
    /// leave the phase untouched.
    pub fn advance(&mut self, status: MessageStatus) -> bool {
        let next = Self::Submitted(status);
        if next > *self {
            *self = next;
            true
        } else {
            false
        }
    }

    /// The message status, if the deposit was submitted.
    pub const fn status(&self) -> Option<MessageStatus> {
        match self {
            Self::Unsubmitted => None,
            Self::Submitted(status) => Some(*status),
        }
    }

    /// Whether the run reached its single terminal success state.
    pub fn is_relayed(&self) -> bool {
        self.status().is_some_and(|status| status.is_relayed())
    }
}

impl fmt::Display for DepositPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsubmitted => write!(f, "UNSUBMITTED"),
            Self::Submitted(status) => write!(f, "{status}"),
        }
    }
}
