//! The relay status of a cross-domain message.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The observable lifecycle of a deposit's cross-domain message.
///
/// The variants are declared in lifecycle order so the derived [`Ord`] is the progress order: a
/// status that compares greater carries strictly more information than a lesser one.
///
/// There is no failure variant. A message that is never relayed simply never reaches
/// [`MessageStatus::Relayed`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    /// The source transaction has been broadcast but is not included in a block yet.
    SourcePending,

    /// The source transaction is included but not yet buried under the finality depth.
    SourceConfirmed,

    /// The source transaction is final and the destination ledger has not derived the message.
    DestPending,

    /// The message has been derived into the destination ledger but its execution did not relay
    /// it.
    DestIncluded,

    /// The message has been executed on the destination ledger.
    Relayed,
}

impl MessageStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [MessageStatus; 5] = [
        MessageStatus::SourcePending,
        MessageStatus::SourceConfirmed,
        MessageStatus::DestPending,
        MessageStatus::DestIncluded,
        MessageStatus::Relayed,
    ];

    /// Whether this is the terminal success status.
    pub const fn is_relayed(&self) -> bool {
        matches!(self, MessageStatus::Relayed)
    }
}

impl Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status_str = match self {
            MessageStatus::SourcePending => "SOURCE_PENDING",
            MessageStatus::SourceConfirmed => "SOURCE_CONFIRMED",
            MessageStatus::DestPending => "DEST_PENDING",
            MessageStatus::DestIncluded => "DEST_INCLUDED",
            MessageStatus::Relayed => "RELAYED",
        };
        write!(f, "{status_str}")
    }
}
