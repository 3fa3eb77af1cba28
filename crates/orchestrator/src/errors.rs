//! Error types for the orchestrator crate.

use std::{fmt, time::Duration};

use rollup_deposit_bridge_client::errors::{
    BalanceError, QueryError, SourceConfirmationError, SubmissionError,
};
use rollup_deposit_primitives::{registry::MissingContract, status::MessageStatus};
use thiserror::Error;

/// The single failure outcome of a deposit run.
///
/// Every variant is terminal: nothing that already completed is retried.
#[derive(Debug, Clone, Error)]
pub enum DepositError {
    /// A registry entry or input needed for the run is missing or invalid.
    #[error("{0}")]
    Configuration(String),

    /// The source ledger refused the deposit.
    #[error(transparent)]
    Submission(SubmissionError),

    /// The deposit transaction failed on the source ledger or the connection was lost.
    #[error(transparent)]
    SourceConfirmation(#[from] SourceConfirmationError),

    /// The deposit transaction was not final within the confirmation timeout.
    #[error("source transaction not final after {0:?}")]
    SourceConfirmationTimeout(Duration),

    /// Status reads kept failing with transport errors.
    #[error("{failures} consecutive status reads failed, last: {last}")]
    TransientQuery {
        /// Number of consecutive failures.
        failures: u32,
        /// The last failure.
        last: QueryError,
    },

    /// A status read failed in a way that repeating it cannot fix.
    #[error(transparent)]
    Query(QueryError),

    /// The message was not relayed before the relay deadline.
    #[error("message not relayed within {deadline:?}, last status {last_status}")]
    RelayTimeout {
        /// The configured relay deadline.
        deadline: Duration,
        /// The furthest status observed.
        last_status: MessageStatus,
    },

    /// A balance snapshot could not be taken.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// The run was cancelled from outside.
    #[error("deposit run cancelled")]
    Cancelled,
}

impl From<MissingContract> for DepositError {
    fn from(e: MissingContract) -> Self {
        DepositError::Configuration(e.to_string())
    }
}

impl From<SubmissionError> for DepositError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::MissingContract(missing) => missing.into(),
            other => DepositError::Submission(other),
        }
    }
}

impl From<QueryError> for DepositError {
    /// Classifies a status read failure that is not retried.
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::MissingContract(missing) => missing.into(),
            other => DepositError::Query(other),
        }
    }
}

impl DepositError {
    /// The category of this error.
    pub const fn kind(&self) -> DepositErrorKind {
        match self {
            DepositError::Configuration(_) => DepositErrorKind::Configuration,
            DepositError::Submission(_) => DepositErrorKind::Submission,
            DepositError::SourceConfirmation(_) | DepositError::SourceConfirmationTimeout(_) => {
                DepositErrorKind::SourceConfirmation
            }
            DepositError::TransientQuery { .. } => DepositErrorKind::TransientQuery,
            DepositError::Query(_) => DepositErrorKind::Query,
            DepositError::RelayTimeout { .. } => DepositErrorKind::RelayTimeout,
            DepositError::Balance(_) => DepositErrorKind::Balance,
            DepositError::Cancelled => DepositErrorKind::Cancelled,
        }
    }
}

/// Stable category of a [`DepositError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepositErrorKind {
    /// See [`DepositError::Configuration`].
    Configuration,
    /// See [`DepositError::Submission`].
    Submission,
    /// See [`DepositError::SourceConfirmation`] and [`DepositError::SourceConfirmationTimeout`].
    SourceConfirmation,
    /// See [`DepositError::TransientQuery`].
    TransientQuery,
    /// See [`DepositError::Query`].
    Query,
    /// See [`DepositError::RelayTimeout`].
    RelayTimeout,
    /// See [`DepositError::Balance`].
    Balance,
    /// See [`DepositError::Cancelled`].
    Cancelled,
}

impl DepositErrorKind {
    /// The name printed by the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DepositErrorKind::Configuration => "ConfigurationError",
            DepositErrorKind::Submission => "SubmissionError",
            DepositErrorKind::SourceConfirmation => "SourceConfirmationError",
            DepositErrorKind::TransientQuery => "TransientQueryError",
            DepositErrorKind::Query => "QueryError",
            DepositErrorKind::RelayTimeout => "RelayTimeoutError",
            DepositErrorKind::Balance => "BalanceError",
            DepositErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for DepositErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rollup_deposit_bridge_client::errors::ChainError;
    use rollup_deposit_primitives::registry::ContractName;

    use super::*;

    #[test]
    fn placeholder_contracts_are_configuration_errors() {
        let missing = MissingContract(ContractName::OptimismPortal);

        let from_query = DepositError::from(QueryError::MissingContract(missing));
        assert_eq!(from_query.kind(), DepositErrorKind::Configuration);

        let from_submit = DepositError::from(SubmissionError::MissingContract(missing));
        assert_eq!(from_submit.kind(), DepositErrorKind::Configuration);
    }

    #[test]
    fn ledger_failures_keep_their_kind() {
        let rejected = DepositError::from(SubmissionError::Rejected("nonce too low".into()));
        assert_eq!(rejected.kind(), DepositErrorKind::Submission);

        let malformed = DepositError::from(QueryError::MalformedDeposit("short".into()));
        assert_eq!(malformed.kind(), DepositErrorKind::Query);

        let balance = DepositError::from(BalanceError::Source(ChainError::Rpc("down".into())));
        assert_eq!(balance.kind(), DepositErrorKind::Balance);
        assert_eq!(balance.kind().to_string(), "BalanceError");
    }
}
