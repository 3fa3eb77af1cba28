//! Error types for ledger access and for the deposit capability.

use alloy::{
    primitives::{Address, TxHash, U256},
    transports::{RpcError, TransportErrorKind},
};
use rollup_deposit_primitives::registry::MissingContract;
use thiserror::Error;

/// Failure to talk to one ledger.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// The node answered with an error or could not be reached.
    #[error("rpc: {0}")]
    Rpc(String),

    /// The configured RPC address is not a valid URL.
    #[error("invalid rpc url {url}: {reason}")]
    InvalidUrl {
        /// The offending address.
        url: String,
        /// Why it could not be parsed.
        reason: String,
    },

    /// The node serves a different chain than the one configured.
    #[error("chain id mismatch: expected {expected}, node reports {actual}")]
    ChainIdMismatch {
        /// The configured chain id.
        expected: u64,
        /// The chain id reported by the node.
        actual: u64,
    },
}

impl From<RpcError<TransportErrorKind>> for ChainError {
    fn from(e: RpcError<TransportErrorKind>) -> Self {
        ChainError::Rpc(e.to_string())
    }
}

/// Failure to submit a deposit. Submission is never retried.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    /// The bridge contract needed for the deposit is a placeholder in the registry.
    #[error(transparent)]
    MissingContract(#[from] MissingContract),

    /// The request debits an account the client cannot sign for.
    #[error("cannot sign for {requested}, the configured signer is {signer}")]
    SignerMismatch {
        /// The account named in the request.
        requested: Address,
        /// The account of the configured signer.
        signer: Address,
    },

    /// The source account cannot pay for the amount plus fees.
    #[error("insufficient funds: balance {balance} wei, required {required} wei")]
    InsufficientFunds {
        /// The balance of the source account.
        balance: U256,
        /// The amount plus the estimated fee.
        required: U256,
    },

    /// The source ledger rejected the transaction (nonce, signature, reverted execution).
    #[error("source ledger rejected the deposit: {0}")]
    Rejected(String),

    /// The source ledger could not be reached.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Failure while waiting for the deposit transaction to become final.
#[derive(Debug, Clone, Error)]
pub enum SourceConfirmationError {
    /// The deposit transaction was included but its execution reverted.
    #[error("source transaction {0} reverted")]
    Reverted(TxHash),

    /// The connection to the source ledger failed before the transaction was final.
    #[error("lost connection to the source ledger: {0}")]
    ConnectionLost(ChainError),
}

/// Failure of a single relay status read.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Transport failure; the read may succeed if repeated.
    #[error("transport failure: {0}")]
    Transport(#[from] ChainError),

    /// A contract needed to derive the message is a placeholder in the registry.
    #[error(transparent)]
    MissingContract(#[from] MissingContract),

    /// The source transaction reverted, so no message exists.
    #[error("source transaction {0} reverted")]
    SourceReverted(TxHash),

    /// The source transaction emitted no deposit event.
    #[error("source transaction {0} carries no deposit event")]
    NoDepositEvent(TxHash),

    /// The deposit event could not be decoded.
    #[error("malformed deposit event: {0}")]
    MalformedDeposit(String),
}

impl QueryError {
    /// Whether repeating the read could produce a different result.
    pub const fn is_transient(&self) -> bool {
        matches!(self, QueryError::Transport(_))
    }
}

/// Failure to take a balance snapshot, naming the ledger that failed.
#[derive(Debug, Clone, Error)]
pub enum BalanceError {
    /// The source ledger read failed.
    #[error("source balance unavailable: {0}")]
    Source(ChainError),

    /// The destination ledger read failed.
    #[error("destination balance unavailable: {0}")]
    Destination(ChainError),

    /// Both reads failed.
    #[error(
        "source balance unavailable: {source_ledger}; destination balance unavailable: \
         {destination_ledger}"
    )]
    Both {
        /// The source ledger failure.
        source_ledger: ChainError,
        /// The destination ledger failure.
        destination_ledger: ChainError,
    },
}

/// Failure of a plain native-asset transfer.
#[derive(Debug, Clone, Error)]
pub enum TransferError {
    /// The sender cannot pay for the amount plus fees.
    #[error(
        "insufficient funds: balance {balance} wei, gas price {gas_price} wei, gas {gas}, \
         amount {amount} wei, total cost {total} wei"
    )]
    InsufficientFunds {
        /// The balance of the sender.
        balance: U256,
        /// The gas price used for the transfer.
        gas_price: u128,
        /// The gas limit of the transfer.
        gas: u64,
        /// The transferred amount.
        amount: U256,
        /// The amount plus the maximum fee.
        total: U256,
    },

    /// The ledger rejected the transaction.
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// The ledger could not be reached.
    #[error(transparent)]
    Chain(#[from] ChainError),
}
