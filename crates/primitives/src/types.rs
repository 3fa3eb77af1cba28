//! Value types that flow between the setup, the bridge client and the orchestrator.

use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};

/// Identifies one ledger the system talks to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerEndpoint {
    rpc_url: String,
    chain_id: u64,
}

impl LedgerEndpoint {
    /// Creates a new endpoint.
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
        }
    }

    /// The JSON-RPC address of the ledger.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// The chain id the ledger is expected to report.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// A request to move `amount` wei from `source_account` on the source ledger to
/// `destination_account` on the destination ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepositRequest {
    amount: U256,
    source_account: Address,
    destination_account: Address,
}

impl DepositRequest {
    /// Creates a new request.
    pub const fn new(amount: U256, source_account: Address, destination_account: Address) -> Self {
        Self {
            amount,
            source_account,
            destination_account,
        }
    }

    /// Creates a request that deposits into the same account on the destination ledger.
    pub const fn to_self(amount: U256, account: Address) -> Self {
        Self::new(amount, account, account)
    }

    /// The amount to deposit, in wei.
    pub const fn amount(&self) -> U256 {
        self.amount
    }

    /// The account debited on the source ledger.
    pub const fn source_account(&self) -> Address {
        self.source_account
    }

    /// The account credited on the destination ledger.
    pub const fn destination_account(&self) -> Address {
        self.destination_account
    }
}

/// The result of submitting a deposit; the only key used to look up its relay status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepositHandle {
    source_tx: TxHash,
    submitted_at: DateTime<Utc>,
}

impl DepositHandle {
    /// Creates a new handle.
    pub const fn new(source_tx: TxHash, submitted_at: DateTime<Utc>) -> Self {
        Self {
            source_tx,
            submitted_at,
        }
    }

    /// The hash of the deposit transaction on the source ledger.
    pub const fn source_tx(&self) -> TxHash {
        self.source_tx
    }

    /// When the deposit transaction was broadcast.
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// The balances of the depositing accounts on both ledgers at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceSnapshot {
    source_balance: U256,
    destination_balance: U256,
    taken_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    /// Creates a new snapshot.
    pub const fn new(
        source_balance: U256,
        destination_balance: U256,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_balance,
            destination_balance,
            taken_at,
        }
    }

    /// Balance of the source account, in wei.
    pub const fn source_balance(&self) -> U256 {
        self.source_balance
    }

    /// Balance of the destination account, in wei.
    pub const fn destination_balance(&self) -> U256 {
        self.destination_balance
    }

    /// When the snapshot was taken.
    pub const fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}
