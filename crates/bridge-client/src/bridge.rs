//! The deposit capability consumed by the orchestrator, and its OP-stack implementation.

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol_types::SolEvent,
    transports::{RpcError, TransportErrorKind},
};
use async_trait::async_trait;
use chrono::Utc;
use rollup_deposit_primitives::{
    constants::L2_CROSS_DOMAIN_MESSENGER,
    registry::{ContractName, ContractRegistry},
    status::MessageStatus,
    types::{BalanceSnapshot, DepositHandle, DepositRequest},
};
use tracing::{debug, info, warn};

use crate::{
    chain::ChainClient,
    config::BridgeClientConfig,
    contracts::{
        L1StandardBridge,
        L2CrossDomainMessenger::{FailedRelayedMessage, RelayedMessage},
    },
    deposit_tx::DepositTransaction,
    errors::{BalanceError, ChainError, QueryError, SourceConfirmationError, SubmissionError},
};

/// Everything the deposit orchestrator needs from the two ledgers.
///
/// Implementations never retry or block internally except in
/// [`BridgeClient::await_source_confirmation`]; pacing and retries belong to the caller.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Broadcasts the deposit transaction for `request` on the source ledger.
    ///
    /// This has a side effect on the source ledger and must be called at most once per request.
    async fn submit(&self, request: &DepositRequest) -> Result<DepositHandle, SubmissionError>;

    /// Waits until the deposit transaction of `handle` is final on the source ledger.
    async fn await_source_confirmation(
        &self,
        handle: &DepositHandle,
    ) -> Result<(), SourceConfirmationError>;

    /// Reads the current relay status of the cross-domain message of `handle`.
    async fn query_status(&self, handle: &DepositHandle) -> Result<MessageStatus, QueryError>;

    /// Reads the balance of `source_account` on the source ledger and of `destination_account`
    /// on the destination ledger.
    async fn balances(
        &self,
        source_account: Address,
        destination_account: Address,
    ) -> Result<BalanceSnapshot, BalanceError>;
}

/// [`BridgeClient`] for an OP-stack rollup.
///
/// Deposits go through `L1StandardBridge.depositETH`. The relay status is derived from the
/// source receipt, the `TransactionDeposited` event of the `OptimismPortal` and the receipt of
/// the corresponding deposit transaction on the destination ledger.
#[derive(Debug, Clone)]
pub struct OpBridgeClient {
    source: ChainClient,
    destination: ChainClient,
    registry: ContractRegistry,
    config: BridgeClientConfig,
}

impl OpBridgeClient {
    /// Creates a new client from connected ledger clients and the contract registry.
    pub const fn new(
        source: ChainClient,
        destination: ChainClient,
        registry: ContractRegistry,
        config: BridgeClientConfig,
    ) -> Self {
        Self {
            source,
            destination,
            registry,
            config,
        }
    }

    /// The source ledger client.
    pub const fn source(&self) -> &ChainClient {
        &self.source
    }

    /// The destination ledger client.
    pub const fn destination(&self) -> &ChainClient {
        &self.destination
    }

    /// Number of confirmations of a transaction included at `included_at` given the latest
    /// height `head`.
    const fn confirmations(head: u64, included_at: u64) -> u64 {
        head.saturating_sub(included_at) + 1
    }

    /// Whether `receipt` is buried deep enough to be final.
    async fn is_final(&self, receipt: &TransactionReceipt) -> Result<bool, ChainError> {
        let Some(included_at) = receipt.block_number else {
            return Ok(false);
        };
        let head = self.source.block_number().await?;
        Ok(Self::confirmations(head, included_at) >= self.config.source_finality_depth())
    }

    fn deposit_call(&self, bridge: Address, request: &DepositRequest) -> TransactionRequest {
        let contract = L1StandardBridge::new(bridge, self.source.provider().clone());
        let min_gas_limit = self.config.min_gas_limit();

        if request.destination_account() == request.source_account() {
            contract
                .depositETH(min_gas_limit, Bytes::new())
                .from(request.source_account())
                .value(request.amount())
                .into_transaction_request()
        } else {
            contract
                .depositETHTo(request.destination_account(), min_gas_limit, Bytes::new())
                .from(request.source_account())
                .value(request.amount())
                .into_transaction_request()
        }
    }
}

/// Separates ledger rejections from transport failures.
fn classify_submission_error(e: RpcError<TransportErrorKind>) -> SubmissionError {
    match e {
        RpcError::ErrorResp(payload) => SubmissionError::Rejected(payload.to_string()),
        other => SubmissionError::Chain(other.into()),
    }
}

/// Whether the destination receipt shows the message executed by the messenger.
fn relayed_by_messenger(receipt: &TransactionReceipt) -> bool {
    receipt.inner.logs().iter().any(|log| {
        log.inner.address == L2_CROSS_DOMAIN_MESSENGER
            && log.inner.data.topics().first() == Some(&RelayedMessage::SIGNATURE_HASH)
    })
}

fn relay_failed(receipt: &TransactionReceipt) -> bool {
    receipt.inner.logs().iter().any(|log| {
        log.inner.address == L2_CROSS_DOMAIN_MESSENGER
            && log.inner.data.topics().first() == Some(&FailedRelayedMessage::SIGNATURE_HASH)
    })
}

#[async_trait]
impl BridgeClient for OpBridgeClient {
    async fn submit(&self, request: &DepositRequest) -> Result<DepositHandle, SubmissionError> {
        let bridge = self.registry.require(ContractName::L1StandardBridge)?;

        let signer = self.source.signer_address();
        if request.source_account() != signer {
            return Err(SubmissionError::SignerMismatch {
                requested: request.source_account(),
                signer,
            });
        }

        let tx = self.deposit_call(bridge, request);
        let provider = self.source.provider();

        let gas = provider
            .estimate_gas(tx.clone())
            .await
            .map_err(classify_submission_error)?;
        let gas_price = self.source.gas_price().await?;
        let balance = self.source.balance(signer).await?;
        let required = request.amount() + U256::from(gas) * U256::from(gas_price);
        debug!(%gas, %gas_price, %balance, %required, "estimated deposit cost");

        if balance < required {
            return Err(SubmissionError::InsufficientFunds { balance, required });
        }

        info!(action = "sending deposit transaction", %bridge, amount = %request.amount());
        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(classify_submission_error)?;

        let handle = DepositHandle::new(*pending.tx_hash(), Utc::now());
        info!(event = "deposit transaction broadcast", source_tx = %handle.source_tx());

        Ok(handle)
    }

    async fn await_source_confirmation(
        &self,
        handle: &DepositHandle,
    ) -> Result<(), SourceConfirmationError> {
        let source_tx = handle.source_tx();
        loop {
            let receipt = self
                .source
                .receipt(source_tx)
                .await
                .map_err(SourceConfirmationError::ConnectionLost)?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(SourceConfirmationError::Reverted(source_tx));
                }

                if self
                    .is_final(&receipt)
                    .await
                    .map_err(SourceConfirmationError::ConnectionLost)?
                {
                    info!(event = "source transaction final", %source_tx, block = ?receipt.block_number);
                    return Ok(());
                }
            }

            tokio::time::sleep(self.config.receipt_poll_interval()).await;
        }
    }

    async fn query_status(&self, handle: &DepositHandle) -> Result<MessageStatus, QueryError> {
        let source_tx = handle.source_tx();

        let Some(receipt) = self.source.receipt(source_tx).await? else {
            return Ok(MessageStatus::SourcePending);
        };
        if !receipt.status() {
            return Err(QueryError::SourceReverted(source_tx));
        }
        if !self.is_final(&receipt).await? {
            return Ok(MessageStatus::SourceConfirmed);
        }

        let portal = self.registry.require(ContractName::OptimismPortal)?;
        let deposit = DepositTransaction::find_in_receipt(&receipt, portal)
            .ok_or(QueryError::NoDepositEvent(source_tx))?
            .map_err(|e| QueryError::MalformedDeposit(e.to_string()))?;
        let dest_tx = deposit.tx_hash();

        let Some(dest_receipt) = self.destination.receipt(dest_tx).await? else {
            debug!(%source_tx, %dest_tx, "deposit not derived on the destination ledger yet");
            return Ok(MessageStatus::DestPending);
        };

        if relayed_by_messenger(&dest_receipt) {
            return Ok(MessageStatus::Relayed);
        }

        if relay_failed(&dest_receipt) || !dest_receipt.status() {
            warn!(%source_tx, %dest_tx, "deposit derived but its message was not relayed, awaiting replay");
        }
        Ok(MessageStatus::DestIncluded)
    }

    async fn balances(
        &self,
        source_account: Address,
        destination_account: Address,
    ) -> Result<BalanceSnapshot, BalanceError> {
        let (source, destination) = tokio::join!(
            self.source.balance(source_account),
            self.destination.balance(destination_account)
        );

        match (source, destination) {
            (Ok(source), Ok(destination)) => {
                Ok(BalanceSnapshot::new(source, destination, Utc::now()))
            }
            (Err(e), Ok(_)) => Err(BalanceError::Source(e)),
            (Ok(_), Err(e)) => Err(BalanceError::Destination(e)),
            (Err(source_ledger), Err(destination_ledger)) => Err(BalanceError::Both {
                source_ledger,
                destination_ledger,
            }),
        }
    }
}
