//! Shared test helpers for the orchestrator crate.
//!
//! [`ScriptedBridge`] plays back a fixed sequence of status reads and counts every call the
//! orchestrator makes, so tests can assert on what a run did without touching a ledger.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    },
    time::Duration,
};

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use chrono::Utc;
use rollup_deposit_bridge_client::{
    bridge::BridgeClient,
    errors::{BalanceError, ChainError, QueryError, SourceConfirmationError, SubmissionError},
};
use rollup_deposit_primitives::{
    status::MessageStatus,
    types::{BalanceSnapshot, DepositHandle, DepositRequest},
    units::whole_units_to_wei,
};
use tokio::time::Instant;

/// Whole units held by the source account before any deposit.
pub(crate) const INITIAL_SOURCE_UNITS: u64 = 10;

/// A transport failure as the real client reports it.
pub(crate) fn transport_error() -> QueryError {
    QueryError::Transport(ChainError::Rpc("connection refused".to_string()))
}

/// Builds a request debiting and crediting the same account.
pub(crate) fn test_request(units: u64) -> DepositRequest {
    DepositRequest::to_self(whole_units_to_wei(units), Address::repeat_byte(0x11))
}

/// A [`BridgeClient`] double driven by a script.
///
/// Status reads pop the next scripted result; once the script is exhausted every read returns
/// the last scripted status, or [`MessageStatus::SourcePending`] if none was scripted.
#[derive(Debug, Default)]
pub(crate) struct ScriptedBridge {
    submit_error: Option<SubmissionError>,
    confirmation_error: Option<SourceConfirmationError>,
    confirmation_delay: Duration,
    query_delay: Duration,
    statuses: Mutex<VecDeque<Result<MessageStatus, QueryError>>>,
    last_status: Mutex<Option<MessageStatus>>,
    /// Balance reads that succeed before every further read fails.
    balance_reads_ok: Option<u32>,
    deposited: Mutex<U256>,

    submit_calls: AtomicU32,
    confirmation_calls: AtomicU32,
    poll_calls: AtomicU32,
    balance_calls: AtomicU32,
    poll_times: Mutex<Vec<Instant>>,
}

impl ScriptedBridge {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_statuses(self, statuses: impl IntoIterator<Item = MessageStatus>) -> Self {
        self.with_results(statuses.into_iter().map(Ok))
    }

    pub(crate) fn with_results(
        self,
        results: impl IntoIterator<Item = Result<MessageStatus, QueryError>>,
    ) -> Self {
        self.statuses
            .lock()
            .expect("script lock poisoned")
            .extend(results);
        self
    }

    pub(crate) fn with_submit_error(mut self, error: SubmissionError) -> Self {
        self.submit_error = Some(error);
        self
    }

    pub(crate) fn with_confirmation_error(mut self, error: SourceConfirmationError) -> Self {
        self.confirmation_error = Some(error);
        self
    }

    pub(crate) const fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    /// Makes every status read take `delay` before it answers.
    pub(crate) const fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub(crate) const fn with_balance_reads_ok(mut self, reads: u32) -> Self {
        self.balance_reads_ok = Some(reads);
        self
    }

    pub(crate) fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn confirmation_calls(&self) -> u32 {
        self.confirmation_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn balance_calls(&self) -> u32 {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().expect("poll log poisoned").clone()
    }
}

#[async_trait]
impl BridgeClient for ScriptedBridge {
    async fn submit(&self, request: &DepositRequest) -> Result<DepositHandle, SubmissionError> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.submit_error {
            return Err(error.clone());
        }

        *self.deposited.lock().expect("deposit lock poisoned") += request.amount();
        Ok(DepositHandle::new(
            TxHash::with_last_byte(call as u8 + 1),
            Utc::now(),
        ))
    }

    async fn await_source_confirmation(
        &self,
        _handle: &DepositHandle,
    ) -> Result<(), SourceConfirmationError> {
        self.confirmation_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.confirmation_delay).await;
        match &self.confirmation_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn query_status(&self, _handle: &DepositHandle) -> Result<MessageStatus, QueryError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_times
            .lock()
            .expect("poll log poisoned")
            .push(Instant::now());
        tokio::time::sleep(self.query_delay).await;

        let next = self.statuses.lock().expect("script lock poisoned").pop_front();
        let mut last = self.last_status.lock().expect("status lock poisoned");
        match next {
            Some(Ok(status)) => {
                *last = Some(status);
                Ok(status)
            }
            Some(Err(error)) => Err(error),
            None => Ok(last.unwrap_or(MessageStatus::SourcePending)),
        }
    }

    async fn balances(
        &self,
        _source_account: Address,
        _destination_account: Address,
    ) -> Result<BalanceSnapshot, BalanceError> {
        let call = self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.balance_reads_ok.is_some_and(|ok| call >= ok) {
            return Err(BalanceError::Destination(ChainError::Rpc(
                "balance unavailable".to_string(),
            )));
        }

        let deposited = *self.deposited.lock().expect("deposit lock poisoned");
        Ok(BalanceSnapshot::new(
            whole_units_to_wei(INITIAL_SOURCE_UNITS) - deposited,
            deposited,
            Utc::now(),
        ))
    }
}
