//! The deposit lifecycle: submit, wait for source finality, poll until relayed.

use std::{sync::Arc, time::Duration};

use rollup_deposit_bridge_client::bridge::BridgeClient;
use rollup_deposit_primitives::{
    status::MessageStatus,
    types::{DepositHandle, DepositRequest},
};
use tokio::{
    sync::mpsc,
    time::{sleep_until, timeout, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    checkpoint::Checkpoint, errors::DepositError, policy::DepositPolicy, report::DepositReport,
    state::DepositPhase,
};

/// Runs deposits against a [`BridgeClient`].
///
/// The orchestrator only holds the client and the policy; everything that belongs to a run lives
/// inside [`DepositOrchestrator::run`], so independent runs may proceed concurrently on the same
/// orchestrator.
#[derive(Debug)]
pub struct DepositOrchestrator<B> {
    client: Arc<B>,
    policy: DepositPolicy,
    checkpoints_tx: Option<mpsc::UnboundedSender<Checkpoint>>,
}

impl<B: BridgeClient> DepositOrchestrator<B> {
    /// Creates a new orchestrator.
    pub const fn new(client: Arc<B>, policy: DepositPolicy) -> Self {
        Self {
            client,
            policy,
            checkpoints_tx: None,
        }
    }

    /// Streams every checkpoint to `tx` as soon as it is reached, in addition to collecting it in
    /// the report.
    pub fn with_checkpoint_sender(mut self, tx: mpsc::UnboundedSender<Checkpoint>) -> Self {
        self.checkpoints_tx = Some(tx);
        self
    }

    /// The policy bounding every run.
    pub const fn policy(&self) -> &DepositPolicy {
        &self.policy
    }

    /// Runs one deposit to completion, failure or cancellation.
    ///
    /// The deposit transaction is submitted at most once. Cancelling `cancel` aborts the
    /// confirmation wait and the status polling but never an in-flight submission.
    pub async fn run(&self, request: DepositRequest, cancel: CancellationToken) -> DepositReport {
        let mut run = Run::new(self.checkpoints_tx.as_ref());

        let outcome = self.drive(&mut run, &request, &cancel).await;
        match &outcome {
            Ok(()) => info!(event = "deposit completed", polls = %run.polls),
            Err(e) => error!(event = "deposit failed", kind = %e.kind(), %e, phase = %run.phase),
        }

        DepositReport {
            outcome,
            final_phase: run.phase,
            handle: run.handle,
            checkpoints: run.checkpoints,
            polls: run.polls,
            elapsed: run.started.map(|t| t.elapsed()).unwrap_or_default(),
        }
    }

    async fn drive(
        &self,
        run: &mut Run<'_>,
        request: &DepositRequest,
        cancel: &CancellationToken,
    ) -> Result<(), DepositError> {
        let before = self
            .client
            .balances(request.source_account(), request.destination_account())
            .await?;
        run.record(Checkpoint::BalancesBefore(before));

        if cancel.is_cancelled() {
            return Err(DepositError::Cancelled);
        }

        info!(action = "submitting deposit", amount = %request.amount(), to = %request.destination_account());
        let started = Instant::now();
        run.started = Some(started);
        let handle = self.client.submit(request).await?;
        run.handle = Some(handle);
        run.phase.advance(MessageStatus::SourcePending);
        run.record(Checkpoint::Submitted(handle));

        self.await_confirmation(&handle, cancel).await?;
        run.phase.advance(MessageStatus::SourceConfirmed);
        run.record(Checkpoint::SourceConfirmed {
            elapsed: started.elapsed(),
        });

        self.poll_until_relayed(run, &handle, started, cancel).await?;

        let after = self
            .client
            .balances(request.source_account(), request.destination_account())
            .await?;
        run.record(Checkpoint::BalancesAfter(after));
        run.record(Checkpoint::Completed {
            elapsed: started.elapsed(),
        });

        Ok(())
    }

    async fn await_confirmation(
        &self,
        handle: &DepositHandle,
        cancel: &CancellationToken,
    ) -> Result<(), DepositError> {
        let limit = self.policy.confirmation_timeout();
        info!(action = "awaiting source finality", source_tx = %handle.source_tx(), ?limit);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DepositError::Cancelled),
            res = timeout(limit, self.client.await_source_confirmation(handle)) => match res {
                Ok(confirmation) => Ok(confirmation?),
                Err(_) => Err(DepositError::SourceConfirmationTimeout(limit)),
            },
        }
    }

    /// Reads the status every poll interval until the message is relayed.
    ///
    /// No read is issued at or after the relay deadline, nor after `Relayed` is observed, and a
    /// read that has not answered by the deadline ends the run.
    async fn poll_until_relayed(
        &self,
        run: &mut Run<'_>,
        handle: &DepositHandle,
        started: Instant,
        cancel: &CancellationToken,
    ) -> Result<(), DepositError> {
        let relay_deadline = self.policy.relay_deadline();
        let deadline = Instant::now() + relay_deadline;
        let budget = self.policy.query_retry_budget();
        let mut failures = 0u32;

        let timed_out = |phase: DepositPhase| DepositError::RelayTimeout {
            deadline: relay_deadline,
            last_status: phase.status().unwrap_or(MessageStatus::SourcePending),
        };

        loop {
            if Instant::now() >= deadline {
                return Err(timed_out(run.phase));
            }

            // A read still in flight at the deadline is abandoned.
            run.polls += 1;
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DepositError::Cancelled),
                _ = sleep_until(deadline) => return Err(timed_out(run.phase)),
                read = self.client.query_status(handle) => read,
            };

            let wait = match read {
                Ok(status) => {
                    failures = 0;
                    if run.phase.advance(status) {
                        info!(event = "message status advanced", source_tx = %handle.source_tx(), %status, polls = %run.polls);
                        run.record(Checkpoint::StatusAdvanced {
                            status,
                            polls: run.polls,
                            elapsed: started.elapsed(),
                        });
                    }
                    if status.is_relayed() {
                        return Ok(());
                    }
                    self.policy.poll_interval()
                }
                Err(e) if e.is_transient() => {
                    failures += 1;
                    if failures > budget {
                        return Err(DepositError::TransientQuery { failures, last: e });
                    }
                    let backoff = self.policy.backoff(failures);
                    warn!(%e, %failures, %budget, ?backoff, "status read failed, retrying");
                    backoff
                }
                Err(e) => return Err(e.into()),
            };

            Self::wait(wait, deadline, cancel).await?;
        }
    }

    /// Sleeps for `wait`, but never past `deadline`.
    async fn wait(
        wait: Duration,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<(), DepositError> {
        let wake = (Instant::now() + wait).min(deadline);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DepositError::Cancelled),
            _ = sleep_until(wake) => Ok(()),
        }
    }
}

/// The state of one run.
#[derive(Debug)]
struct Run<'a> {
    phase: DepositPhase,
    handle: Option<DepositHandle>,
    checkpoints: Vec<Checkpoint>,
    polls: u32,
    started: Option<Instant>,
    tx: Option<&'a mpsc::UnboundedSender<Checkpoint>>,
}

impl<'a> Run<'a> {
    const fn new(tx: Option<&'a mpsc::UnboundedSender<Checkpoint>>) -> Self {
        Self {
            phase: DepositPhase::Unsubmitted,
            handle: None,
            checkpoints: Vec::new(),
            polls: 0,
            started: None,
            tx,
        }
    }

    fn record(&mut self, checkpoint: Checkpoint) {
        if let Some(tx) = self.tx {
            if tx.send(checkpoint.clone()).is_err() {
                debug!("checkpoint receiver dropped");
            }
        }
        self.checkpoints.push(checkpoint);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rollup_deposit_bridge_client::errors::{
        QueryError, SourceConfirmationError, SubmissionError,
    };
    use rollup_deposit_primitives::{
        registry::{ContractName, MissingContract},
        units::whole_units_to_wei,
    };

    use super::*;
    use crate::{
        errors::DepositErrorKind,
        testing::{test_request, transport_error, ScriptedBridge, INITIAL_SOURCE_UNITS},
    };

    const LIFECYCLE: [MessageStatus; 5] = [
        MessageStatus::SourcePending,
        MessageStatus::SourceConfirmed,
        MessageStatus::DestPending,
        MessageStatus::DestIncluded,
        MessageStatus::Relayed,
    ];

    fn test_policy() -> DepositPolicy {
        DepositPolicy::default()
            .with_confirmation_timeout(Duration::from_secs(60))
            .with_poll_interval(Duration::from_secs(2))
            .with_relay_deadline(Duration::from_secs(10))
            .with_query_retry_budget(3)
            .with_retry_backoff(Duration::from_millis(100))
            .with_max_retry_backoff(Duration::from_secs(1))
    }

    fn orchestrator(
        bridge: ScriptedBridge,
    ) -> (DepositOrchestrator<ScriptedBridge>, Arc<ScriptedBridge>) {
        let bridge = Arc::new(bridge);
        (DepositOrchestrator::new(bridge.clone(), test_policy()), bridge)
    }

    fn advanced_statuses(report: &DepositReport) -> Vec<MessageStatus> {
        report
            .checkpoints
            .iter()
            .filter_map(|checkpoint| match checkpoint {
                Checkpoint::StatusAdvanced { status, .. } => Some(*status),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn full_lifecycle_succeeds() {
        let (orchestrator, bridge) = orchestrator(ScriptedBridge::new().with_statuses(LIFECYCLE));

        let report = orchestrator.run(test_request(3), CancellationToken::new()).await;

        assert!(report.is_success(), "unexpected failure: {:?}", report.error());
        assert_eq!(report.final_status(), Some(MessageStatus::Relayed));
        assert_eq!(report.polls, 5);
        assert_eq!(bridge.poll_calls(), 5);
        assert_eq!(bridge.submit_calls(), 1);
        assert_eq!(bridge.balance_calls(), 2);

        let before: Vec<_> = report
            .checkpoints
            .iter()
            .filter(|c| matches!(c, Checkpoint::BalancesBefore(_)))
            .collect();
        assert_eq!(before.len(), 1);

        let Some(Checkpoint::BalancesAfter(after)) = report
            .checkpoints
            .iter()
            .find(|c| matches!(c, Checkpoint::BalancesAfter(_)))
        else {
            panic!("no post-relay snapshot in {:?}", report.checkpoints);
        };
        assert_eq!(after.destination_balance(), whole_units_to_wei(3));
        assert_eq!(
            after.source_balance(),
            whole_units_to_wei(INITIAL_SOURCE_UNITS - 3)
        );

        assert!(matches!(
            report.checkpoints.last(),
            Some(Checkpoint::Completed { .. })
        ));
        // Statuses at or below SourceConfirmed were already known from the confirmation step.
        assert_eq!(
            advanced_statuses(&report),
            vec![
                MessageStatus::DestPending,
                MessageStatus::DestIncluded,
                MessageStatus::Relayed
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn observed_statuses_never_regress() {
        let (orchestrator, _) = orchestrator(ScriptedBridge::new().with_statuses([
            MessageStatus::DestPending,
            MessageStatus::SourcePending,
            MessageStatus::DestIncluded,
            MessageStatus::DestPending,
            MessageStatus::DestIncluded,
            MessageStatus::Relayed,
        ]));

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert!(report.is_success());
        assert_eq!(report.polls, 6);
        let advanced = advanced_statuses(&report);
        assert!(advanced.windows(2).all(|w| w[0] < w[1]), "{advanced:?}");
        assert_eq!(
            advanced,
            vec![
                MessageStatus::DestPending,
                MessageStatus::DestIncluded,
                MessageStatus::Relayed
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stops_polling_once_relayed() {
        for n in 1..=4u32 {
            let mut script = vec![MessageStatus::DestPending; n as usize - 1];
            script.push(MessageStatus::Relayed);
            script.push(MessageStatus::Relayed);
            let (orchestrator, bridge) = orchestrator(ScriptedBridge::new().with_statuses(script));

            let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

            assert!(report.is_success());
            assert_eq!(bridge.poll_calls(), n);
            assert_eq!(report.polls, n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_ends_polling() {
        let (orchestrator, bridge) =
            orchestrator(ScriptedBridge::new().with_statuses([MessageStatus::DestPending]));

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert!(matches!(
            report.error(),
            Some(DepositError::RelayTimeout {
                last_status: MessageStatus::DestPending,
                ..
            })
        ));
        assert_eq!(report.final_status(), Some(MessageStatus::DestPending));

        let times = bridge.poll_times();
        let first = times[0];
        assert!(times
            .iter()
            .all(|t| t.duration_since(first) < test_policy().relay_deadline()));
        // Reads at 0, 2, 4, 6 and 8 seconds; the read due at 10 seconds is never issued.
        assert_eq!(bridge.poll_calls(), 5);

        // No post snapshot after a failed relay.
        assert_eq!(bridge.balance_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_read_is_cut_off_at_the_deadline() {
        let (orchestrator, bridge) = orchestrator(
            ScriptedBridge::new()
                .with_statuses([MessageStatus::DestPending])
                .with_query_delay(Duration::from_secs(3600)),
        );

        let polling_started = Instant::now();
        let report = timeout(
            Duration::from_secs(3600),
            orchestrator.run(test_request(1), CancellationToken::new()),
        )
        .await
        .expect("run must end at the relay deadline");

        assert!(matches!(
            report.error(),
            Some(DepositError::RelayTimeout {
                last_status: MessageStatus::SourceConfirmed,
                ..
            })
        ));
        assert_eq!(bridge.poll_calls(), 1);
        assert_eq!(report.polls, 1);
        let elapsed = polling_started.elapsed();
        let deadline = test_policy().relay_deadline();
        assert!(elapsed >= deadline && elapsed < deadline + Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reads_count_against_the_deadline() {
        // Each read takes 3 seconds and is followed by a 2 second wait: reads start at 0 and 5,
        // the read started at 10 is never issued.
        let (orchestrator, bridge) = orchestrator(
            ScriptedBridge::new()
                .with_statuses([MessageStatus::DestPending, MessageStatus::DestIncluded])
                .with_query_delay(Duration::from_secs(3)),
        );

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert!(matches!(
            report.error(),
            Some(DepositError::RelayTimeout {
                last_status: MessageStatus::DestIncluded,
                ..
            })
        ));
        assert_eq!(bridge.poll_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_skips_everything_else() {
        let (orchestrator, bridge) = orchestrator(
            ScriptedBridge::new()
                .with_submit_error(SubmissionError::Rejected("insufficient funds".into()))
                .with_statuses(LIFECYCLE),
        );

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert_eq!(report.error().map(DepositError::kind), Some(DepositErrorKind::Submission));
        assert_eq!(bridge.submit_calls(), 1);
        assert_eq!(bridge.confirmation_calls(), 0);
        assert_eq!(bridge.poll_calls(), 0);
        assert_eq!(report.handle, None);
        assert_eq!(report.final_phase, DepositPhase::Unsubmitted);
        // The pre-submission snapshot is still reported.
        assert!(matches!(
            report.checkpoints.as_slice(),
            [Checkpoint::BalancesBefore(_)]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_bridge_contract_is_a_configuration_error() {
        let (orchestrator, _) = orchestrator(ScriptedBridge::new().with_submit_error(
            SubmissionError::MissingContract(MissingContract(ContractName::L1StandardBridge)),
        ));

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert_eq!(
            report.error().map(DepositError::kind),
            Some(DepositErrorKind::Configuration)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_within_budget_are_retried() {
        let (orchestrator, bridge) = orchestrator(ScriptedBridge::new().with_results([
            Ok(MessageStatus::DestPending),
            Err(transport_error()),
            Err(transport_error()),
            Err(transport_error()),
            Ok(MessageStatus::DestIncluded),
            Err(transport_error()),
            Ok(MessageStatus::Relayed),
        ]));

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert!(report.is_success(), "unexpected failure: {:?}", report.error());
        assert_eq!(bridge.poll_calls(), 7);
        assert_eq!(report.polls, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn exceeding_the_budget_fails_the_run() {
        let (orchestrator, bridge) = orchestrator(
            ScriptedBridge::new().with_results((0..5).map(|_| Err(transport_error()))),
        );

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert!(matches!(
            report.error(),
            Some(DepositError::TransientQuery { failures: 4, .. })
        ));
        // The budget of 3 allows 3 retries after the first failure.
        assert_eq!(bridge.poll_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_query_errors_are_not_retried() {
        let (orchestrator, bridge) = orchestrator(ScriptedBridge::new().with_results([
            Ok(MessageStatus::SourceConfirmed),
            Err(QueryError::MalformedDeposit("opaque data is 3 bytes".into())),
            Ok(MessageStatus::Relayed),
        ]));

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert_eq!(report.error().map(DepositError::kind), Some(DepositErrorKind::Query));
        assert_eq!(bridge.poll_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_polling() {
        let (orchestrator, bridge) =
            orchestrator(ScriptedBridge::new().with_statuses([MessageStatus::DestPending]));
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                cancel.cancel();
            })
        };

        let report = orchestrator.run(test_request(1), cancel).await;
        canceller.await.unwrap();

        assert_eq!(report.error().map(DepositError::kind), Some(DepositErrorKind::Cancelled));
        assert_eq!(report.final_status(), Some(MessageStatus::DestPending));
        // Reads at 0, 2 and 4 seconds, cancelled while waiting for the one at 6.
        assert_eq!(bridge.poll_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_confirmation() {
        let (orchestrator, bridge) = orchestrator(
            ScriptedBridge::new().with_confirmation_delay(Duration::from_secs(30)),
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let report = orchestrator.run(test_request(1), cancel).await;

        assert_eq!(report.error().map(DepositError::kind), Some(DepositErrorKind::Cancelled));
        assert_eq!(bridge.submit_calls(), 1);
        assert_eq!(bridge.poll_calls(), 0);
        assert_eq!(report.final_status(), Some(MessageStatus::SourcePending));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_confirmation_times_out() {
        let (orchestrator, bridge) = orchestrator(
            ScriptedBridge::new().with_confirmation_delay(Duration::from_secs(61)),
        );

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert!(matches!(
            report.error(),
            Some(DepositError::SourceConfirmationTimeout(_))
        ));
        assert_eq!(
            report.error().map(DepositError::kind),
            Some(DepositErrorKind::SourceConfirmation)
        );
        assert_eq!(bridge.poll_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_source_transaction_is_surfaced() {
        let (orchestrator, bridge) = orchestrator(
            ScriptedBridge::new()
                .with_confirmation_error(SourceConfirmationError::Reverted(Default::default())),
        );

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert!(matches!(
            report.error(),
            Some(DepositError::SourceConfirmation(SourceConfirmationError::Reverted(_)))
        ));
        assert_eq!(bridge.poll_calls(), 0);
        assert!(report.handle.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_final_snapshot_keeps_the_relayed_status() {
        let (orchestrator, _) = orchestrator(
            ScriptedBridge::new()
                .with_statuses([MessageStatus::Relayed])
                .with_balance_reads_ok(1),
        );

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert_eq!(report.error().map(DepositError::kind), Some(DepositErrorKind::Balance));
        assert_eq!(report.final_status(), Some(MessageStatus::Relayed));
        assert!(!report
            .checkpoints
            .iter()
            .any(|c| matches!(c, Checkpoint::Completed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_first_snapshot_submits_nothing() {
        let (orchestrator, bridge) = orchestrator(ScriptedBridge::new().with_balance_reads_ok(0));

        let report = orchestrator.run(test_request(1), CancellationToken::new()).await;

        assert_eq!(report.error().map(DepositError::kind), Some(DepositErrorKind::Balance));
        assert_eq!(bridge.submit_calls(), 0);
        assert!(report.checkpoints.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn checkpoints_are_streamed_in_order() {
        let bridge = Arc::new(ScriptedBridge::new().with_statuses(LIFECYCLE));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let orchestrator =
            DepositOrchestrator::new(bridge, test_policy()).with_checkpoint_sender(tx);

        let report = orchestrator.run(test_request(2), CancellationToken::new()).await;
        drop(orchestrator);

        let mut streamed = Vec::new();
        while let Some(checkpoint) = rx.recv().await {
            streamed.push(checkpoint);
        }
        assert_eq!(streamed, report.checkpoints);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_runs_proceed_concurrently() {
        let orchestrator = Arc::new(DepositOrchestrator::new(
            Arc::new(ScriptedBridge::new().with_statuses([MessageStatus::Relayed])),
            test_policy(),
        ));

        let runs = (1..=3).map(|units| {
            let orchestrator = orchestrator.clone();
            async move {
                orchestrator
                    .run(test_request(units), CancellationToken::new())
                    .await
            }
        });
        let reports = futures::future::join_all(runs).await;

        assert!(reports.iter().all(DepositReport::is_success));
        let mut handles: Vec<_> = reports.iter().filter_map(|r| r.handle).collect();
        handles.sort_by_key(|h| h.source_tx());
        handles.dedup();
        assert_eq!(handles.len(), 3);
        assert_eq!(orchestrator.client.submit_calls(), 3);
    }
}
