//! Timing and retry bounds of a deposit run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_MAX_RETRY_BACKOFF, DEFAULT_POLL_INTERVAL,
    DEFAULT_QUERY_RETRY_BUDGET, DEFAULT_RELAY_DEADLINE, DEFAULT_RETRY_BACKOFF,
};

/// Bounds every wait of a [`crate::orchestrator::DepositOrchestrator`] run.
///
/// You should construct a [`DepositPolicy`] with [`Default::default`] and modify it with the
/// member methods on this struct. Every field may be omitted when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositPolicy {
    /// How long to wait for the deposit transaction to become final on the source ledger.
    pub(crate) confirmation_timeout: Duration,

    /// Interval between two relay status reads.
    pub(crate) poll_interval: Duration,

    /// How long to poll for the relay, measured from the first status read.
    pub(crate) relay_deadline: Duration,

    /// Number of consecutive transient status read failures tolerated before the run fails.
    pub(crate) query_retry_budget: u32,

    /// Delay after the first transient failure; doubled for every further consecutive failure.
    pub(crate) retry_backoff: Duration,

    /// Cap on the delay between retries.
    pub(crate) max_retry_backoff: Duration,
}

impl DepositPolicy {
    /// Updates the confirmation timeout and returns the updated policy.
    pub const fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Updates the poll interval and returns the updated policy.
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Updates the relay deadline and returns the updated policy.
    pub const fn with_relay_deadline(mut self, deadline: Duration) -> Self {
        self.relay_deadline = deadline;
        self
    }

    /// Updates the retry budget and returns the updated policy.
    pub const fn with_query_retry_budget(mut self, budget: u32) -> Self {
        self.query_retry_budget = budget;
        self
    }

    /// Updates the initial retry backoff and returns the updated policy.
    pub const fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Updates the retry backoff cap and returns the updated policy.
    pub const fn with_max_retry_backoff(mut self, max: Duration) -> Self {
        self.max_retry_backoff = max;
        self
    }

    /// Returns the confirmation timeout.
    pub const fn confirmation_timeout(&self) -> Duration {
        self.confirmation_timeout
    }

    /// Returns the poll interval.
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the relay deadline.
    pub const fn relay_deadline(&self) -> Duration {
        self.relay_deadline
    }

    /// Returns the retry budget.
    pub const fn query_retry_budget(&self) -> u32 {
        self.query_retry_budget
    }

    /// Delay to wait after the `failures`-th consecutive transient failure.
    ///
    /// The first failure waits [`Self::with_retry_backoff`], every further one doubles the delay
    /// up to [`Self::with_max_retry_backoff`].
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.retry_backoff
            .saturating_mul(factor)
            .min(self.max_retry_backoff)
    }
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self {
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            relay_deadline: DEFAULT_RELAY_DEADLINE,
            query_retry_budget: DEFAULT_QUERY_RETRY_BUDGET,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            max_retry_backoff: DEFAULT_MAX_RETRY_BACKOFF,
        }
    }
}
