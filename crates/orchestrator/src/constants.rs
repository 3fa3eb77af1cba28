//! Default values of the deposit policy.

use std::time::Duration;

/// Default bound on the wait for source finality.
pub(crate) const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default interval between two relay status reads.
pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default bound on the relay polling phase.
pub(crate) const DEFAULT_RELAY_DEADLINE: Duration = Duration::from_secs(10 * 60);

/// Default number of consecutive transient status read failures tolerated.
pub(crate) const DEFAULT_QUERY_RETRY_BUDGET: u32 = 5;

/// Default delay after the first transient status read failure.
pub(crate) const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Default cap on the delay between retries.
pub(crate) const DEFAULT_MAX_RETRY_BACKOFF: Duration = Duration::from_secs(10);
