//! Bounded polling for relay submissions and ledger transactions.
//!
//! Both loops wait a fixed interval before each check and give up after a
//! fixed number of checks. There is no cancellation token; wrap the future
//! in `tokio::time::timeout` or drop it to stop early. Transport errors and
//! relay rejections end the loop immediately.

use std::time::Duration;

use gasfree::GasFreeError;
use gasfree::ledger::{LedgerClient, TxOutcome};
use gasfree::proto::TransferStatus;
use gasfree::relay::RelayApi;
use gasfree::tracker::{DEFAULT_MAX_ATTEMPTS, TerminalStates, TrackerState, TransferTracker};

/// Default delay between relay status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of ledger confirmation checks.
pub const DEFAULT_LEDGER_ATTEMPTS: u32 = 30;

/// Default delay between ledger confirmation checks.
pub const DEFAULT_LEDGER_INTERVAL: Duration = Duration::from_secs(3);

/// Attempt budget and pacing of a polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of checks before giving up.
    pub max_attempts: u32,
    /// Delay before each check.
    pub interval: Duration,
    /// Relay states that end the loop. Unused when waiting on the ledger.
    pub terminal: TerminalStates,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
            terminal: TerminalStates::default(),
        }
    }
}

impl PollPolicy {
    /// The default pacing for ledger confirmations (30 checks, 3 s apart).
    #[must_use]
    pub fn ledger() -> Self {
        Self {
            max_attempts: DEFAULT_LEDGER_ATTEMPTS,
            interval: DEFAULT_LEDGER_INTERVAL,
            ..Self::default()
        }
    }

    /// Sets the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before each check.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replaces the terminal relay states.
    #[must_use]
    pub fn with_terminal(mut self, terminal: TerminalStates) -> Self {
        self.terminal = terminal;
        self
    }

    fn tracker(&self, trace_id: &str) -> TransferTracker {
        TransferTracker::with_config(trace_id, self.max_attempts, self.terminal.clone())
    }
}

/// Final observation of a submitted authorization.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    /// Trace id that was polled.
    pub trace_id: String,
    /// [`TrackerState::Succeeded`] or [`TrackerState::Failed`].
    pub state: TrackerState,
    /// Status checks performed.
    pub attempts: u32,
    /// The last status the relay returned.
    pub status: Option<TransferStatus>,
}

impl TransferReport {
    /// Returns `true` if the relay reported a success state.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == TrackerState::Succeeded
    }
}

/// Polls the relay until `trace_id` reaches a terminal state.
///
/// A check where the relay has no record yet still consumes an attempt.
///
/// # Errors
///
/// Returns the relay's error as soon as a check fails, and
/// [`GasFreeError::Timeout`] once the attempt budget is spent.
pub async fn poll_transfer<R>(
    relay: &R,
    trace_id: &str,
    policy: &PollPolicy,
) -> Result<TransferReport, R::Error>
where
    R: RelayApi + ?Sized,
{
    let mut tracker = policy.tracker(trace_id);
    let mut last = None;
    let mut state = tracker.state();
    while !state.is_terminal() {
        tokio::time::sleep(policy.interval).await;
        let status = relay.transfer_status(trace_id).await?;
        state = tracker.observe(status.as_ref().map(|s| &s.state));
        if status.is_some() {
            last = status;
        }
    }

    if state == TrackerState::TimedOut {
        #[cfg(feature = "telemetry")]
        tracing::warn!(trace_id, attempts = tracker.attempts(), "transfer still unresolved");
        return Err(tracker.timeout_error().into());
    }
    #[cfg(feature = "telemetry")]
    tracing::info!(trace_id, ?state, attempts = tracker.attempts(), "transfer resolved");
    Ok(TransferReport {
        trace_id: trace_id.to_owned(),
        state,
        attempts: tracker.attempts(),
        status: last,
    })
}

/// Waits until a ledger transaction is included and returns its outcome.
///
/// # Errors
///
/// Returns the ledger's error as soon as a check fails, and
/// [`GasFreeError::Timeout`] once the attempt budget is spent.
pub async fn wait_for_ledger_tx<L>(
    ledger: &L,
    tx_id: &str,
    policy: &PollPolicy,
) -> Result<TxOutcome, L::Error>
where
    L: LedgerClient + ?Sized,
{
    for _ in 0..policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        if let Some(outcome) = ledger.transaction_outcome(tx_id).await? {
            #[cfg(feature = "telemetry")]
            tracing::info!(tx_id, ?outcome, "ledger transaction included");
            return Ok(outcome);
        }
        #[cfg(feature = "telemetry")]
        tracing::debug!(tx_id, "ledger transaction not yet included");
    }
    Err(GasFreeError::Timeout {
        trace_id: tx_id.to_owned(),
        attempts: policy.max_attempts,
    }
    .into())
}
