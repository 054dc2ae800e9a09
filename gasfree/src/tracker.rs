//! Status tracking for submitted authorizations.
//!
//! A [`TransferTracker`] is driven purely by the states the relay reports.
//! It starts in [`TrackerState::Submitted`], moves to
//! [`TrackerState::Pending`] on the first non-terminal observation, and ends
//! in [`TrackerState::Succeeded`], [`TrackerState::Failed`] or, once its
//! attempt budget is spent, [`TrackerState::TimedOut`]. A timeout is a
//! failure of observation only; the transfer itself may still execute.

use std::collections::HashSet;

use crate::error::GasFreeError;
use crate::proto::StateTag;

/// Default number of status checks before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Lifecycle of a submitted authorization as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerState {
    /// Accepted by the relay, not yet observed.
    Submitted,
    /// Observed in a non-terminal state.
    Pending,
    /// Observed in a success state.
    Succeeded,
    /// Observed in a failure state.
    Failed,
    /// Attempt budget exhausted without a terminal observation.
    TimedOut,
}

impl TrackerState {
    /// Returns `true` once no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }
}

/// How a single relay state is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Terminal success.
    Success,
    /// Terminal failure.
    Failure,
    /// Anything else.
    Pending,
}

/// The relay states treated as terminal.
///
/// Defaults to the named states only: `SUCCEED`/`SUCCESS` for success and
/// `FAILED`/`EXPIRED`/`CANCELED` for failure. Numeric codes are never
/// assumed; add them with [`Self::with_success`] and [`Self::with_failure`]
/// when a relay version is known to report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalStates {
    success: HashSet<StateTag>,
    failure: HashSet<StateTag>,
}

impl Default for TerminalStates {
    fn default() -> Self {
        Self {
            success: ["SUCCEED", "SUCCESS"].into_iter().map(StateTag::from).collect(),
            failure: ["FAILED", "EXPIRED", "CANCELED"]
                .into_iter()
                .map(StateTag::from)
                .collect(),
        }
    }
}

impl TerminalStates {
    /// Creates an empty configuration in which nothing is terminal.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: HashSet::new(),
            failure: HashSet::new(),
        }
    }

    /// Adds a success tag.
    #[must_use]
    pub fn with_success(mut self, tag: impl Into<StateTag>) -> Self {
        self.success.insert(tag.into());
        self
    }

    /// Adds a failure tag.
    #[must_use]
    pub fn with_failure(mut self, tag: impl Into<StateTag>) -> Self {
        self.failure.insert(tag.into());
        self
    }

    /// Classifies a relay state. Success tags take precedence.
    #[must_use]
    pub fn classify(&self, tag: &StateTag) -> Outcome {
        if self.success.contains(tag) {
            Outcome::Success
        } else if self.failure.contains(tag) {
            Outcome::Failure
        } else {
            Outcome::Pending
        }
    }
}

/// State machine following one submitted authorization.
#[derive(Debug, Clone)]
pub struct TransferTracker {
    trace_id: String,
    terminal: TerminalStates,
    max_attempts: u32,
    attempts: u32,
    state: TrackerState,
    last_tag: Option<StateTag>,
}

impl TransferTracker {
    /// Starts tracking `trace_id` with the default budget and terminal states.
    #[must_use]
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self::with_config(trace_id, DEFAULT_MAX_ATTEMPTS, TerminalStates::default())
    }

    /// Starts tracking `trace_id` with an explicit budget and terminal states.
    ///
    /// A budget of zero starts out [`TrackerState::TimedOut`].
    #[must_use]
    pub fn with_config(
        trace_id: impl Into<String>,
        max_attempts: u32,
        terminal: TerminalStates,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            terminal,
            max_attempts,
            attempts: 0,
            state: if max_attempts == 0 {
                TrackerState::TimedOut
            } else {
                TrackerState::Submitted
            },
            last_tag: None,
        }
    }

    /// Feeds one status check into the machine.
    ///
    /// `observed` is the state the relay reported, or `None` when the relay
    /// had no record yet. Every call consumes one attempt. Calls after a
    /// terminal state are ignored.
    pub fn observe(&mut self, observed: Option<&StateTag>) -> TrackerState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.attempts += 1;
        if let Some(tag) = observed {
            self.last_tag = Some(tag.clone());
            self.state = match self.terminal.classify(tag) {
                Outcome::Success => TrackerState::Succeeded,
                Outcome::Failure => TrackerState::Failed,
                Outcome::Pending => TrackerState::Pending,
            };
        }
        if !self.state.is_terminal() && self.attempts >= self.max_attempts {
            self.state = TrackerState::TimedOut;
        }
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            trace_id = %self.trace_id,
            attempt = self.attempts,
            tag = ?self.last_tag,
            state = ?self.state,
            "transfer status observed"
        );
        self.state
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        self.state
    }

    /// Returns the trace id being tracked.
    #[must_use]
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Returns the number of status checks consumed.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the last relay state observed.
    #[must_use]
    pub const fn last_tag(&self) -> Option<&StateTag> {
        self.last_tag.as_ref()
    }

    /// Returns the timeout error describing this tracker.
    #[must_use]
    pub fn timeout_error(&self) -> GasFreeError {
        GasFreeError::Timeout {
            trace_id: self.trace_id.clone(),
            attempts: self.attempts,
        }
    }
}
