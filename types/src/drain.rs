//! Vocabulary shared by worker pools and the drain sequencer.

use std::fmt;

/// How a pool is asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopMode {
    /// Stop accepting new tasks; queued and running tasks still finish.
    Graceful,
    /// Stop accepting, discard queued tasks, and cancel running ones.
    Forced,
}

impl StopMode {
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::Forced)
    }
}

/// Result of one drain invocation. Computed once, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrainOutcome {
    /// Every task finished within the grace period.
    CompletedCleanly,
    /// The grace period elapsed; the pool terminated after forced cancellation.
    ForcedTermination,
    /// The pool was still running when the forced period elapsed.
    ForcedAfterTimeout {
        /// Queued tasks discarded by the final forced stop.
        abandoned: usize,
    },
    /// The caller's cancellation token fired while waiting.
    Interrupted,
    /// No pool was supplied.
    NoPool,
}

impl DrainOutcome {
    /// Whether the pool reached its fully terminated state.
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::CompletedCleanly | Self::ForcedTermination)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompletedCleanly => "completed_cleanly",
            Self::ForcedTermination => "forced_termination",
            Self::ForcedAfterTimeout { .. } => "forced_after_timeout",
            Self::Interrupted => "interrupted",
            Self::NoPool => "no_pool",
        }
    }
}

impl From<DrainOutcome> for bool {
    fn from(outcome: DrainOutcome) -> Self {
        outcome.is_terminated()
    }
}

impl fmt::Display for DrainOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
