//! Graceful-then-forced shutdown of a worker pool.
//!
//! ```text
//! Running ──stop(Graceful)──> AwaitingGraceful ──terminated──> CompletedCleanly
//!                                   │ timeout
//!                                   v
//!                             Escalating ──stop(Forced)──> AwaitingForced ──terminated──> ForcedTermination
//!                                                               │ timeout
//!                                                               v
//!                                                        ForcedAfterTimeout
//! ```
//!
//! If the caller's token fires during either wait, the sequence jumps straight
//! to a forced stop and reports [`DrainOutcome::Interrupted`]. The token is left
//! cancelled so the caller's own cancellation handling still sees it.

use std::time::Duration;

use klient_types::{DrainOutcome, StopMode};
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::pool::{Interrupted, WorkerPool};

/// Wait budgets for the two drain phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainConfig {
    /// How long running tasks get to finish after a cooperative stop.
    pub grace_timeout: Duration,
    /// How long to wait after forced cancellation before giving up.
    pub force_timeout: Duration,
}

impl DrainConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    #[must_use]
    pub const fn new(grace_timeout: Duration, force_timeout: Duration) -> Self {
        Self {
            grace_timeout,
            force_timeout,
        }
    }
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT, Self::DEFAULT_TIMEOUT)
    }
}

/// Shut down `pool`, returning whether it reached the terminated state.
///
/// `None` returns `false` without doing anything. Safe to call again on a
/// pool that already terminated.
pub fn drain<P>(pool: Option<&P>, config: &DrainConfig, interrupt: &CancellationToken) -> bool
where
    P: WorkerPool + ?Sized,
{
    drain_outcome(pool, config, interrupt).is_terminated()
}

/// [`drain`] with default timeouts and a token that never fires.
pub fn shutdown<P>(pool: Option<&P>) -> bool
where
    P: WorkerPool + ?Sized,
{
    drain(pool, &DrainConfig::default(), &CancellationToken::new())
}

/// Like [`drain`], reporting which path the sequence took.
pub fn drain_outcome<P>(
    pool: Option<&P>,
    config: &DrainConfig,
    interrupt: &CancellationToken,
) -> DrainOutcome
where
    P: WorkerPool + ?Sized,
{
    let Some(pool) = pool else {
        return DrainOutcome::NoPool;
    };

    if !pool.is_stopped() {
        pool.request_stop(StopMode::Graceful);
    }

    match pool.await_termination(config.grace_timeout, interrupt) {
        Ok(true) => {
            debug!("Pool drained within grace period");
            return DrainOutcome::CompletedCleanly;
        }
        Ok(false) => {}
        Err(Interrupted) => return interrupted(pool),
    }

    if !pool.is_terminated() {
        warn!(
            grace = ?config.grace_timeout,
            "Pool did not drain within grace period; forcing cancellation"
        );
        pool.request_stop(StopMode::Forced);
    }

    match pool.await_termination(config.force_timeout, interrupt) {
        Ok(true) => DrainOutcome::ForcedTermination,
        Ok(false) => {
            let abandoned = pool.request_stop(StopMode::Forced);
            debug!(
                abandoned,
                grace = ?config.grace_timeout,
                force = ?config.force_timeout,
                "Pool was not cleanly shut down"
            );
            DrainOutcome::ForcedAfterTimeout { abandoned }
        }
        Err(Interrupted) => interrupted(pool),
    }
}

fn interrupted<P>(pool: &P) -> DrainOutcome
where
    P: WorkerPool + ?Sized,
{
    let abandoned = pool.request_stop(StopMode::Forced);
    debug!(abandoned, "Drain interrupted; forced cancellation requested");
    DrainOutcome::Interrupted
}
