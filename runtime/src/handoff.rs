//! Blocking handoff of a single completion signal between two threads.
//!
//! A background producer holds a [`HandoffSender`] and deposits exactly one
//! [`Signal`]. The caller holds the [`HandoffReceiver`] and blocks in
//! [`wait_until_ready`] until the signal arrives or the timeout elapses.
//!
//! ```text
//! producer thread                 caller thread
//!   work...                         wait_until_ready(&rx, 30s)
//!   tx.deposit(Signal::Ready(true)) ──> Ok(true)
//! ```
//!
//! The channel is bounded and meant for one producer and one waiter per
//! logical operation. Only one entry is consumed per wait.

use std::panic::Location;
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

use klient_types::{BoxError, Signal};
use thiserror::Error;
use tracing::debug;

/// Failure re-raised on the waiting side.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The producer deposited [`Signal::Failed`].
    ///
    /// `source` is the producer's original error; `waiting_at` is where the
    /// caller was blocked when it arrived.
    #[error("background task failed (waiting at {waiting_at})")]
    Failed {
        waiting_at: &'static Location<'static>,
        #[source]
        source: BoxError,
    },
}

impl HandoffError {
    #[must_use]
    pub fn waiting_at(&self) -> &'static Location<'static> {
        match self {
            Self::Failed { waiting_at, .. } => waiting_at,
        }
    }

    #[must_use]
    pub fn into_source(self) -> BoxError {
        match self {
            Self::Failed { source, .. } => source,
        }
    }
}

/// Why a deposit did not reach the channel. The signal is handed back.
#[derive(Debug, Error)]
pub enum DepositError {
    #[error("handoff channel is full")]
    Full(Signal),
    #[error("handoff receiver was dropped")]
    Closed(Signal),
}

impl DepositError {
    #[must_use]
    pub fn into_signal(self) -> Signal {
        match self {
            Self::Full(signal) | Self::Closed(signal) => signal,
        }
    }
}

/// Create a bounded handoff channel. A `capacity` of zero is raised to one.
#[must_use]
pub fn handoff_channel(capacity: usize) -> (HandoffSender, HandoffReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (HandoffSender { tx }, HandoffReceiver { rx })
}

/// Producer half. Cloneable so a signal can come from whichever thread finishes.
#[derive(Debug, Clone)]
pub struct HandoffSender {
    tx: SyncSender<Signal>,
}

impl HandoffSender {
    /// Deposit a signal without blocking.
    pub fn deposit(&self, signal: impl Into<Signal>) -> Result<(), DepositError> {
        self.tx.try_send(signal.into()).map_err(|err| match err {
            TrySendError::Full(signal) => DepositError::Full(signal),
            TrySendError::Disconnected(signal) => DepositError::Closed(signal),
        })
    }

    pub fn ready(&self, ready: bool) -> Result<(), DepositError> {
        self.deposit(Signal::Ready(ready))
    }

    pub fn fail(&self, error: impl Into<BoxError>) -> Result<(), DepositError> {
        self.deposit(Signal::Failed(error.into()))
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct HandoffReceiver {
    rx: mpsc::Receiver<Signal>,
}

impl HandoffReceiver {
    /// Take one signal, blocking for at most `timeout`.
    ///
    /// Returns `None` on timeout or when every sender is gone without depositing.
    #[must_use]
    pub fn try_receive(&self, timeout: Duration) -> Option<Signal> {
        match self.rx.recv_timeout(timeout) {
            Ok(signal) => Some(signal),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Handoff producer dropped without depositing a signal");
                None
            }
        }
    }
}

/// Wait until another thread signals completion of a task.
///
/// - No signal within `timeout`: `Ok(false)`.
/// - [`Signal::Ready`]: the flag, verbatim.
/// - [`Signal::Failed`]: [`HandoffError::Failed`] carrying the original error
///   as its source and the caller's location.
/// - Producer gone without a signal: `Ok(false)`.
#[track_caller]
pub fn wait_until_ready(
    receiver: &HandoffReceiver,
    timeout: Duration,
) -> Result<bool, HandoffError> {
    let waiting_at = Location::caller();
    match receiver.try_receive(timeout) {
        Some(Signal::Ready(ready)) => Ok(ready),
        Some(Signal::Failed(source)) => Err(HandoffError::Failed { waiting_at, source }),
        None => Ok(false),
    }
}
