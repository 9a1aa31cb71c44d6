//! Completion signals passed from a background producer to a waiting caller.

use std::error::Error;
use std::fmt;

/// Boxed, thread-safe error carried by [`Signal::Failed`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// The single value a producer deposits on a handoff channel.
///
/// The consumer pattern-matches on the tag instead of inspecting the runtime
/// type of whatever arrived.
pub enum Signal {
    /// The producer finished; the flag says whether the resource is ready.
    Ready(bool),
    /// The producer failed; the error is re-raised on the waiting side.
    Failed(BoxError),
}

impl Signal {
    #[must_use]
    pub const fn ready() -> Self {
        Self::Ready(true)
    }

    #[must_use]
    pub const fn not_ready() -> Self {
        Self::Ready(false)
    }

    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::Failed(error.into())
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<bool> for Signal {
    fn from(value: bool) -> Self {
        Self::Ready(value)
    }
}

impl<T, E> From<Result<T, E>> for Signal
where
    E: Into<BoxError>,
{
    /// `Ok(_)` maps to `Ready(true)`; any error maps to `Failed`.
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Ready(true),
            Err(e) => Self::Failed(e.into()),
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(ready) => f.debug_tuple("Ready").field(ready).finish(),
            Self::Failed(err) => f.debug_tuple("Failed").field(&err.to_string()).finish(),
        }
    }
}
