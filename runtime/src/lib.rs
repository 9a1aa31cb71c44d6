//! Blocking runtime primitives for klient.
//!
//! - **`handoff`**: one-shot completion signal from a worker thread to a waiting caller
//! - **`pool`**: the [`WorkerPool`] contract and a fixed-size [`ThreadPool`]
//! - **`drain`**: graceful-then-forced pool shutdown with bounded waits
//! - **`cancel`**: [`CancellationToken`] used to interrupt blocking waits
//! - **`config`**: TOML settings for pool sizing and drain timeouts
//!
//! Everything here runs on plain OS threads, and every blocking call takes an
//! explicit timeout.

pub mod cancel;
pub mod config;
pub mod drain;
pub mod handoff;
pub mod pool;

pub use cancel::CancellationToken;
pub use config::{ConfigError, RuntimeConfig};
pub use drain::{DrainConfig, drain, drain_outcome, shutdown};
pub use handoff::{
    DepositError, HandoffError, HandoffReceiver, HandoffSender, handoff_channel, wait_until_ready,
};
pub use klient_types::{BoxError, DrainOutcome, Signal, StopMode};
pub use pool::{Interrupted, PoolConfig, PoolError, Task, ThreadPool, WorkerPool};
