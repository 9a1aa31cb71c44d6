//! Worker pools that can be drained.
//!
//! [`WorkerPool`] is the contract the drain sequencer consumes. [`ThreadPool`]
//! is the in-tree implementation: a fixed set of named OS threads pulling
//! boxed tasks from a bounded FIFO queue.
//!
//! # Lifecycle
//!
//! ```text
//! Running ──request_stop(Graceful)──> Stopped ──queue empty, workers exit──> Terminated
//!    │                                   │
//!    └──────request_stop(Forced)─────────┴──> queue discarded, task token cancelled
//! ```
//!
//! Forced stop cannot preempt a running closure. It cancels the
//! [`CancellationToken`] every task receives, and tasks are expected to poll it.

use std::collections::VecDeque;
use std::io;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use klient_types::StopMode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;

/// Granularity at which [`ThreadPool::await_termination`] rechecks the
/// caller's cancellation token.
const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A unit of work. The token fires when the pool is force-stopped.
pub type Task = Box<dyn FnOnce(&CancellationToken) + Send + 'static>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool is stopped and no longer accepts tasks")]
    Stopped,
    #[error("task queue is full ({capacity} pending)")]
    QueueFull { capacity: usize },
    #[error("failed to spawn worker thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// The caller's cancellation token fired while it was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wait was interrupted")]
pub struct Interrupted;

/// Operations a drain sequence needs from a pool.
///
/// Implementations must make every method safe to call concurrently with
/// [`WorkerPool::submit`].
pub trait WorkerPool {
    fn submit(&self, task: Task) -> Result<(), PoolError>;

    /// Stop accepting tasks. `Forced` also discards queued tasks and cancels
    /// running ones. Returns how many queued tasks were discarded.
    fn request_stop(&self, mode: StopMode) -> usize;

    /// Block until terminated, `timeout` elapses, or `interrupt` fires.
    ///
    /// An already-terminated pool returns `Ok(true)` even if `interrupt` is set.
    fn await_termination(
        &self,
        timeout: Duration,
        interrupt: &CancellationToken,
    ) -> Result<bool, Interrupted>;

    fn is_stopped(&self) -> bool;

    fn is_terminated(&self) -> bool;
}

/// Sizing for a [`ThreadPool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    /// Worker threads are named `{thread_name}-{index}`.
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
            thread_name: "klient-worker".to_owned(),
        }
    }
}

#[derive(Default)]
struct State {
    queue: VecDeque<Task>,
    stopped: bool,
    live_workers: usize,
    running: usize,
}

impl State {
    fn is_terminated(&self) -> bool {
        self.stopped && self.live_workers == 0
    }
}

struct Shared {
    state: Mutex<State>,
    capacity: usize,
    /// Workers park here waiting for tasks or stop.
    work_ready: Condvar,
    /// Awaiters park here waiting for the last worker to exit.
    terminated: Condvar,
    task_cancel: CancellationToken,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed-size pool of OS threads.
///
/// Dropping the pool requests a graceful stop but does not block; workers
/// finish the queue and exit on their own.
pub struct ThreadPool {
    shared: Arc<Shared>,
}

impl ThreadPool {
    pub fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        let workers = config.workers.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            capacity: config.queue_capacity.max(1),
            work_ready: Condvar::new(),
            terminated: Condvar::new(),
            task_cancel: CancellationToken::new(),
        });
        let pool = Self { shared };

        for index in 0..workers {
            let name = format!("{}-{index}", config.thread_name);
            let worker = Arc::clone(&pool.shared);
            // Count the worker before it starts so termination can't be observed early.
            pool.shared.lock().live_workers += 1;
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&worker));
            if let Err(source) = spawned {
                let mut state = pool.shared.lock();
                state.live_workers -= 1;
                drop(state);
                pool.request_stop(StopMode::Forced);
                return Err(PoolError::Spawn { name, source });
            }
        }

        debug!(
            workers,
            queue_capacity = pool.shared.capacity,
            "Worker pool started"
        );
        Ok(pool)
    }

    /// Submit a closure. Convenience over [`WorkerPool::submit`].
    pub fn execute<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce(&CancellationToken) + Send + 'static,
    {
        self.submit(Box::new(task))
    }

    /// Tasks queued but not yet picked up.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Tasks currently executing on a worker.
    #[must_use]
    pub fn running(&self) -> usize {
        self.shared.lock().running
    }
}

impl WorkerPool for ThreadPool {
    fn submit(&self, task: Task) -> Result<(), PoolError> {
        let mut state = self.shared.lock();
        if state.stopped {
            return Err(PoolError::Stopped);
        }
        if state.queue.len() >= self.shared.capacity {
            return Err(PoolError::QueueFull {
                capacity: self.shared.capacity,
            });
        }
        state.queue.push_back(task);
        drop(state);
        self.shared.work_ready.notify_one();
        Ok(())
    }

    fn request_stop(&self, mode: StopMode) -> usize {
        let mut state = self.shared.lock();
        state.stopped = true;
        let discarded = if mode.is_forced() {
            mem::take(&mut state.queue)
        } else {
            VecDeque::new()
        };
        let running = state.running;
        drop(state);

        if mode.is_forced() {
            self.shared.task_cancel.cancel();
        }
        self.shared.work_ready.notify_all();

        let abandoned = discarded.len();
        debug!(?mode, abandoned, running, "Worker pool stop requested");
        // Discarded closures are dropped here, outside the lock.
        drop(discarded);
        abandoned
    }

    fn await_termination(
        &self,
        timeout: Duration,
        interrupt: &CancellationToken,
    ) -> Result<bool, Interrupted> {
        // `None` means the timeout is too large to represent; wait without a deadline.
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.lock();
        loop {
            if state.is_terminated() {
                return Ok(true);
            }
            if interrupt.is_cancelled() {
                return Err(Interrupted);
            }
            let slice = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(false);
                    }
                    remaining.min(INTERRUPT_POLL_INTERVAL)
                }
                None => INTERRUPT_POLL_INTERVAL,
            };
            state = self
                .shared
                .terminated
                .wait_timeout(state, slice)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    fn is_terminated(&self) -> bool {
        self.shared.lock().is_terminated()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Best-effort stop; do not block in Drop.
        if !self.is_stopped() {
            self.request_stop(StopMode::Graceful);
        }
    }
}

fn worker_loop(shared: &Shared) {
    while let Some(task) = next_task(shared) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task(&shared.task_cancel)));
        if outcome.is_err() {
            let current = thread::current();
            warn!(
                worker = current.name().unwrap_or("unnamed"),
                "Task panicked; worker continues"
            );
        }
        shared.lock().running -= 1;
    }

    let mut state = shared.lock();
    state.live_workers -= 1;
    if state.is_terminated() {
        shared.terminated.notify_all();
        debug!("Worker pool terminated");
    }
}

/// Next task to run, or `None` once the pool is stopped and the queue is empty.
fn next_task(shared: &Shared) -> Option<Task> {
    let mut state = shared.lock();
    loop {
        if let Some(task) = state.queue.pop_front() {
            state.running += 1;
            return Some(task);
        }
        if state.stopped {
            return None;
        }
        state = shared
            .work_ready
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
