//! Handoff waits between a pool task and the submitting thread.

use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

use klient_runtime::{
    HandoffError, Signal, StopMode, WorkerPool, handoff_channel, wait_until_ready,
};

use crate::common::pool;

#[derive(Debug)]
struct WatchError {
    resource: &'static str,
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch on {} was closed", self.resource)
    }
}

impl Error for WatchError {}

#[test]
fn task_signals_readiness_to_caller() {
    let pool = pool(1);
    let (tx, rx) = handoff_channel(1);
    pool.execute(move |_| {
        tx.ready(true).expect("deposit");
    })
    .expect("submit");

    assert!(wait_until_ready(&rx, Duration::from_secs(5)).expect("ready"));
    pool.request_stop(StopMode::Graceful);
}

#[test]
fn task_failure_reaches_caller_with_cause_chain() {
    let pool = pool(1);
    let (tx, rx) = handoff_channel(1);
    pool.execute(move |_| {
        tx.fail(WatchError { resource: "pods" }).expect("deposit");
    })
    .expect("submit");

    let err = wait_until_ready(&rx, Duration::from_secs(5)).expect_err("failure");
    let HandoffError::Failed { waiting_at, .. } = &err;
    assert!(waiting_at.file().ends_with("handoff.rs"));

    let cause = err.source().expect("cause");
    let watch = cause.downcast_ref::<WatchError>().expect("original type");
    assert_eq!(watch.resource, "pods");
}

#[test]
fn later_signals_are_left_for_the_next_wait() {
    let (tx, rx) = handoff_channel(4);
    tx.ready(true).expect("first");
    tx.fail(WatchError { resource: "svc" }).expect("second");

    assert!(wait_until_ready(&rx, Duration::from_secs(1)).expect("first wait"));
    match rx.try_receive(Duration::ZERO) {
        Some(Signal::Failed(err)) => assert_eq!(err.to_string(), "watch on svc was closed"),
        other => panic!("expected queued failure, got {other:?}"),
    }
}

#[test]
fn times_out_when_task_never_signals() {
    let pool = pool(1);
    let (tx, rx) = handoff_channel(1);
    pool.execute(move |cancel| {
        // Holds the sender without depositing until cancelled.
        cancel.wait_timeout(Duration::from_secs(10));
        drop(tx);
    })
    .expect("submit");

    let start = Instant::now();
    assert!(!wait_until_ready(&rx, Duration::from_millis(50)).expect("timeout"));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(5));

    pool.request_stop(StopMode::Forced);
}
