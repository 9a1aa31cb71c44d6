//! Drain sequencing against a real thread pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use klient_runtime::{
    CancellationToken, DrainConfig, DrainOutcome, WorkerPool, drain, drain_outcome, shutdown,
};

use crate::common::{pool, stubborn};

fn short() -> DrainConfig {
    DrainConfig::new(Duration::from_millis(100), Duration::from_millis(100))
}

#[test]
fn drains_finished_work_within_grace_period() {
    let pool = pool(2);
    let done = Arc::new(AtomicUsize::new(0));
    let cancelled = Arc::new(AtomicUsize::new(0));
    for _ in 0..6 {
        let done = Arc::clone(&done);
        let cancelled = Arc::clone(&cancelled);
        pool.execute(move |cancel| {
            thread::sleep(Duration::from_millis(5));
            if cancel.is_cancelled() {
                cancelled.fetch_add(1, Ordering::SeqCst);
            }
            done.fetch_add(1, Ordering::SeqCst);
        })
        .expect("submit");
    }

    let outcome = drain_outcome(
        Some(&pool),
        &DrainConfig::default(),
        &CancellationToken::new(),
    );

    assert_eq!(outcome, DrainOutcome::CompletedCleanly);
    assert!(pool.is_terminated());
    assert_eq!(done.load(Ordering::SeqCst), 6);
    // No forced cancellation was issued.
    assert_eq!(cancelled.load(Ordering::SeqCst), 0);
}

#[test]
fn escalates_to_forced_cancellation_for_cooperative_tasks() {
    let pool = pool(1);
    let saw_cancel = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&saw_cancel);
    pool.execute(move |cancel| {
        if cancel.wait_timeout(Duration::from_secs(10)) {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    })
    .expect("submit");

    let start = Instant::now();
    let outcome = drain_outcome(Some(&pool), &short(), &CancellationToken::new());

    assert_eq!(outcome, DrainOutcome::ForcedTermination);
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(saw_cancel.load(Ordering::SeqCst), 1);
    assert!(pool.is_terminated());
}

#[test]
fn gives_up_on_task_that_ignores_cancellation() {
    let pool = pool(1);
    let release = CancellationToken::new();
    pool.execute(stubborn(release.clone())).expect("submit");

    let start = Instant::now();
    let terminated = drain(Some(&pool), &short(), &CancellationToken::new());
    let elapsed = start.elapsed();

    assert!(!terminated);
    assert!(!pool.is_terminated());
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(5));

    release.cancel();
    assert!(
        pool.await_termination(Duration::from_secs(5), &CancellationToken::new())
            .expect("not interrupted")
    );
}

#[test]
fn forced_stop_discards_queued_tasks() {
    let pool = pool(1);
    let release = CancellationToken::new();
    let ran = Arc::new(AtomicUsize::new(0));
    pool.execute(stubborn(release.clone())).expect("submit blocker");
    for _ in 0..3 {
        let ran = Arc::clone(&ran);
        pool.execute(move |_| {
            ran.fetch_add(1, Ordering::SeqCst);
        })
        .expect("submit queued");
    }

    let outcome = drain_outcome(Some(&pool), &short(), &CancellationToken::new());
    assert!(matches!(outcome, DrainOutcome::ForcedAfterTimeout { .. }));
    assert_eq!(pool.queued(), 0);

    release.cancel();
    assert!(
        pool.await_termination(Duration::from_secs(5), &CancellationToken::new())
            .expect("not interrupted")
    );
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn interrupt_escalates_immediately_and_stays_set() {
    let pool = pool(1);
    let release = CancellationToken::new();
    let forced = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&forced);
    let gate = release.clone();
    pool.execute(move |cancel| {
        // Finishes on forced cancellation or when the test releases it.
        while !cancel.is_cancelled() && !gate.is_cancelled() {
            thread::sleep(Duration::from_millis(2));
        }
        if cancel.is_cancelled() {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    })
    .expect("submit");

    let interrupt = CancellationToken::new();
    let remote = interrupt.clone();
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.cancel();
    });

    let start = Instant::now();
    let config = DrainConfig::new(Duration::from_secs(30), Duration::from_secs(30));
    let outcome = drain_outcome(Some(&pool), &config, &interrupt);
    interrupter.join().expect("interrupter thread");

    assert_eq!(outcome, DrainOutcome::Interrupted);
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(interrupt.is_cancelled());

    release.cancel();
    assert!(
        pool.await_termination(Duration::from_secs(5), &CancellationToken::new())
            .expect("not interrupted")
    );
    assert_eq!(forced.load(Ordering::SeqCst), 1);
}

#[test]
fn second_drain_on_terminated_pool_returns_immediately() {
    let pool = pool(2);
    assert!(shutdown(Some(&pool)));

    let start = Instant::now();
    let interrupt = CancellationToken::new();
    interrupt.cancel();
    assert!(drain(Some(&pool), &DrainConfig::default(), &interrupt));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn unbounded_timeouts_do_not_overflow() {
    let idle = pool(1);
    let unbounded = DrainConfig::new(Duration::MAX, Duration::MAX);
    assert!(drain(Some(&idle), &unbounded, &CancellationToken::new()));

    // Forced wait with no deadline still ends once the task honours cancellation.
    let busy = pool(1);
    busy.execute(|cancel| {
        cancel.wait_timeout(Duration::MAX);
    })
    .expect("submit");
    let config = DrainConfig::new(Duration::from_millis(20), Duration::MAX);
    let outcome = drain_outcome(Some(&busy), &config, &CancellationToken::new());
    assert_eq!(outcome, DrainOutcome::ForcedTermination);
    assert!(busy.is_terminated());
}

#[test]
fn absent_pool_returns_false() {
    assert!(!shutdown::<klient_runtime::ThreadPool>(None));
}

#[test]
fn drain_works_through_trait_object() {
    let pool = pool(1);
    let dyn_pool: &dyn WorkerPool = &pool;
    assert!(drain(Some(dyn_pool), &short(), &CancellationToken::new()));
}
