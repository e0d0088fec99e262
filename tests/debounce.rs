use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use watchtask::watch::{DEFAULT_DELAY, Debouncer};
use watchtask_test_utils::{RecordingExecutor, init_tracing};

const DELAY: Duration = Duration::from_millis(100);

fn debouncer(executor: &RecordingExecutor) -> Debouncer {
    Debouncer::new(Arc::new(executor.clone()), DELAY)
}

#[test]
fn default_delay_is_ten_milliseconds() {
    assert_eq!(DEFAULT_DELAY, Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn burst_of_triggers_runs_once_after_the_last() {
    init_tracing();
    let executor = RecordingExecutor::new();
    let debouncer = debouncer(&executor);
    let start = Instant::now();

    debouncer.trigger("build");
    sleep(DELAY / 2).await;
    debouncer.trigger("build");
    sleep(DELAY / 2).await;
    debouncer.trigger("build");

    // Quiet period not yet over.
    sleep(DELAY - Duration::from_millis(1)).await;
    assert!(executor.calls().is_empty());
    assert_eq!(debouncer.pending(), vec!["build".to_string()]);

    sleep(DELAY).await;
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "build");

    let fired_after = calls[0].1 - start;
    assert!(fired_after >= DELAY * 2, "fired too early: {fired_after:?}");
    assert!(fired_after < DELAY * 2 + Duration::from_millis(10), "fired too late: {fired_after:?}");
    assert!(debouncer.pending().is_empty());
}

#[tokio::test(start_paused = true)]
async fn distinct_tasks_are_not_coalesced() {
    init_tracing();
    let executor = RecordingExecutor::new();
    let debouncer = debouncer(&executor);

    debouncer.trigger("frontend");
    sleep(Duration::from_millis(5)).await;
    debouncer.trigger("backend");

    sleep(DELAY * 2).await;
    let mut names = executor.names();
    names.sort();
    assert_eq!(names, vec!["backend", "frontend"]);
}

#[tokio::test(start_paused = true)]
async fn triggers_after_firing_start_a_new_timer() {
    init_tracing();
    let executor = RecordingExecutor::new();
    let debouncer = debouncer(&executor);

    debouncer.trigger("test");
    sleep(DELAY * 2).await;
    debouncer.trigger("test");
    sleep(DELAY * 2).await;

    assert_eq!(executor.count("test"), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_exec_leaves_the_debouncer_usable() {
    init_tracing();
    let executor = RecordingExecutor::new();
    executor.fail("lint");
    let debouncer = debouncer(&executor);

    debouncer.trigger("lint");
    sleep(DELAY * 2).await;
    assert!(debouncer.pending().is_empty());

    debouncer.trigger("lint");
    sleep(DELAY * 2).await;
    assert_eq!(executor.count("lint"), 2);
}
