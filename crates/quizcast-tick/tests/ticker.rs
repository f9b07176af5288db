//! Integration tests for the ticker.
//!
//! Uses `start_paused` so Tokio auto-advances the clock whenever every task
//! is idle; `sleep_until` resolves instantly and tests stay deterministic.

use std::time::Duration;

use quizcast_tick::Ticker;

fn one_second() -> Ticker {
    Ticker::every(Duration::from_secs(1))
}

#[test]
fn test_disabled_ticker_reports_no_interval() {
    let t = Ticker::disabled();
    assert!(t.is_disabled());
    assert_eq!(t.interval(), None);
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_after_one_interval() {
    let start = tokio::time::Instant::now();
    let mut t = one_second();

    assert_eq!(t.wait_for_tick().await, 1);
    assert_eq!(t.tick_count(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_increment_monotonically() {
    let mut t = one_second();
    for expected in 1..=5 {
        assert_eq!(t.wait_for_tick().await, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_disabled_ticker_never_fires() {
    let mut t = Ticker::disabled();
    let result = tokio::time::timeout(Duration::from_secs(30), t.wait_for_tick()).await;
    assert!(result.is_err(), "disabled ticker should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_late_wakeup_schedules_next_tick_from_now() {
    let start = tokio::time::Instant::now();
    let mut t = one_second();

    tokio::time::advance(Duration::from_millis(3500)).await;
    assert_eq!(t.wait_for_tick().await, 1);
    assert_eq!(t.wait_for_tick().await, 2);

    assert_eq!(start.elapsed(), Duration::from_millis(4500));
}

// =========================================================================
// Restart / stop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_restart_pushes_next_tick_out() {
    let start = tokio::time::Instant::now();
    let mut t = one_second();

    tokio::time::advance(Duration::from_millis(600)).await;
    t.restart();
    t.wait_for_tick().await;

    assert_eq!(start.elapsed(), Duration::from_millis(1600));
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_does_not_revive() {
    let mut t = one_second();
    t.stop();
    t.restart();

    let result = tokio::time::timeout(Duration::from_secs(10), t.wait_for_tick()).await;
    assert!(result.is_err(), "stopped ticker should stay stopped");
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_permanent() {
    let mut t = one_second();
    t.stop();
    t.stop(); // idempotent

    assert!(t.is_stopped());
    let result = tokio::time::timeout(Duration::from_secs(10), t.wait_for_tick()).await;
    assert!(result.is_err(), "stopped ticker should not fire");
}
