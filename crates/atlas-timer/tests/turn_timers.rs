//! Integration tests for keyed turn timers.
//!
//! Uses `start_paused = true` so the clock only moves when every task is
//! idle (auto-advance) or when a test calls `time::advance` explicitly.

use std::time::Duration;

use atlas_timer::{Expiry, TurnTimers};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, Instant};

// =========================================================================
// Helpers
// =========================================================================

const TURN: Duration = Duration::from_secs(30);

fn timers() -> (TurnTimers<u64>, UnboundedReceiver<Expiry<u64>>) {
    TurnTimers::new(TURN)
}

/// Lets spawned timer tasks run up to their next await point.
async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

// =========================================================================
// Arming and firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_timer_fires_after_duration() {
    let (mut t, mut rx) = timers();
    let start = Instant::now();
    let generation = t.start(7);
    assert!(t.is_armed(7));
    assert_eq!(t.generation(7), Some(generation));

    let expiry = rx.recv().await.unwrap();
    assert_eq!(expiry, Expiry { key: 7, generation });
    assert!(Instant::now() - start >= TURN);
}

#[tokio::test(start_paused = true)]
async fn test_timer_does_not_fire_early() {
    let (mut t, mut rx) = timers();
    t.start(1);
    settle().await;

    time::advance(TURN - Duration::from_millis(1)).await;
    settle().await;
    assert!(rx.try_recv().is_err());

    time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert!(rx.try_recv().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_remaining_counts_down() {
    let (mut t, _rx) = timers();
    t.start(1);
    assert_eq!(t.remaining(1), Some(TURN));
    time::advance(Duration::from_secs(10)).await;
    assert_eq!(t.remaining(1), Some(Duration::from_secs(20)));
    assert_eq!(t.remaining(2), None);
}

#[tokio::test(start_paused = true)]
async fn test_start_with_custom_duration() {
    let (mut t, mut rx) = timers();
    let start = Instant::now();
    t.start_with(1, Duration::from_secs(5));
    rx.recv().await.unwrap();
    assert!(Instant::now() - start < TURN);
}

#[tokio::test(start_paused = true)]
async fn test_enormous_duration_arms_without_overflow() {
    let (mut t, mut rx) = timers();
    t.start_with(1, Duration::MAX);
    assert!(t.is_armed(1));
    assert!(t.remaining(1).unwrap() > Duration::from_secs(86_400 * 365));

    let fired = time::timeout(Duration::from_secs(86_400 * 365), rx.recv()).await;
    assert!(fired.is_err());
}

// =========================================================================
// At most one timer per key
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_previous_timer() {
    let (mut t, mut rx) = timers();
    let first = t.start(1);
    time::advance(Duration::from_secs(20)).await;
    let second = t.start(1);
    assert_ne!(first, second);
    assert_eq!(t.len(), 1);

    let expiry = rx.recv().await.unwrap();
    assert_eq!(expiry.generation, second);
    assert!(t.claim(&expiry));

    // The first timer was aborted: nothing else ever arrives.
    let more = time::timeout(Duration::from_secs(120), rx.recv()).await;
    assert!(more.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_keys_are_independent() {
    let (mut t, mut rx) = timers();
    t.start_with(1, Duration::from_secs(10));
    t.start_with(2, Duration::from_secs(5));
    t.cancel(1);

    let expiry = rx.recv().await.unwrap();
    assert_eq!(expiry.key, 2);
    assert!(t.claim(&expiry));
    assert!(t.is_empty());
}

// =========================================================================
// Cancellation and claiming
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_expiry() {
    let (mut t, mut rx) = timers();
    t.start(1);
    assert!(t.cancel(1));
    assert!(!t.is_armed(1));

    let result = time::timeout(TURN * 4, rx.recv()).await;
    assert!(result.is_err(), "cancelled timer must not fire");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_idempotent() {
    let (mut t, _rx) = timers();
    assert!(!t.cancel(1));
    t.start(1);
    assert!(t.cancel(1));
    assert!(!t.cancel(1));
}

#[tokio::test(start_paused = true)]
async fn test_stale_expiry_is_rejected_after_rearm() {
    let (mut t, mut rx) = timers();
    t.start(1);
    let fired = rx.recv().await.unwrap();

    // An answer arrives before the expiry is handled and re-arms the key.
    let fresh = t.start(1);
    assert!(!t.claim(&fired));
    assert_eq!(t.generation(1), Some(fresh));
}

#[tokio::test(start_paused = true)]
async fn test_stale_expiry_is_rejected_after_cancel() {
    let (mut t, mut rx) = timers();
    t.start(1);
    let fired = rx.recv().await.unwrap();
    t.cancel(1);
    assert!(!t.claim(&fired));
}

#[tokio::test(start_paused = true)]
async fn test_claim_succeeds_once() {
    let (mut t, mut rx) = timers();
    t.start(1);
    let fired = rx.recv().await.unwrap();
    assert!(t.claim(&fired));
    assert!(!t.is_armed(1));
    assert!(!t.claim(&fired));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_and_drop_silence_everything() {
    let (mut t, mut rx) = timers();
    t.start(1);
    t.start(2);
    t.cancel_all();
    assert!(t.is_empty());
    t.start(3);
    drop(t);

    // Every sender is gone once the aborted tasks are reaped.
    let result = time::timeout(TURN * 4, rx.recv()).await;
    assert!(matches!(result, Ok(None)));
}
