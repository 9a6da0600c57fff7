//! Keyed turn timers for Atlas.
//!
//! [`TurnTimers`] keeps at most one outstanding timer per key. Starting a
//! timer for a key cancels whatever was armed for it before; cancelling is
//! idempotent. When a timer runs out it does not call anybody: it sends an
//! [`Expiry`] on a channel, tagged with the generation it was armed with.
//!
//! # Stale expiries
//!
//! An expiry can be in flight while its key is re-armed or cancelled (an
//! answer arrived at the last moment). The consumer must therefore
//! [`claim`](TurnTimers::claim) each expiry before acting on it. A claim
//! only succeeds if that exact generation is still the one armed for the
//! key, so a stale expiry is recognised and dropped:
//!
//! ```ignore
//! while let Some(expiry) = expiries.recv().await {
//!     let mut session = lock_session(expiry.key).await;
//!     if !timers.lock().await.claim(&expiry) {
//!         continue; // re-armed or cancelled since it fired
//!     }
//!     session.handle_timeout();
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// Notice that the timer armed for `key` with `generation` ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry<K> {
    /// Which key's timer fired.
    pub key: K,
    /// The generation it was armed with. Generations are unique across
    /// every key of one [`TurnTimers`].
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// TurnTimers
// ---------------------------------------------------------------------------

struct Armed {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Registry of per-key countdown timers.
///
/// Each armed timer is a Tokio task sleeping until its deadline, so
/// [`start`](Self::start) must be called from within a Tokio runtime.
/// Dropping the registry aborts every outstanding timer.
pub struct TurnTimers<K> {
    duration: Duration,
    armed: HashMap<K, Armed>,
    next_generation: u64,
    expiries: mpsc::UnboundedSender<Expiry<K>>,
}

impl<K> TurnTimers<K>
where
    K: Copy + Eq + Hash + fmt::Display + Send + 'static,
{
    /// Creates an empty registry whose timers run for `duration`, plus the
    /// receiving end of the expiry channel.
    pub fn new(duration: Duration) -> (Self, mpsc::UnboundedReceiver<Expiry<K>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            duration,
            armed: HashMap::new(),
            next_generation: 1,
            expiries: tx,
        };
        (timers, rx)
    }

    /// Arms the timer for `key` with the default duration, cancelling any
    /// timer already armed for it. Returns the new generation.
    pub fn start(&mut self, key: K) -> u64 {
        self.start_with(key, self.duration)
    }

    /// Arms the timer for `key` with an explicit duration.
    pub fn start_with(&mut self, key: K, duration: Duration) -> u64 {
        self.cancel(key);

        let generation = self.next_generation;
        self.next_generation += 1;
        let now = Instant::now();
        let deadline = now.checked_add(duration).unwrap_or_else(|| far_future(now));
        let tx = self.expiries.clone();

        let handle = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            trace!(%key, generation, "turn timer fired");
            let _ = tx.send(Expiry { key, generation });
        });

        self.armed.insert(
            key,
            Armed {
                generation,
                deadline,
                handle,
            },
        );
        debug!(
            %key,
            generation,
            timeout_ms = duration.as_millis() as u64,
            "turn timer armed"
        );
        generation
    }

    /// Cancels the timer for `key`. Returns `true` if one was armed.
    ///
    /// Safe to call any number of times, including after the timer fired.
    pub fn cancel(&mut self, key: K) -> bool {
        match self.armed.remove(&key) {
            Some(armed) => {
                armed.handle.abort();
                debug!(%key, generation = armed.generation, "turn timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Accepts an expiry if its generation is still the one armed for its
    /// key, disarming that key. Returns `false` for stale expiries.
    ///
    /// A successful claim does not abort the timer task: it has already
    /// finished sleeping and may be the very task doing the claiming.
    pub fn claim(&mut self, expiry: &Expiry<K>) -> bool {
        match self.armed.get(&expiry.key) {
            Some(armed) if armed.generation == expiry.generation => {
                self.armed.remove(&expiry.key);
                true
            }
            _ => {
                trace!(
                    key = %expiry.key,
                    generation = expiry.generation,
                    "stale expiry ignored"
                );
                false
            }
        }
    }

    /// Cancels every armed timer.
    pub fn cancel_all(&mut self) {
        for (_, armed) in self.armed.drain() {
            armed.handle.abort();
        }
    }

    /// Returns `true` if a timer is armed for `key`.
    pub fn is_armed(&self, key: K) -> bool {
        self.armed.contains_key(&key)
    }

    /// The generation armed for `key`, if any.
    pub fn generation(&self, key: K) -> Option<u64> {
        self.armed.get(&key).map(|a| a.generation)
    }

    /// Time left before the timer for `key` runs out.
    pub fn remaining(&self, key: K) -> Option<Duration> {
        self.armed
            .get(&key)
            .map(|a| a.deadline.saturating_duration_since(Instant::now()))
    }

    /// Default timer duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    /// Returns `true` if no timer is armed.
    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

/// A deadline that never arrives in practice, for durations too long to add
/// to `now`.
fn far_future(now: Instant) -> Instant {
    // About 30 years.
    now + Duration::from_secs(86_400 * 365 * 30)
}

impl<K> Drop for TurnTimers<K> {
    fn drop(&mut self) {
        for (_, armed) in self.armed.drain() {
            armed.handle.abort();
        }
    }
}
