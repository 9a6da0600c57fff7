//! The session manager: one slot and at most one turn timer per key.
//!
//! # Concurrency
//!
//! A session is touched by two event sources: inbound commands (answers,
//! joins, leaves) and turn-timer expiries. Both go through the slot's
//! mutex, and the slot lock is held for the whole engine call, including
//! the validator await. That makes every session single-writer. Sessions
//! under different keys share nothing but the key → slot map, whose lock is
//! only held long enough to fetch a slot.
//!
//! The map lock is never held while waiting for a slot lock. Teardown
//! empties the slot and then drops it from the map, both under the slot
//! lock, so the map only holds live lobbies and games. A caller that
//! fetched a slot just before it was dropped finds it empty; `join` then
//! starts over with a fresh slot instead of reviving the orphan.
//!
//! Before an answer reaches the engine the session's timer is cancelled,
//! and a new one is armed only after the engine returns. An expiry that
//! was already in flight finds its generation gone when it finally gets
//! the slot lock, and does nothing.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use atlas_game::{GameConfig, GameEngine, Lobby, Validator};
use atlas_protocol::{
    AnswerOutcome, LeaveOutcome, Player, PlayerId, SessionEvent, SessionKey,
};
use atlas_timer::{Expiry, TurnTimers};
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tokio::time::Duration;

use crate::slot::SessionSlot;
use crate::{SessionError, SessionPhase, SessionStatus};

type SharedSlot<V> = Arc<Mutex<SessionSlot<V>>>;

/// What a call to [`SessionManager::leave`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveResult {
    /// Left a lobby. When `remaining` is 0 the lobby was discarded.
    Lobby { player: Player, remaining: usize },
    /// Walked out of a running game and was eliminated.
    Game(LeaveOutcome),
}

struct Inner<V: Validator> {
    config: GameConfig,
    validator: Arc<V>,
    slots: Mutex<HashMap<SessionKey, SharedSlot<V>>>,
    timers: Mutex<TurnTimers<SessionKey>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

/// Keyed registry of lobbies and running games.
///
/// Cheap to clone: every clone drives the same sessions. Must be created
/// inside a Tokio runtime, since it spawns the task that turns timer
/// expiries into timeouts.
pub struct SessionManager<V: Validator> {
    inner: Arc<Inner<V>>,
}

impl<V: Validator> Clone for SessionManager<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Validator> SessionManager<V> {
    /// Creates a manager and returns the stream of [`SessionEvent`]s it
    /// publishes. The config is [validated](GameConfig::validated) first.
    pub fn new(
        config: GameConfig,
        validator: Arc<V>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let config = config.validated();
        let (timers, expiries) = TurnTimers::new(config.turn_timeout);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(Inner {
            config,
            validator,
            slots: Mutex::new(HashMap::new()),
            timers: Mutex::new(timers),
            events: events_tx,
        });
        tokio::spawn(dispatch_expiries(Arc::downgrade(&inner), expiries));

        (Self { inner }, events_rx)
    }

    /// The config in force, after validation.
    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    // -----------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------

    /// Adds a player to the session's lobby, opening one (with this player
    /// as creator) if the slot is empty. Returns the new lobby size.
    ///
    /// # Errors
    /// - [`SessionError::GameInProgress`] — a game is already running
    /// - [`SessionError::Lobby`] — already joined
    pub async fn join(
        &self,
        key: SessionKey,
        player: PlayerId,
        name: impl Into<String>,
    ) -> Result<usize, SessionError> {
        let mut slot = loop {
            let shared = self.inner.slot(key).await;
            let guard = Arc::clone(&shared).lock_owned().await;
            let live = !matches!(*guard, SessionSlot::Empty);
            if live || self.inner.is_registered(key, &shared).await {
                break guard;
            }
        };

        if matches!(*slot, SessionSlot::Empty) {
            let lobby = Lobby::new(key, player).with_min_players(self.inner.config.min_players);
            *slot = SessionSlot::Lobby(lobby);
            tracing::info!(session = %key, creator = %player, "lobby opened");
            self.inner.emit(SessionEvent::LobbyOpened {
                session: key,
                creator: player,
            });
        }

        let SessionSlot::Lobby(lobby) = &mut *slot else {
            return Err(SessionError::GameInProgress(key));
        };
        lobby.join(player, name)?;

        let lobby_size = lobby.len();
        if let Some(joined) = lobby.players().last().cloned() {
            self.inner.emit(SessionEvent::PlayerJoined {
                session: key,
                player: joined,
                lobby_size,
            });
        }
        Ok(lobby_size)
    }

    /// Locks the lobby, starts the game, and arms the first turn timer.
    /// Returns the turn order.
    ///
    /// # Errors
    /// - [`SessionError::NoSession`] — no lobby is open
    /// - [`SessionError::GameInProgress`] — already started
    /// - [`SessionError::Lobby`] — too few players; the lobby stays open
    pub async fn start(&self, key: SessionKey) -> Result<Vec<Player>, SessionError> {
        let slot = self.inner.existing_slot(key).await.ok_or(SessionError::NoSession(key))?;
        let mut slot = slot.lock().await;

        let lobby = match &mut *slot {
            SessionSlot::Empty => return Err(SessionError::NoSession(key)),
            SessionSlot::Active { .. } => return Err(SessionError::GameInProgress(key)),
            SessionSlot::Lobby(lobby) => lobby,
        };
        let order = lobby.lock()?;
        let creator = lobby.creator();
        let turn_order = order.players().to_vec();

        let engine = GameEngine::new(order, &self.inner.config, Arc::clone(&self.inner.validator));
        *slot = SessionSlot::Active { creator, engine };
        tracing::info!(session = %key, players = turn_order.len(), "session started");

        self.inner.emit(SessionEvent::GameStarted {
            session: key,
            turn_order: turn_order.clone(),
        });
        self.inner.timers.lock().await.start(key);
        Ok(turn_order)
    }

    // -----------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------

    /// Submits an answer on behalf of `player`.
    ///
    /// The session's timer is cancelled before the engine sees the answer
    /// and re-armed after it returns, unless the answer ended the game.
    ///
    /// # Errors
    /// - [`SessionError::NoSession`] / [`SessionError::NoGame`] — nothing to
    ///   answer in
    /// - [`SessionError::NotYourTurn`] — `player` doesn't hold the turn;
    ///   the timer is left alone
    pub async fn submit_answer(
        &self,
        key: SessionKey,
        player: PlayerId,
        text: &str,
    ) -> Result<AnswerOutcome, SessionError> {
        let slot = self.inner.existing_slot(key).await.ok_or(SessionError::NoSession(key))?;
        let mut slot = slot.lock().await;

        let engine = match &mut *slot {
            SessionSlot::Empty => return Err(SessionError::NoSession(key)),
            SessionSlot::Lobby(_) => return Err(SessionError::NoGame(key)),
            SessionSlot::Active { engine, .. } => engine,
        };
        if engine.current_player().id != player {
            return Err(SessionError::NotYourTurn(player));
        }

        self.inner.timers.lock().await.cancel(key);
        let outcome = engine.submit_answer(text).await;

        self.inner.emit(SessionEvent::Answer {
            session: key,
            outcome: outcome.clone(),
        });
        match &outcome.winner {
            Some(winner) => self.inner.finish(&mut slot, key, winner.clone()).await,
            None => {
                self.inner.timers.lock().await.start(key);
            }
        }
        Ok(outcome)
    }

    /// Removes a player from the session.
    ///
    /// In a lobby this is a plain leave; the lobby is discarded once empty.
    /// In a game the player is eliminated. If they held the turn, the next
    /// player gets a fresh timer; if one player remains, the session ends.
    ///
    /// # Errors
    /// - [`SessionError::NoSession`] — nothing open
    /// - [`SessionError::Lobby`] / [`SessionError::Game`] — not a member,
    ///   or already eliminated
    pub async fn leave(
        &self,
        key: SessionKey,
        player: PlayerId,
    ) -> Result<LeaveResult, SessionError> {
        let slot = self.inner.existing_slot(key).await.ok_or(SessionError::NoSession(key))?;
        let mut slot = slot.lock().await;

        match &mut *slot {
            SessionSlot::Empty => Err(SessionError::NoSession(key)),
            SessionSlot::Lobby(lobby) => {
                let left = lobby.leave(player)?;
                let remaining = lobby.len();
                self.inner.emit(SessionEvent::PlayerLeftLobby {
                    session: key,
                    player,
                    lobby_size: remaining,
                });
                if remaining == 0 {
                    *slot = SessionSlot::Empty;
                    self.inner.retire(key).await;
                    tracing::info!(session = %key, "lobby discarded");
                }
                Ok(LeaveResult::Lobby {
                    player: left,
                    remaining,
                })
            }
            SessionSlot::Active { engine, .. } => {
                let outcome = engine.leave_game(player)?;
                self.inner.emit(SessionEvent::PlayerLeftGame {
                    session: key,
                    outcome: outcome.clone(),
                });
                if let Some(winner) = &outcome.winner {
                    self.inner.finish(&mut slot, key, winner.clone()).await;
                } else if outcome.held_turn {
                    self.inner.timers.lock().await.start(key);
                }
                Ok(LeaveResult::Game(outcome))
            }
        }
    }

    /// Tears down a lobby or game before it finishes.
    ///
    /// Allowed for the session's creator, or for anyone when `moderator`
    /// is `true` (the caller vouches for the permission).
    ///
    /// # Errors
    /// - [`SessionError::NoSession`] — nothing open
    /// - [`SessionError::NotPermitted`] — neither creator nor moderator
    pub async fn stop(
        &self,
        key: SessionKey,
        requester: PlayerId,
        moderator: bool,
    ) -> Result<(), SessionError> {
        let slot = self.inner.existing_slot(key).await.ok_or(SessionError::NoSession(key))?;
        let mut slot = slot.lock().await;

        let creator = slot.creator().ok_or(SessionError::NoSession(key))?;
        if requester != creator && !moderator {
            return Err(SessionError::NotPermitted(requester));
        }

        self.inner.timers.lock().await.cancel(key);
        *slot = SessionSlot::Empty;
        self.inner.retire(key).await;
        tracing::info!(session = %key, by = %requester, "session stopped");
        self.inner.emit(SessionEvent::Stopped {
            session: key,
            by: requester,
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------

    /// (Re)arms the turn timer of a running game, replacing any timer
    /// already armed. Returns the timer generation.
    ///
    /// # Errors
    /// [`SessionError::NoSession`] / [`SessionError::NoGame`] if no game
    /// is running.
    pub async fn start_timer(&self, key: SessionKey) -> Result<u64, SessionError> {
        let slot = self.inner.existing_slot(key).await.ok_or(SessionError::NoSession(key))?;
        let slot = slot.lock().await;
        match &*slot {
            SessionSlot::Empty => Err(SessionError::NoSession(key)),
            SessionSlot::Lobby(_) => Err(SessionError::NoGame(key)),
            SessionSlot::Active { .. } => Ok(self.inner.timers.lock().await.start(key)),
        }
    }

    /// Cancels the session's turn timer. Returns `true` if one was armed.
    pub async fn cancel_timer(&self, key: SessionKey) -> bool {
        self.inner.timers.lock().await.cancel(key)
    }

    /// Returns `true` if a turn timer is armed for the session.
    pub async fn has_timer(&self, key: SessionKey) -> bool {
        self.inner.timers.lock().await.is_armed(key)
    }

    /// Time left on the session's turn timer.
    pub async fn time_remaining(&self, key: SessionKey) -> Option<Duration> {
        self.inner.timers.lock().await.remaining(key)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// What the session holds right now, or `None` if it's empty.
    pub async fn status(&self, key: SessionKey) -> Option<SessionStatus> {
        let slot = self.inner.existing_slot(key).await?;
        let slot = slot.lock().await;
        slot.status()
    }

    /// Number of sessions currently holding a lobby or a game.
    pub async fn session_count(&self) -> usize {
        self.inner.live().await
    }

    /// The session's lifecycle phase.
    pub async fn phase(&self, key: SessionKey) -> SessionPhase {
        match self.inner.existing_slot(key).await {
            Some(slot) => slot.lock().await.phase(),
            None => SessionPhase::Empty,
        }
    }
}

impl<V: Validator> Inner<V> {
    /// Fetches the slot for `key`, creating an empty one if needed.
    async fn slot(&self, key: SessionKey) -> SharedSlot<V> {
        let mut slots = self.slots.lock().await;
        Arc::clone(
            slots
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(SessionSlot::Empty))),
        )
    }

    async fn existing_slot(&self, key: SessionKey) -> Option<SharedSlot<V>> {
        self.slots.lock().await.get(&key).cloned()
    }

    /// Returns `true` if `slot` is still the one registered for `key`.
    async fn is_registered(&self, key: SessionKey, slot: &SharedSlot<V>) -> bool {
        self.slots
            .lock()
            .await
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Drops an emptied slot from the map. Call with that slot's lock held;
    /// only a registered slot can be non-empty, so the entry is always the
    /// caller's own.
    async fn retire(&self, key: SessionKey) {
        self.slots.lock().await.remove(&key);
    }

    /// Number of keys holding a lobby or game (plus any being opened).
    async fn live(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Publishes an event. Dropped silently if nobody is listening.
    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Retires a finished game: disarms the timer and empties the slot.
    async fn finish(
        &self,
        slot: &mut MutexGuard<'_, SessionSlot<V>>,
        key: SessionKey,
        winner: Player,
    ) {
        self.timers.lock().await.cancel(key);
        **slot = SessionSlot::Empty;
        self.retire(key).await;
        tracing::info!(session = %key, winner = %winner.id, "session finished");
        self.emit(SessionEvent::GameOver {
            session: key,
            winner,
        });
    }

    /// Applies a timeout for an expiry, unless it went stale while it
    /// waited for the slot.
    async fn on_expiry(&self, expiry: Expiry<SessionKey>) {
        let key = expiry.key;
        let Some(slot) = self.existing_slot(key).await else {
            return;
        };
        let mut slot = slot.lock().await;
        if !self.timers.lock().await.claim(&expiry) {
            return;
        }

        let SessionSlot::Active { engine, .. } = &mut *slot else {
            tracing::debug!(session = %key, "expiry for a session with no game");
            return;
        };
        let outcome = match engine.handle_timeout() {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(session = %key, error = %err, "timeout ignored");
                return;
            }
        };

        // The next turn is armed before anyone hears about this one.
        let winner = outcome.winner.clone();
        if winner.is_none() {
            self.timers.lock().await.start(key);
        }
        self.emit(SessionEvent::Timeout {
            session: key,
            outcome,
        });
        if let Some(winner) = winner {
            self.finish(&mut slot, key, winner).await;
        }
    }
}

/// Turns timer expiries into timeouts, one task per expiry so a session
/// busy with a slow lookup never delays another session's timeout.
///
/// Holds only a weak reference: once every manager handle is gone the
/// timers are dropped, the expiry channel closes, and this task ends.
async fn dispatch_expiries<V: Validator>(
    inner: Weak<Inner<V>>,
    mut expiries: mpsc::UnboundedReceiver<Expiry<SessionKey>>,
) {
    while let Some(expiry) = expiries.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        tokio::spawn(async move {
            inner.on_expiry(expiry).await;
        });
    }
    tracing::debug!("expiry dispatcher stopped");
}
