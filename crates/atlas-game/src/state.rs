//! Mutable snapshot of a game in progress.

use std::collections::HashSet;

use atlas_protocol::{GameSnapshot, Player, PlayerId};

use crate::TurnOrder;

/// Turn order, turn cursor, required letter, and used answers.
///
/// Invariants, maintained by the engine:
/// - the cursor points at a non-eliminated player while any remain;
/// - `used_words` only grows;
/// - the game is over iff at most one player is still active.
#[derive(Debug, Clone)]
pub struct GameState {
    players: Vec<Player>,
    current: usize,
    required_letter: Option<char>,
    used_words: HashSet<String>,
    started: bool,
    max_strikes: u32,
}

impl GameState {
    /// Starts a game from a locked roster. The first player in the roster
    /// holds the first turn, and any letter is accepted.
    pub fn new(order: TurnOrder, max_strikes: u32) -> Self {
        Self {
            players: order.into_players(),
            current: 0,
            required_letter: None,
            used_words: HashSet::new(),
            started: true,
            max_strikes: max_strikes.max(1),
        }
    }

    /// Every player in turn order, eliminated ones included.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Index of the turn cursor into [`players`](Self::players).
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The player who holds the turn.
    ///
    /// # Panics
    /// If the roster is empty, which a `TurnOrder` rules out.
    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    /// Letter the next answer must start with. `None` until the first
    /// answer is accepted.
    pub fn required_letter(&self) -> Option<char> {
        self.required_letter
    }

    /// Normalized answers accepted so far.
    pub fn used_words(&self) -> &HashSet<String> {
        &self.used_words
    }

    /// Returns `true` if this normalized answer was already accepted.
    pub fn is_used(&self, normalized: &str) -> bool {
        self.used_words.contains(normalized)
    }

    /// Strike limit for this game.
    pub fn max_strikes(&self) -> u32 {
        self.max_strikes
    }

    /// Returns `true` once the game has begun. Always `true` for a state
    /// built from a locked roster.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Players still in the game, in turn order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        let max = self.max_strikes;
        self.players.iter().filter(move |p| !p.is_eliminated(max))
    }

    /// Number of players still in the game.
    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    /// Returns `true` when at most one player is still active.
    pub fn is_game_over(&self) -> bool {
        self.active_count() <= 1
    }

    /// The last player standing, if exactly one remains.
    pub fn winner(&self) -> Option<&Player> {
        let mut active = self.active_players();
        match (active.next(), active.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// The current player, or `None` once the game is over.
    pub fn next_player(&self) -> Option<&Player> {
        if self.is_game_over() {
            None
        } else {
            Some(self.current_player())
        }
    }

    /// Read-only copy for status displays.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            current_player: self.current_player().clone(),
            required_letter: self.required_letter,
            words_used: self.used_words.len(),
            max_strikes: self.max_strikes,
        }
    }

    pub(crate) fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current]
    }

    pub(crate) fn position(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub(crate) fn player_at_mut(&mut self, index: usize) -> &mut Player {
        &mut self.players[index]
    }

    /// Records an accepted answer and moves the required letter.
    pub(crate) fn accept(&mut self, normalized: String, next_letter: char) {
        self.used_words.insert(normalized);
        self.required_letter = Some(next_letter);
    }

    /// Moves the cursor to the next non-eliminated player, wrapping around.
    /// Does nothing if nobody is active.
    pub(crate) fn advance_turn(&mut self) {
        if self.active_count() == 0 {
            return;
        }
        let len = self.players.len();
        loop {
            self.current = (self.current + 1) % len;
            if !self.players[self.current].is_eliminated(self.max_strikes) {
                break;
            }
        }
        tracing::debug!(
            player = %self.players[self.current].id,
            index = self.current,
            "turn advanced"
        );
    }

    #[cfg(test)]
    pub(crate) fn set_required_letter(&mut self, letter: Option<char>) {
        self.required_letter = letter;
    }
}
