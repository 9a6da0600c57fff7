//! The game engine: answer judging, strikes, turn order, and winners.

use std::sync::Arc;

use atlas_protocol::{
    fold_letter, normalize, AnswerOutcome, AnswerStatus, GameSnapshot, LeaveOutcome, Player,
    PlayerId, TimeoutOutcome,
};

use crate::{FaultPolicy, GameConfig, GameError, GameState, TurnOrder, Validator};

/// Owns one game's state and judges every move made against it.
///
/// Every operation is a complete transition: it applies strikes, moves the
/// turn, recomputes the winner, and returns an outcome record describing
/// the new state. The caller retires the engine once an outcome carries a
/// winner.
pub struct GameEngine<V: Validator> {
    state: GameState,
    validator: Arc<V>,
    fault_policy: FaultPolicy,
}

impl<V: Validator> GameEngine<V> {
    /// Starts a game from a locked roster.
    pub fn new(order: TurnOrder, config: &GameConfig, validator: Arc<V>) -> Self {
        tracing::info!(
            players = order.len(),
            max_strikes = config.max_strikes,
            "game started"
        );
        Self {
            state: GameState::new(order, config.max_strikes),
            validator,
            fault_policy: config.fault_policy,
        }
    }

    /// The game state, read-only.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The player who holds the turn.
    pub fn current_player(&self) -> &Player {
        self.state.current_player()
    }

    /// Returns `true` once at most one player is left.
    pub fn is_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// The last player standing, if the game is over.
    pub fn winner(&self) -> Option<&Player> {
        self.state.winner()
    }

    /// Read-only copy for status displays.
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    /// Judges an answer from the player who holds the turn.
    ///
    /// Checks run in order and stop at the first failure: blank answer,
    /// wrong starting letter, unknown place, repeat. Any failure is a
    /// strike; the required letter only moves on success. Once the game is
    /// over this returns a [`AnswerStatus::GameOver`] record and changes
    /// nothing.
    pub async fn submit_answer(&mut self, text: &str) -> AnswerOutcome {
        let answer = text.trim();

        if self.state.is_game_over() {
            return self.rejected(answer);
        }

        let mut chars = answer.chars();
        let Some(first) = chars.next() else {
            return self.strike(AnswerStatus::Empty, answer);
        };
        // A one-letter answer ends with the letter it starts with.
        let last = fold_letter(chars.next_back().unwrap_or(first));

        if let Some(required) = self.state.required_letter() {
            if fold_letter(first) != required {
                return self.strike(AnswerStatus::WrongLetter, answer);
            }
        }

        let normalized = normalize(answer);
        match self.validator.is_valid(&normalized).await {
            Ok(true) => {}
            Ok(false) => return self.strike(AnswerStatus::NotAPlace, answer),
            Err(err) => match self.fault_policy {
                FaultPolicy::Strike => {
                    tracing::warn!(error = %err, %answer, "lookup failed, charging a strike");
                    return self.strike(AnswerStatus::NotAPlace, answer);
                }
                FaultPolicy::Forgive => {
                    tracing::warn!(error = %err, %answer, "lookup failed, turn kept");
                    return self.forgiven(answer);
                }
            },
        }

        if self.state.is_used(&normalized) {
            return self.strike(AnswerStatus::AlreadyUsed, answer);
        }

        let player = self.state.current_player().clone();
        self.state.accept(normalized, last);
        tracing::debug!(player = %player.id, %answer, next_letter = %last, "answer accepted");
        self.state.advance_turn();

        AnswerOutcome {
            status: AnswerStatus::Valid,
            answer: answer.to_string(),
            player,
            next_letter: Some(last),
            eliminated: false,
            next_player: self.state.next_player().cloned(),
            winner: self.state.winner().cloned(),
        }
    }

    /// Charges the current player for running out of time.
    ///
    /// Same as any other strike: the validator is not consulted, no answer
    /// is recorded, and the required letter stays put.
    ///
    /// # Errors
    /// [`GameError::GameOver`] if a winner has already been decided.
    pub fn handle_timeout(&mut self) -> Result<TimeoutOutcome, GameError> {
        if self.state.is_game_over() {
            return Err(GameError::GameOver);
        }
        tracing::info!(player = %self.state.current_player().id, "turn timed out");
        let (player, eliminated) = self.charge_current();
        Ok(TimeoutOutcome {
            strikes: player.strikes(),
            player,
            eliminated,
            next_letter: self.state.required_letter(),
            next_player: self.state.next_player().cloned(),
            winner: self.announce_winner(),
        })
    }

    /// Removes a player from a running game by pushing them straight to the
    /// strike limit. If they held the turn, it passes on.
    ///
    /// # Errors
    /// - [`GameError::GameOver`] — a winner has already been decided
    /// - [`GameError::PlayerNotFound`] — `id` is not in this game
    /// - [`GameError::AlreadyEliminated`] — `id` is already out
    pub fn leave_game(&mut self, id: PlayerId) -> Result<LeaveOutcome, GameError> {
        if self.state.is_game_over() {
            return Err(GameError::GameOver);
        }
        let index = self.state.position(id).ok_or(GameError::PlayerNotFound(id))?;
        let max = self.state.max_strikes();
        if self.state.players()[index].is_eliminated(max) {
            return Err(GameError::AlreadyEliminated(id));
        }

        let held_turn = index == self.state.current_index();
        let player = self.state.player_at_mut(index);
        player.eliminate(max);
        let player = player.clone();
        tracing::info!(player = %id, held_turn, "player left the game");

        if held_turn {
            self.state.advance_turn();
        }

        Ok(LeaveOutcome {
            player,
            held_turn,
            next_letter: self.state.required_letter(),
            next_player: self.state.next_player().cloned(),
            winner: self.announce_winner(),
        })
    }

    /// Strikes the current player and passes the turn.
    /// Returns the player after the strike and whether it eliminated them.
    fn charge_current(&mut self) -> (Player, bool) {
        let max = self.state.max_strikes();
        let player = self.state.current_player_mut();
        if !player.is_eliminated(max) {
            player.add_strike(max);
        }
        let player = player.clone();
        let eliminated = player.is_eliminated(max);
        if eliminated {
            tracing::info!(player = %player.id, strikes = player.strikes(), "player eliminated");
        }
        self.state.advance_turn();
        (player, eliminated)
    }

    fn announce_winner(&self) -> Option<Player> {
        let winner = self.state.winner().cloned();
        if let Some(w) = &winner {
            tracing::info!(winner = %w.id, "game won");
        }
        winner
    }

    fn strike(&mut self, status: AnswerStatus, answer: &str) -> AnswerOutcome {
        let (player, eliminated) = self.charge_current();
        tracing::debug!(player = %player.id, %status, strikes = player.strikes(), "strike");
        AnswerOutcome {
            status,
            answer: answer.to_string(),
            player,
            next_letter: self.state.required_letter(),
            eliminated,
            next_player: self.state.next_player().cloned(),
            winner: self.announce_winner(),
        }
    }

    fn forgiven(&self, answer: &str) -> AnswerOutcome {
        AnswerOutcome {
            status: AnswerStatus::LookupFailed,
            answer: answer.to_string(),
            player: self.state.current_player().clone(),
            next_letter: self.state.required_letter(),
            eliminated: false,
            next_player: Some(self.state.current_player().clone()),
            winner: None,
        }
    }

    fn rejected(&self, answer: &str) -> AnswerOutcome {
        AnswerOutcome {
            status: AnswerStatus::GameOver,
            answer: answer.to_string(),
            player: self.state.current_player().clone(),
            next_letter: self.state.required_letter(),
            eliminated: false,
            next_player: None,
            winner: self.state.winner().cloned(),
        }
    }
}
