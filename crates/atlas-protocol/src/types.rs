//! Identity types and the `Player` leaf value.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identity of a player (a chat-platform user id, in practice).
///
/// Newtype over `u64` so it can't be confused with a [`SessionKey`].
/// Serialized transparently: `PlayerId(42)` is just `42` on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Key of one game session — one per channel the game is played in.
///
/// A key holds at most one lobby or one running game at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionKey(pub u64);

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A participant: identity, display name, and strike count.
///
/// Strikes only change through [`add_strike`](Self::add_strike) and
/// [`eliminate`](Self::eliminate), both of which clamp at the limit the
/// caller passes in. Elimination is derived, never stored: a player is out
/// once `strikes >= max_strikes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Who this is.
    pub id: PlayerId,
    /// Name shown to other players.
    pub name: String,
    strikes: u32,
}

impl Player {
    /// Creates a player with zero strikes.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            strikes: 0,
        }
    }

    /// Current strike count.
    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    /// Returns `true` once the strike count has reached `max_strikes`.
    pub fn is_eliminated(&self, max_strikes: u32) -> bool {
        self.strikes >= max_strikes
    }

    /// Adds one strike, never going past `max_strikes`. Returns the new count.
    pub fn add_strike(&mut self, max_strikes: u32) -> u32 {
        self.strikes = self.strikes.saturating_add(1).min(max_strikes);
        self.strikes
    }

    /// Forces the strike count to `max_strikes`, whatever it was before.
    pub fn eliminate(&mut self, max_strikes: u32) {
        self.strikes = max_strikes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_with_prefix() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(SessionKey(99).to_string(), "S-99");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&SessionKey(3)).unwrap(), "3");
    }

    #[test]
    fn test_new_player_has_no_strikes() {
        let p = Player::new(PlayerId(1), "Ana");
        assert_eq!(p.strikes(), 0);
        assert_eq!(p.name, "Ana");
        assert!(!p.is_eliminated(2));
    }

    #[test]
    fn test_add_strike_clamps_at_limit() {
        let mut p = Player::new(PlayerId(1), "Ana");
        assert_eq!(p.add_strike(2), 1);
        assert_eq!(p.add_strike(2), 2);
        assert_eq!(p.add_strike(2), 2);
        assert!(p.is_eliminated(2));
    }

    #[test]
    fn test_eliminate_forces_limit() {
        let mut p = Player::new(PlayerId(1), "Ana");
        p.eliminate(3);
        assert_eq!(p.strikes(), 3);
        assert!(p.is_eliminated(3));
    }

    #[test]
    fn test_single_strike_limit_eliminates_immediately() {
        let mut p = Player::new(PlayerId(1), "Ana");
        p.add_strike(1);
        assert!(p.is_eliminated(1));
    }
}
