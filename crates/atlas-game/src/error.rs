//! Error types for the game layer.
//!
//! These are for calls that make no sense in the current state. A bad
//! answer is not an error: it comes back as an outcome record.

use atlas_protocol::PlayerId;

/// Errors from lobby membership operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The lobby has locked; membership is frozen.
    #[error("lobby is locked")]
    Locked,

    /// The player is already in the lobby.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// The player is not in the lobby.
    #[error("player {0} is not in the lobby")]
    NotInLobby(PlayerId),

    /// Too few players to lock.
    #[error("need at least {need} players to start, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },
}

/// Errors from engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A winner has been decided; the engine accepts no further moves.
    #[error("game is already over")]
    GameOver,

    /// The player is not part of this game.
    #[error("player {0} is not in this game")]
    PlayerNotFound(PlayerId),

    /// The player has already been eliminated.
    #[error("player {0} is already eliminated")]
    AlreadyEliminated(PlayerId),
}
