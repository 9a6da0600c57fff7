//! Error types for the session layer.

use atlas_game::{GameError, LobbyError};
use atlas_protocol::{PlayerId, SessionKey};

/// Errors from session operations.
///
/// A rejected answer is not an error; it is an outcome. These cover
/// requests that don't fit the session's current phase.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Nothing (no lobby, no game) is open for this key.
    #[error("no lobby or game in session {0}")]
    NoSession(SessionKey),

    /// The session is still a lobby; there is no game to play in.
    #[error("no game running in session {0}")]
    NoGame(SessionKey),

    /// A game is already running, so the lobby can't be joined or started.
    #[error("a game is already in progress in session {0}")]
    GameInProgress(SessionKey),

    /// Only the player holding the turn may answer.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// Only the session creator or a moderator may stop a session.
    #[error("player {0} may not stop this session")]
    NotPermitted(PlayerId),

    /// A lobby membership operation failed.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// An engine operation failed.
    #[error(transparent)]
    Game(#[from] GameError),
}
