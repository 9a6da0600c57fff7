//! Unified error type for Atlas.

use atlas_game::{GameError, LobbyError, ValidatorError};
use atlas_protocol::ProtocolError;
use atlas_session::SessionError;

use crate::ConfigError;

/// Top-level error that wraps every crate-specific error.
///
/// Each variant has a `From` impl, so `?` converts sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// Encoding or decoding an event failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby membership operation failed.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// An engine operation failed.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The place lookup was unavailable.
    #[error(transparent)]
    Validator(#[from] ValidatorError),

    /// A request didn't fit the session's phase.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An environment setting was malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
