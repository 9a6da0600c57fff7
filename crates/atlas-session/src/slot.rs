//! The per-key session slot and its read-only views.

use atlas_game::{GameEngine, Lobby, Validator};
use atlas_protocol::{GameSnapshot, Player, PlayerId};

/// What a session key currently holds.
pub(crate) enum SessionSlot<V: Validator> {
    /// Nothing. New joins open a lobby here.
    Empty,
    /// Collecting players.
    Lobby(Lobby),
    /// A game is running. The creator is carried over from the lobby so
    /// they can still stop it.
    Active {
        creator: PlayerId,
        engine: GameEngine<V>,
    },
}

impl<V: Validator> SessionSlot<V> {
    pub(crate) fn phase(&self) -> SessionPhase {
        match self {
            Self::Empty => SessionPhase::Empty,
            Self::Lobby(_) => SessionPhase::Lobby,
            Self::Active { .. } => SessionPhase::InProgress,
        }
    }

    pub(crate) fn creator(&self) -> Option<PlayerId> {
        match self {
            Self::Empty => None,
            Self::Lobby(lobby) => Some(lobby.creator()),
            Self::Active { creator, .. } => Some(*creator),
        }
    }

    pub(crate) fn status(&self) -> Option<SessionStatus> {
        match self {
            Self::Empty => None,
            Self::Lobby(lobby) => Some(SessionStatus::Lobby {
                creator: lobby.creator(),
                players: lobby.players().to_vec(),
            }),
            Self::Active { creator, engine } => Some(SessionStatus::Active {
                creator: *creator,
                game: engine.snapshot(),
            }),
        }
    }
}

/// Lifecycle phase of a session key.
///
/// ```text
/// Empty ──join──→ Lobby ──start──→ InProgress
///   ↑               │                  │
///   └─last leaves───┘                  │
///   └──────────winner / stop───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Lobby,
    InProgress,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Lobby => write!(f, "Lobby"),
            Self::InProgress => write!(f, "InProgress"),
        }
    }
}

/// Read-only view of an occupied session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for the game to start.
    Lobby {
        creator: PlayerId,
        players: Vec<Player>,
    },
    /// A game is running.
    Active {
        creator: PlayerId,
        game: GameSnapshot,
    },
}
