//! Outcome records and session events.
//!
//! The engine never produces user-facing text. Every operation returns one
//! of these immutable records, carrying a status tag and a short
//! machine-readable reason; the presentation layer decides what to say.

use serde::{Deserialize, Serialize};

use crate::{Player, PlayerId, SessionKey};

/// Reason attached to every timeout strike.
pub const TIMEOUT_REASON: &str = "missed deadline";

// ---------------------------------------------------------------------------
// AnswerStatus
// ---------------------------------------------------------------------------

/// How an answer submission was judged.
///
/// Closed set: a consumer matching on it must handle every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerStatus {
    /// Accepted. The required letter moved to the answer's last letter.
    Valid,
    /// Blank after trimming. Strike.
    Empty,
    /// Did not start with the required letter. Strike.
    WrongLetter,
    /// The validator does not know this place (or failed, under the
    /// strike fault policy). Strike.
    NotAPlace,
    /// Already played in this game. Strike.
    AlreadyUsed,
    /// The validator failed and the forgiving fault policy is active.
    /// No strike; the same player keeps the turn.
    LookupFailed,
    /// The game had already ended. Nothing changed.
    GameOver,
}

impl AnswerStatus {
    /// Short machine-readable reason for this status.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Valid => "accepted",
            Self::Empty => "empty answer",
            Self::WrongLetter => "wrong letter",
            Self::NotAPlace => "not a recognized place",
            Self::AlreadyUsed => "already used",
            Self::LookupFailed => "lookup unavailable",
            Self::GameOver => "game already over",
        }
    }

    /// Returns `true` if this status charged the player a strike.
    pub fn is_strike(self) -> bool {
        matches!(
            self,
            Self::Empty | Self::WrongLetter | Self::NotAPlace | Self::AlreadyUsed
        )
    }
}

impl std::fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

// ---------------------------------------------------------------------------
// Outcome records
// ---------------------------------------------------------------------------

/// Result of one answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// The verdict.
    pub status: AnswerStatus,
    /// The trimmed answer text as submitted.
    pub answer: String,
    /// The player who answered, after any strike was applied.
    pub player: Player,
    /// The required letter after this transition (`None` = any letter).
    pub next_letter: Option<char>,
    /// `true` if this submission eliminated the player.
    pub eliminated: bool,
    /// Who holds the turn now. `None` once the game is over.
    pub next_player: Option<Player>,
    /// Set when exactly one active player remains.
    pub winner: Option<Player>,
}

impl AnswerOutcome {
    /// Short machine-readable reason, derived from the status.
    pub fn reason(&self) -> &'static str {
        self.status.reason()
    }
}

/// Result of a turn timer expiring on the current player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutOutcome {
    /// The player who ran out of time, after the strike.
    pub player: Player,
    /// Strike count after the timeout.
    pub strikes: u32,
    /// `true` if the timeout eliminated the player.
    pub eliminated: bool,
    /// The required letter, unchanged by a timeout.
    pub next_letter: Option<char>,
    /// Who holds the turn now. `None` once the game is over.
    pub next_player: Option<Player>,
    /// Set when exactly one active player remains.
    pub winner: Option<Player>,
}

impl TimeoutOutcome {
    /// Always [`TIMEOUT_REASON`].
    pub fn reason(&self) -> &'static str {
        TIMEOUT_REASON
    }
}

/// Result of a player walking out of a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveOutcome {
    /// The departed player, now at the strike limit.
    pub player: Player,
    /// `true` if the player held the turn when they left.
    pub held_turn: bool,
    /// The required letter, unchanged by a departure.
    pub next_letter: Option<char>,
    /// Who holds the turn now. `None` once the game is over.
    pub next_player: Option<Player>,
    /// Set when exactly one active player remains.
    pub winner: Option<Player>,
}

/// Read-only view of a running game, for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Every player in turn order, eliminated ones included.
    pub players: Vec<Player>,
    /// The player who holds the turn.
    pub current_player: Player,
    /// Letter the next answer must start with (`None` = any).
    pub required_letter: Option<char>,
    /// How many distinct answers have been accepted.
    pub words_used: usize,
    /// Strike limit in force for this game.
    pub max_strikes: u32,
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// Everything that happens to a session, in the order it happened.
///
/// The session manager publishes these on a channel so that outcomes with
/// no caller (timer expiries) still reach the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// The first join created a lobby.
    LobbyOpened { session: SessionKey, creator: PlayerId },
    /// A player joined the lobby.
    PlayerJoined {
        session: SessionKey,
        player: Player,
        lobby_size: usize,
    },
    /// A player left the lobby before the game started.
    PlayerLeftLobby {
        session: SessionKey,
        player: PlayerId,
        lobby_size: usize,
    },
    /// The lobby locked and the game began. `turn_order[0]` plays first.
    GameStarted {
        session: SessionKey,
        turn_order: Vec<Player>,
    },
    /// An answer was judged.
    Answer {
        session: SessionKey,
        outcome: AnswerOutcome,
    },
    /// The current player ran out of time.
    Timeout {
        session: SessionKey,
        outcome: TimeoutOutcome,
    },
    /// A player left a running game.
    PlayerLeftGame {
        session: SessionKey,
        outcome: LeaveOutcome,
    },
    /// One player remains; the session has been torn down.
    GameOver { session: SessionKey, winner: Player },
    /// The session was stopped before it finished.
    Stopped { session: SessionKey, by: PlayerId },
}

impl SessionEvent {
    /// The session this event belongs to.
    pub fn session(&self) -> SessionKey {
        match self {
            Self::LobbyOpened { session, .. }
            | Self::PlayerJoined { session, .. }
            | Self::PlayerLeftLobby { session, .. }
            | Self::GameStarted { session, .. }
            | Self::Answer { session, .. }
            | Self::Timeout { session, .. }
            | Self::PlayerLeftGame { session, .. }
            | Self::GameOver { session, .. }
            | Self::Stopped { session, .. } => *session,
        }
    }
}
