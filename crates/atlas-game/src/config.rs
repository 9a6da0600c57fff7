//! Game configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FaultPolicy
// ---------------------------------------------------------------------------

/// What a failed validator lookup means for the player who answered.
///
/// A lookup can fail for reasons that have nothing to do with the answer
/// (the dataset is unreachable, a query timed out). The policy decides
/// whether the player pays for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Treat the failure as "not a recognized place" and charge a strike.
    #[default]
    Strike,
    /// Report `LookupFailed`, charge nothing, and leave the turn with the
    /// same player.
    Forgive,
}

impl std::str::FromStr for FaultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strike" => Ok(Self::Strike),
            "forgive" => Ok(Self::Forgive),
            other => Err(format!("unknown fault policy {other:?}")),
        }
    }
}

impl std::fmt::Display for FaultPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strike => write!(f, "strike"),
            Self::Forgive => write!(f, "forgive"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Process-wide game settings, supplied once at engine/manager construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Strikes that eliminate a player. At least 1.
    pub max_strikes: u32,

    /// How long the current player has to answer.
    pub turn_timeout: Duration,

    /// How validator faults are charged.
    pub fault_policy: FaultPolicy,

    /// Players a lobby needs before it can lock. At least 2.
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_strikes: 2,
            turn_timeout: Duration::from_secs(30),
            fault_policy: FaultPolicy::Strike,
            min_players: 2,
        }
    }
}

impl GameConfig {
    /// Smallest turn timeout accepted; shorter values are raised to this.
    pub const MIN_TURN_TIMEOUT: Duration = Duration::from_secs(1);

    /// Longest turn timeout accepted; longer values are lowered to this.
    pub const MAX_TURN_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// - `max_strikes` raised to 1.
    /// - `turn_timeout` kept within [`Self::MIN_TURN_TIMEOUT`] and
    ///   [`Self::MAX_TURN_TIMEOUT`].
    /// - `min_players` raised to 2.
    pub fn validated(mut self) -> Self {
        if self.max_strikes == 0 {
            tracing::warn!("max_strikes is 0 — clamping to 1");
            self.max_strikes = 1;
        }
        if self.turn_timeout < Self::MIN_TURN_TIMEOUT {
            tracing::warn!(
                timeout_ms = self.turn_timeout.as_millis() as u64,
                "turn_timeout below minimum — clamping"
            );
            self.turn_timeout = Self::MIN_TURN_TIMEOUT;
        }
        if self.turn_timeout > Self::MAX_TURN_TIMEOUT {
            tracing::warn!(
                timeout_secs = self.turn_timeout.as_secs(),
                "turn_timeout exceeds maximum — clamping"
            );
            self.turn_timeout = Self::MAX_TURN_TIMEOUT;
        }
        if self.min_players < 2 {
            tracing::warn!(
                min_players = self.min_players,
                "min_players below 2 — clamping"
            );
            self.min_players = 2;
        }
        self
    }
}
