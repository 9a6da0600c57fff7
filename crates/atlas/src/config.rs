//! Environment-driven configuration.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `ATLAS_MAX_STRIKES` | strikes that eliminate a player | `2` |
//! | `ATLAS_TURN_TIMEOUT_SECS` | seconds per turn | `30` |
//! | `ATLAS_FAULT_POLICY` | `strike` or `forgive` | `strike` |
//! | `ATLAS_MIN_PLAYERS` | players needed to start | `2` |
//!
//! Unset or blank variables keep their default. Malformed ones are an
//! error rather than silently ignored.

use std::str::FromStr;
use std::time::Duration;

use atlas_game::{FaultPolicy, GameConfig};
use serde::{Deserialize, Serialize};

pub const MAX_STRIKES: &str = "ATLAS_MAX_STRIKES";
pub const TURN_TIMEOUT_SECS: &str = "ATLAS_TURN_TIMEOUT_SECS";
pub const FAULT_POLICY: &str = "ATLAS_FAULT_POLICY";
pub const MIN_PLAYERS: &str = "ATLAS_MIN_PLAYERS";

/// A configuration value that couldn't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for an Atlas deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtlasConfig {
    pub game: GameConfig,
}

impl AtlasConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value. The returned config is already validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut game = GameConfig::default();

        if let Some(strikes) = parse(&lookup, MAX_STRIKES)? {
            game.max_strikes = strikes;
        }
        if let Some(secs) = parse::<u64, _>(&lookup, TURN_TIMEOUT_SECS)? {
            game.turn_timeout = Duration::from_secs(secs);
        }
        if let Some(policy) = parse::<FaultPolicy, _>(&lookup, FAULT_POLICY)? {
            game.fault_policy = policy;
        }
        if let Some(min) = parse(&lookup, MIN_PLAYERS)? {
            game.min_players = min;
        }

        let config = Self {
            game: game.validated(),
        };
        tracing::debug!(
            max_strikes = config.game.max_strikes,
            turn_timeout_secs = config.game.turn_timeout.as_secs(),
            fault_policy = %config.game.fault_policy,
            min_players = config.game.min_players,
            "configuration loaded"
        );
        Ok(config)
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AtlasConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AtlasConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.game, GameConfig::default());
    }

    #[test]
    fn test_all_variables_applied() {
        let config = load(&[
            (MAX_STRIKES, "3"),
            (TURN_TIMEOUT_SECS, "12"),
            (FAULT_POLICY, "Forgive"),
            (MIN_PLAYERS, "4"),
        ])
        .unwrap();
        assert_eq!(config.game.max_strikes, 3);
        assert_eq!(config.game.turn_timeout, Duration::from_secs(12));
        assert_eq!(config.game.fault_policy, FaultPolicy::Forgive);
        assert_eq!(config.game.min_players, 4);
    }

    #[test]
    fn test_blank_variable_keeps_default() {
        let config = load(&[(TURN_TIMEOUT_SECS, "  ")]).unwrap();
        assert_eq!(config.game.turn_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = load(&[(MAX_STRIKES, "0"), (TURN_TIMEOUT_SECS, "0")]).unwrap();
        assert_eq!(config.game.max_strikes, 1);
        assert_eq!(config.game.turn_timeout, GameConfig::MIN_TURN_TIMEOUT);
    }

    #[test]
    fn test_huge_turn_timeout_is_capped() {
        let max = u64::MAX.to_string();
        let config = load(&[(TURN_TIMEOUT_SECS, max.as_str())]).unwrap();
        assert_eq!(config.game.turn_timeout, GameConfig::MAX_TURN_TIMEOUT);
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let err = load(&[(MAX_STRIKES, "two")]).unwrap_err();
        let ConfigError::Invalid { key, value, .. } = err;
        assert_eq!(key, MAX_STRIKES);
        assert_eq!(value, "two");
    }

    #[test]
    fn test_unknown_fault_policy_is_an_error() {
        let err = load(&[(FAULT_POLICY, "lenient")]).unwrap_err();
        assert!(err.to_string().contains("lenient"));
    }
}
