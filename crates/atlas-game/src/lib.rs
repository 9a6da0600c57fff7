//! Game rules for Atlas.
//!
//! A session starts as a [`Lobby`] collecting players. Locking it yields a
//! [`TurnOrder`], from which a [`GameEngine`] is built. The engine owns the
//! [`GameState`] and judges every answer, timeout, and departure, asking a
//! [`Validator`] whether an answer names a real place.
//!
//! # Key types
//!
//! - [`Lobby`] / [`TurnOrder`] — pre-game membership and the locked roster
//! - [`GameState`] — players, turn cursor, required letter, used answers
//! - [`GameEngine`] — answer submission, timeouts, forced leave
//! - [`Validator`] — the validity-set collaborator ([`PlaceSet`] in memory)
//! - [`GameConfig`] / [`FaultPolicy`] — strike limit, timeout, fault handling

mod config;
mod engine;
mod error;
mod lobby;
mod state;
mod validator;

pub use config::{FaultPolicy, GameConfig};
pub use engine::GameEngine;
pub use error::{GameError, LobbyError};
pub use lobby::{Lobby, TurnOrder};
pub use state::GameState;
pub use validator::{PlaceSet, Validator, ValidatorError};
