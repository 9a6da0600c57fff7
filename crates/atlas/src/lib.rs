//! # Atlas
//!
//! Turn-based elimination word-chain game over place names.
//!
//! Players take turns naming a place that starts with the last letter of the
//! previous answer. A bad answer or a missed deadline is a strike; enough
//! strikes and you're out. Last player standing wins.
//!
//! This crate ties the layers together: [`SessionManager`] runs one lobby
//! or game per [`SessionKey`], each with its own turn timer, and publishes
//! a [`SessionEvent`] for everything that happens, timeouts included.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use atlas::prelude::*;
//!
//! # async fn run() -> Result<(), AtlasError> {
//! let places: PlaceSet = ["Mumbai", "Islamabad", "Delhi"].into_iter().collect();
//! let config = AtlasConfig::from_env()?;
//! let (sessions, mut events) = SessionManager::new(config.game, Arc::new(places));
//!
//! let channel = SessionKey(1);
//! sessions.join(channel, PlayerId(1), "Ana").await?;
//! sessions.join(channel, PlayerId(2), "Bo").await?;
//! sessions.start(channel).await?;
//! sessions.submit_answer(channel, PlayerId(1), "Mumbai").await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod logging;

pub use atlas_game as game;
pub use atlas_protocol as protocol;
pub use atlas_session as session;
pub use atlas_timer as timer;

pub use atlas_game::{FaultPolicy, GameConfig, PlaceSet, Validator, ValidatorError};
pub use atlas_protocol::{PlayerId, SessionEvent, SessionKey};
pub use atlas_session::SessionManager;
pub use config::{AtlasConfig, ConfigError};
pub use error::AtlasError;

/// Everything needed to host games.
pub mod prelude {
    pub use crate::config::{AtlasConfig, ConfigError};
    pub use crate::error::AtlasError;
    pub use atlas_game::{
        FaultPolicy, GameConfig, GameError, LobbyError, PlaceSet, Validator, ValidatorError,
    };
    pub use atlas_protocol::{
        AnswerOutcome, AnswerStatus, Codec, GameSnapshot, JsonCodec, LeaveOutcome, Player,
        PlayerId, SessionEvent, SessionKey, TimeoutOutcome,
    };
    pub use atlas_session::{
        LeaveResult, SessionError, SessionManager, SessionPhase, SessionStatus,
    };
}
