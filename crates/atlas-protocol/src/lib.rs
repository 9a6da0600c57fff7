//! Shared vocabulary for Atlas.
//!
//! This crate defines the values that every other layer passes around:
//!
//! - **Identity** ([`PlayerId`], [`SessionKey`]) and the [`Player`] leaf
//!   value with its strike count.
//! - **Outcome records** ([`AnswerOutcome`], [`TimeoutOutcome`],
//!   [`LeaveOutcome`]) — the immutable result of one engine operation,
//!   handed to whoever renders it.
//! - **Events** ([`SessionEvent`]) — the stream a presentation collaborator
//!   subscribes to.
//! - **Normalization** ([`normalize`]) — the one canonical form answers are
//!   compared and looked up in.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — turns records into bytes
//!   for shells that ship them elsewhere.
//!
//! ```text
//! Presentation (above)  ← renders outcome records / events
//!     ↕
//! Session → Game (engine)  ← produce outcome records
//!     ↕
//! Protocol (this crate)  ← ids, players, outcomes, normalization
//! ```

mod codec;
mod error;
mod normalize;
mod outcome;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use normalize::{fold_letter, normalize};
pub use outcome::{
    AnswerOutcome, AnswerStatus, GameSnapshot, LeaveOutcome, SessionEvent,
    TimeoutOutcome, TIMEOUT_REASON,
};
pub use types::{Player, PlayerId, SessionKey};
