//! Session management for Atlas.
//!
//! One session per channel. Each [`SessionKey`](atlas_protocol::SessionKey)
//! owns a slot that is empty, holds a lobby, or holds a running game, plus
//! at most one turn timer. [`SessionManager`] arbitrates everything that
//! touches a slot:
//!
//! 1. **Lobby** — join, leave, start ([`SessionManager::join`], ...)
//! 2. **Play** — answers and timer expiries, serialized per session
//! 3. **Teardown** — on a winner, a stop, or the last lobby member leaving
//!
//! # How it fits in the stack
//!
//! ```text
//! Presentation (above)  ← drives commands, consumes SessionEvents
//!     ↕
//! Session Layer (this crate)  ← slots, timers, single-writer discipline
//!     ↕
//! Game / Timer / Protocol (below)
//! ```

mod error;
mod manager;
mod slot;

pub use error::SessionError;
pub use manager::{LeaveResult, SessionManager};
pub use slot::{SessionPhase, SessionStatus};
