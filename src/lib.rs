// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]
//! Eloworld: trainer-vs-trainer Pokémon Red battles driven through bgb.
//!
//! The game's own trainer AI only ever plays the enemy side. To let it play
//! both, every time the player side has to act the battle state is mirrored,
//! the AI is run on the mirror, and its choice is replayed as controller
//! input on the real battle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      session (workspace, movie)     │
//! ├─────────────────────────────────────┤
//! │   driver ── oracle ── transcode     │
//! ├──────────────────┬──────────────────┤
//! │ memory  text     │  input  emulator │
//! └──────────────────┴──────────────────┘
//! ```

pub mod config;
pub mod data;
pub mod driver;
pub mod emulator;
pub mod error;
pub mod input;
pub mod memory;
pub mod movie;
pub mod oracle;
pub mod session;
pub mod text;
pub mod transcode;
pub mod workspace;

pub use error::{AccessType, LayoutError, LayoutResult};

pub use driver::{BattleDriver, BattleError, BattleOutcome, BattleState, Choice, Combatant, Side};
pub use memory::Snapshot;
