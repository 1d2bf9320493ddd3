//! Gamma rules engine library.
//!
//! Exposes the board representation, the move engine, game configuration,
//! and the command layer used by front ends and integration tests.

pub mod board;
pub mod config;
pub mod game;
pub mod protocol;

pub use config::{ConfigError, GameConfig};
pub use game::{AuditError, Game, MoveError, Player};
pub use protocol::{dispatch, Command, CommandError, Reply};
