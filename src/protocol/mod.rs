//! Command layer between a front end and the engine.
//!
//! Text input and output formats belong to the front end; this module only
//! defines the closed set of engine commands and their replies.

pub mod command;

pub use command::{dispatch, Command, CommandError, Reply};
