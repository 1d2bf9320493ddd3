//! Engine commands.
//!
//! A front end tokenises its input and turns each line into a `Command`
//! with `Command::from_parts`; `Game::execute` then runs it and produces a
//! `Reply` whose `Display` form is what the front end prints.

use std::fmt;

use thiserror::Error;

use crate::game::Game;

/// Errors raised while building a command from tokens.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownSymbol(char),

    #[error("command '{symbol}' takes {expected} argument(s), got {got}")]
    WrongArity {
        symbol: char,
        expected: usize,
        got: usize,
    },
}

/// One request to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Regular move: claim an empty cell.
    Move { player: u32, x: u32, y: u32 },

    /// Golden move: take over another player's cell.
    GoldenMove { player: u32, x: u32, y: u32 },

    /// Number of cells owned by a player.
    BusyFields { player: u32 },

    /// Number of cells a player could take with a regular move.
    FreeFields { player: u32 },

    /// Whether a player could make a golden move.
    GoldenPossible { player: u32 },

    /// The board as text.
    Board,
}

impl Command {
    /// The letter that names this command in batch input.
    pub fn symbol(&self) -> char {
        match self {
            Command::Move { .. } => 'm',
            Command::GoldenMove { .. } => 'g',
            Command::BusyFields { .. } => 'b',
            Command::FreeFields { .. } => 'f',
            Command::GoldenPossible { .. } => 'q',
            Command::Board => 'p',
        }
    }

    /// Number of numeric arguments the command takes.
    pub fn arity(&self) -> usize {
        arity_of(self.symbol()).unwrap_or(0)
    }

    /// Builds a command from its letter and numeric arguments.
    pub fn from_parts(symbol: char, args: &[u32]) -> Result<Command, CommandError> {
        let expected = arity_of(symbol).ok_or(CommandError::UnknownSymbol(symbol))?;
        if args.len() != expected {
            return Err(CommandError::WrongArity {
                symbol,
                expected,
                got: args.len(),
            });
        }

        let command = match (symbol, args) {
            ('m', &[player, x, y]) => Command::Move { player, x, y },
            ('g', &[player, x, y]) => Command::GoldenMove { player, x, y },
            ('b', &[player]) => Command::BusyFields { player },
            ('f', &[player]) => Command::FreeFields { player },
            ('q', &[player]) => Command::GoldenPossible { player },
            ('p', &[]) => Command::Board,
            _ => return Err(CommandError::UnknownSymbol(symbol)),
        };
        Ok(command)
    }
}

fn arity_of(symbol: char) -> Option<usize> {
    match symbol {
        'm' | 'g' => Some(3),
        'b' | 'f' | 'q' => Some(1),
        'p' => Some(0),
        _ => None,
    }
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Outcome of a move, golden move or golden-move query.
    Flag(bool),

    /// A cell count.
    Count(u64),

    /// Board text, newline-terminated per row.
    Board(String),
}

impl Reply {
    /// The reply for a command that could not run at all.
    pub fn failure(command: &Command) -> Reply {
        match command {
            Command::Move { .. } | Command::GoldenMove { .. } | Command::GoldenPossible { .. } => {
                Reply::Flag(false)
            }
            Command::BusyFields { .. } | Command::FreeFields { .. } => Reply::Count(0),
            Command::Board => Reply::Board(String::new()),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Flag(ok) => write!(f, "{}", u8::from(*ok)),
            Reply::Count(n) => write!(f, "{n}"),
            Reply::Board(text) => f.write_str(text),
        }
    }
}

impl Game {
    /// Runs `command` against this game.
    pub fn execute(&mut self, command: &Command) -> Reply {
        log::trace!("execute {command:?}");
        match *command {
            Command::Move { player, x, y } => Reply::Flag(self.make_move(player, x, y)),
            Command::GoldenMove { player, x, y } => Reply::Flag(self.golden_move(player, x, y)),
            Command::BusyFields { player } => Reply::Count(self.busy_fields(player)),
            Command::FreeFields { player } => Reply::Count(self.free_fields(player)),
            Command::GoldenPossible { player } => Reply::Flag(self.golden_possible(player)),
            Command::Board => Reply::Board(self.board_text()),
        }
    }
}

/// Runs `command` on `game`, or answers with the failure reply when there is
/// no game.
pub fn dispatch(game: Option<&mut Game>, command: &Command) -> Reply {
    match game {
        Some(game) => game.execute(command),
        None => {
            log::debug!("no game for {command:?}");
            Reply::failure(command)
        }
    }
}
