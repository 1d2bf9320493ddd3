//! Text rendering of the board.
//!
//! One line per row, top row (`y = height - 1`) first, each terminated by
//! `'\n'`. Empty cells print as `.`. With at most nine players every cell
//! is a single character; otherwise each cell is padded to the width of the
//! largest player id and cells are separated by a space.

use std::fmt::{self, Write};

use super::Game;
use crate::board::NO_OWNER;

const EMPTY_CELL: char = '.';

/// Number of decimal digits in `n`.
fn digits(mut n: u32) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

impl Game {
    /// Writes the board into `out`, reusing whatever buffer the caller owns.
    pub fn write_board<W: Write>(&self, out: &mut W) -> fmt::Result {
        let cell_width = digits(self.players());
        let grid = self.grid();
        for y in (0..grid.height()).rev() {
            for x in 0..grid.width() {
                let owner = grid.index(x, y).map_or(NO_OWNER, |idx| grid.owner(idx));
                if cell_width == 1 {
                    match owner {
                        NO_OWNER => out.write_char(EMPTY_CELL)?,
                        id => write!(out, "{id}")?,
                    }
                    continue;
                }
                if x > 0 {
                    out.write_char(' ')?;
                }
                match owner {
                    NO_OWNER => write!(out, "{EMPTY_CELL:<cell_width$}")?,
                    id => write!(out, "{id:<cell_width$}")?,
                }
            }
            out.write_char('\n')?;
        }
        Ok(())
    }

    /// The board as text.
    pub fn board_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_board(f)
    }
}
