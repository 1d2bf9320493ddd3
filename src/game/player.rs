//! Per-player aggregate counters.
//!
//! Counters are adjusted incrementally by the move engine and never
//! recomputed from the board; `Game::audit` cross-checks them.

use serde::Serialize;

/// Running totals for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Player {
    pub(crate) id: u32,
    pub(crate) occupied_fields: u64,
    pub(crate) regions: u32,
    /// Empty cells adjacent to at least one of this player's cells.
    pub(crate) free_adjoining: u64,
    pub(crate) golden_move_used: bool,
}

impl Player {
    pub(crate) const fn new(id: u32) -> Self {
        Player {
            id,
            occupied_fields: 0,
            regions: 0,
            free_adjoining: 0,
            golden_move_used: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of cells this player owns.
    pub fn occupied_fields(&self) -> u64 {
        self.occupied_fields
    }

    /// Number of distinct connected regions this player owns.
    pub fn regions(&self) -> u32 {
        self.regions
    }

    /// Number of empty cells bordering this player's territory.
    pub fn free_adjoining(&self) -> u64 {
        self.free_adjoining
    }

    pub fn golden_move_used(&self) -> bool {
        self.golden_move_used
    }
}
