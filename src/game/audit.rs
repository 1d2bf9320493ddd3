//! From-scratch verification of the incremental bookkeeping.
//!
//! `Game::audit` flood-fills the whole board and compares what it finds
//! with every counter the move engine maintains incrementally, and with the
//! region tracker's view of connectivity. It is O(width * height) and meant
//! for tests and debug builds, not for the move path.

use thiserror::Error;

use super::Game;
use crate::board::NO_OWNER;

/// A counter or region record that disagrees with the board.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("occupied total is {recorded}, board holds {actual}")]
    OccupiedTotal { recorded: u64, actual: u64 },

    #[error("player {player} has {recorded} occupied fields recorded, board holds {actual}")]
    OccupiedFields { player: u32, recorded: u64, actual: u64 },

    #[error("player {player} has {recorded} regions recorded, board holds {actual}")]
    Regions { player: u32, recorded: u32, actual: u32 },

    #[error("player {player} owns {regions} regions, over the limit")]
    OverLimit { player: u32, regions: u32 },

    #[error("player {player} has {recorded} bordering empty cells recorded, board holds {actual}")]
    FreeAdjoining { player: u32, recorded: u64, actual: u64 },

    #[error("adjacent cells {a} and {b} of player {player} are tracked as different regions")]
    Disconnected { player: u32, a: usize, b: usize },

    #[error("region of cell {cell} is tracked with size {recorded}, flood fill finds {actual}")]
    RegionSize { cell: usize, recorded: u64, actual: u64 },

    #[error("member ring of the region containing cell {cell} is corrupt")]
    CorruptRing { cell: usize },

    #[error("empty cell {cell} is joined to a region")]
    EmptyCellJoined { cell: usize },

    #[error("traversal marker left set on cell {cell}")]
    DirtyMarker { cell: usize },
}

impl Game {
    /// Recounts everything from the board and reports the first mismatch.
    pub fn audit(&self) -> Result<(), AuditError> {
        let grid = self.grid();
        let regions = grid.regions();
        let slots = self.players.len() + 1;
        let mut occupied = vec![0u64; slots];
        let mut region_count = vec![0u32; slots];
        let mut frontier = vec![0u64; slots];

        let mut seen = vec![false; grid.len()];
        let mut stack = Vec::new();

        for (idx, cell) in grid.cells().iter().enumerate() {
            if cell.visited() {
                return Err(AuditError::DirtyMarker { cell: idx });
            }
            let owner = cell.owner;
            if owner == NO_OWNER {
                if !regions.is_singleton(idx) {
                    return Err(AuditError::EmptyCellJoined { cell: idx });
                }
                for &o in grid.adjacent_owners(idx).iter() {
                    frontier[o as usize] += 1;
                }
                continue;
            }

            occupied[owner as usize] += 1;
            for &n in grid.neighbors(idx).iter() {
                if grid.owner(n) == owner && !regions.same_set(idx, n) {
                    return Err(AuditError::Disconnected {
                        player: owner,
                        a: idx,
                        b: n,
                    });
                }
            }
            if seen[idx] {
                continue;
            }

            // First cell of a new component: measure it.
            region_count[owner as usize] += 1;
            let mut size = 0u64;
            seen[idx] = true;
            stack.push(idx);
            while let Some(cur) = stack.pop() {
                size += 1;
                for &n in grid.neighbors(cur).iter() {
                    if !seen[n] && grid.owner(n) == owner {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
            let recorded = regions.size(idx);
            if recorded != size {
                return Err(AuditError::RegionSize {
                    cell: idx,
                    recorded,
                    actual: size,
                });
            }
            if !regions.ring_is_consistent(idx) {
                return Err(AuditError::CorruptRing { cell: idx });
            }
        }

        let actual_total: u64 = occupied.iter().sum();
        if actual_total != self.occupied {
            return Err(AuditError::OccupiedTotal {
                recorded: self.occupied,
                actual: actual_total,
            });
        }

        for p in &self.players {
            let id = p.id as usize;
            if p.occupied_fields != occupied[id] {
                return Err(AuditError::OccupiedFields {
                    player: p.id,
                    recorded: p.occupied_fields,
                    actual: occupied[id],
                });
            }
            if p.regions != region_count[id] {
                return Err(AuditError::Regions {
                    player: p.id,
                    recorded: p.regions,
                    actual: region_count[id],
                });
            }
            if p.regions > self.areas_limit {
                return Err(AuditError::OverLimit {
                    player: p.id,
                    regions: p.regions,
                });
            }
            if p.free_adjoining != frontier[id] {
                return Err(AuditError::FreeAdjoining {
                    player: p.id,
                    recorded: p.free_adjoining,
                    actual: frontier[id],
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_game_passes() {
        let g = Game::new(5, 4, 3, 2).unwrap();
        assert_eq!(g.audit(), Ok(()));
    }

    #[test]
    fn detects_tampered_counters() {
        let mut g = Game::new(4, 4, 2, 2).unwrap();
        assert!(g.make_move(1, 0, 0));
        assert!(g.make_move(1, 1, 0));
        assert!(g.make_move(2, 3, 3));
        assert_eq!(g.audit(), Ok(()));

        let mut bad = g.clone();
        bad.players[0].regions = 2;
        assert_eq!(
            bad.audit(),
            Err(AuditError::Regions { player: 1, recorded: 2, actual: 1 })
        );

        let mut bad = g.clone();
        bad.players[1].free_adjoining += 1;
        assert_eq!(
            bad.audit(),
            Err(AuditError::FreeAdjoining { player: 2, recorded: 3, actual: 2 })
        );

        let mut bad = g.clone();
        bad.occupied = 7;
        assert!(matches!(bad.audit(), Err(AuditError::OccupiedTotal { .. })));
    }

    #[test]
    fn detects_broken_region_tracking() {
        let mut g = Game::new(3, 1, 1, 2).unwrap();
        assert!(g.make_move(1, 0, 0));
        assert!(g.make_move(1, 1, 0));
        g.grid.dissolve_region(0);
        assert_eq!(
            g.audit(),
            Err(AuditError::Disconnected { player: 1, a: 0, b: 1 })
        );
    }

    #[test]
    fn detects_joined_empty_cell() {
        let mut g = Game::new(3, 1, 1, 2).unwrap();
        assert!(g.make_move(1, 0, 0));
        g.grid.connect(1, 2);
        assert_eq!(g.audit(), Err(AuditError::EmptyCellJoined { cell: 1 }));
    }
}
