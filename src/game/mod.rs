//! Game state and move engine.
//!
//! `Game` owns the board and the per-player counters and implements the
//! two mutating operations, a regular move and the once-per-player golden
//! move. Every counter is adjusted incrementally around the cell that
//! changed hands; nothing is recomputed from the whole board.
//!
//! A rejected move leaves the game untouched: all validation happens before
//! the first mutation.

pub mod audit;
pub mod player;
pub mod render;

use thiserror::Error;

use crate::board::{Grid, MAX_NEIGHBORS, NO_OWNER};
use crate::config::{ConfigError, GameConfig};

pub use audit::AuditError;
pub use player::Player;

/// Why a move or golden move was rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("no player {0} in this game")]
    InvalidPlayer(u32),

    #[error("({x}, {y}) is outside the board")]
    OutOfBounds { x: u32, y: u32 },

    #[error("({x}, {y}) is already taken by player {owner}")]
    Occupied { x: u32, y: u32, owner: u32 },

    #[error("player {player} already owns {limit} regions and ({x}, {y}) would start another")]
    AreaLimit {
        player: u32,
        limit: u32,
        x: u32,
        y: u32,
    },

    #[error("player {0} has already made a golden move")]
    GoldenMoveUsed(u32),

    #[error("({x}, {y}) is empty")]
    EmptyTarget { x: u32, y: u32 },

    #[error("({x}, {y}) already belongs to player {player}")]
    OwnPiece { x: u32, y: u32, player: u32 },

    #[error("removing player {victim}'s piece at ({x}, {y}) would split them past the area limit")]
    VictimAreaLimit { victim: u32, x: u32, y: u32 },
}

/// A game in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    grid: Grid,
    players: Vec<Player>,
    areas_limit: u32,
    occupied: u64,
}

impl Game {
    /// Creates an empty game. Fails if any argument is zero, if the board
    /// cannot be addressed, or if its memory cannot be allocated.
    pub fn new(width: u32, height: u32, players: u32, areas_limit: u32) -> Result<Self, ConfigError> {
        Self::from_config(&GameConfig::new(width, height, players, areas_limit))
    }

    /// Creates an empty game from a validated configuration.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cells = config.cell_count()?;
        let grid = Grid::with_size(config.width, config.height, cells)?;

        let mut players = Vec::new();
        players.try_reserve_exact(config.players as usize)?;
        players.extend((1..=config.players).map(Player::new));

        log::info!(
            "new game: {}x{} board, {} players, area limit {}",
            config.width,
            config.height,
            config.players,
            config.areas_limit
        );

        Ok(Game {
            grid,
            players,
            areas_limit: config.areas_limit,
            occupied: 0,
        })
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::new(
            self.grid.width(),
            self.grid.height(),
            self.players(),
            self.areas_limit,
        )
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Number of players; valid ids are `1..=players()`.
    pub fn players(&self) -> u32 {
        self.players.len() as u32
    }

    pub fn areas_limit(&self) -> u32 {
        self.areas_limit
    }

    /// Total number of claimed cells.
    pub fn occupied_fields(&self) -> u64 {
        self.occupied
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Counters of player `id`, or `None` for an invalid id.
    pub fn player(&self, id: u32) -> Option<&Player> {
        let slot = (id as usize).checked_sub(1)?;
        self.players.get(slot)
    }

    /// Owner of `(x, y)`, or `None` if the cell is empty or off the board.
    pub fn owner_at(&self, x: u32, y: u32) -> Option<u32> {
        let idx = self.grid.index(x, y)?;
        match self.grid.owner(idx) {
            NO_OWNER => None,
            owner => Some(owner),
        }
    }

    /// Places a piece of `player` on `(x, y)`. Returns false if the move is
    /// illegal; the game is then unchanged.
    pub fn make_move(&mut self, player: u32, x: u32, y: u32) -> bool {
        self.try_move(player, x, y).is_ok()
    }

    /// Like `make_move`, but reports why an illegal move was rejected.
    pub fn try_move(&mut self, player: u32, x: u32, y: u32) -> Result<(), MoveError> {
        match self.check_move(player, x, y) {
            Ok(idx) => {
                self.claim(player, idx);
                Ok(())
            }
            Err(e) => {
                log::debug!("move rejected: {e}");
                Err(e)
            }
        }
    }

    /// Replaces another player's piece on `(x, y)` with one of `player`'s.
    /// Each player may do this once. Returns false if the move is illegal;
    /// the game is then unchanged.
    pub fn golden_move(&mut self, player: u32, x: u32, y: u32) -> bool {
        self.try_golden_move(player, x, y).is_ok()
    }

    /// Like `golden_move`, but reports why an illegal move was rejected.
    pub fn try_golden_move(&mut self, player: u32, x: u32, y: u32) -> Result<(), MoveError> {
        let idx = match self.check_golden_move(player, x, y) {
            Ok(idx) => idx,
            Err(e) => {
                log::debug!("golden move rejected: {e}");
                return Err(e);
            }
        };
        let victim = self.grid.owner(idx);
        self.release(idx);
        self.claim(player, idx);
        self.players[slot(player)].golden_move_used = true;
        log::debug!("player {player} took ({x}, {y}) from player {victim} with a golden move");
        Ok(())
    }

    /// Number of cells owned by `player`, or 0 for an invalid id.
    pub fn busy_fields(&self, player: u32) -> u64 {
        self.player(player).map_or(0, |p| p.occupied_fields)
    }

    /// Number of cells `player` could legally take with a regular move.
    ///
    /// Below the area limit any empty cell will do. At the limit only empty
    /// cells bordering the player's regions qualify. 0 for an invalid id.
    pub fn free_fields(&self, player: u32) -> u64 {
        match self.player(player) {
            Some(p) if p.regions >= self.areas_limit => p.free_adjoining,
            Some(_) => self.grid.len() as u64 - self.occupied,
            None => 0,
        }
    }

    /// Whether `player` could make a golden move right now.
    ///
    /// Requires an unused golden move and at least one foreign piece; then
    /// scans the board for a cell on which the golden move would succeed.
    ///
    /// Linear in the board size: fragment counts for cut cells come from a
    /// single whole-board pass, built only if some candidate needs one.
    pub fn golden_possible(&self, player: u32) -> bool {
        let Some(p) = self.player(player) else {
            return false;
        };
        if p.golden_move_used || p.occupied_fields == self.occupied {
            return false;
        }
        let mut fragments: Option<Vec<u8>> = None;
        for idx in 0..self.grid.len() {
            let owner = self.grid.owner(idx);
            if owner == NO_OWNER || owner == player || self.check_area_limit(player, idx).is_err() {
                continue;
            }
            let regions = self.players[slot(owner)].regions;
            // At most one same-owner neighbour means at most one fragment.
            if self.has_split_headroom(regions)
                || self.grid.count_adjacent_cells_owned_by(idx, owner) <= 1
            {
                return true;
            }
            let table = fragments.get_or_insert_with(|| self.grid.removal_fragments());
            if self.split_fits(regions, u32::from(table[idx])) {
                return true;
            }
        }
        false
    }

    /// Number of regions the piece on `(x, y)` would leave behind if it were
    /// removed, without removing it. `None` for an off-board cell.
    pub fn regions_after_removal(&mut self, x: u32, y: u32) -> Option<u32> {
        let idx = self.grid.index(x, y)?;
        Some(self.grid.count_regions_after_removal(idx))
    }

    fn cell_index(&self, x: u32, y: u32) -> Result<usize, MoveError> {
        self.grid.index(x, y).ok_or(MoveError::OutOfBounds { x, y })
    }

    fn check_player(&self, player: u32) -> Result<&Player, MoveError> {
        self.player(player).ok_or(MoveError::InvalidPlayer(player))
    }

    fn check_move(&self, player: u32, x: u32, y: u32) -> Result<usize, MoveError> {
        self.check_player(player)?;
        let idx = self.cell_index(x, y)?;
        let owner = self.grid.owner(idx);
        if owner != NO_OWNER {
            return Err(MoveError::Occupied { x, y, owner });
        }
        self.check_area_limit(player, idx)?;
        Ok(idx)
    }

    fn check_golden_move(&mut self, player: u32, x: u32, y: u32) -> Result<usize, MoveError> {
        if self.check_player(player)?.golden_move_used {
            return Err(MoveError::GoldenMoveUsed(player));
        }
        let idx = self.cell_index(x, y)?;
        let owner = self.grid.owner(idx);
        if owner == NO_OWNER {
            return Err(MoveError::EmptyTarget { x, y });
        }
        if owner == player {
            return Err(MoveError::OwnPiece { x, y, player });
        }
        self.check_area_limit(player, idx)?;
        self.check_victim_limit(owner, idx)?;
        Ok(idx)
    }

    /// A player at the area limit may only take cells touching one of their
    /// regions.
    fn check_area_limit(&self, player: u32, idx: usize) -> Result<(), MoveError> {
        let regions = self.players[slot(player)].regions;
        if regions >= self.areas_limit && self.grid.count_adjacent_regions_owned_by(idx, player) == 0 {
            let (x, y) = self.grid.coords(idx);
            return Err(MoveError::AreaLimit {
                player,
                limit: self.areas_limit,
                x,
                y,
            });
        }
        Ok(())
    }

    /// Removing the piece on `idx` replaces the victim's region by the
    /// fragments it falls apart into; the result must stay within the limit.
    fn check_victim_limit(&mut self, victim: u32, idx: usize) -> Result<(), MoveError> {
        let regions = self.players[slot(victim)].regions;
        if self.has_split_headroom(regions) {
            return Ok(());
        }
        let fragments = self.grid.count_regions_after_removal(idx);
        if !self.split_fits(regions, fragments) {
            let (x, y) = self.grid.coords(idx);
            return Err(MoveError::VictimAreaLimit { victim, x, y });
        }
        Ok(())
    }

    /// A removal yields at most MAX_NEIGHBORS fragments, so with that much
    /// headroom any removal fits. regions <= areas_limit always holds.
    fn has_split_headroom(&self, regions: u32) -> bool {
        ((self.areas_limit - regions) as usize) >= MAX_NEIGHBORS
    }

    /// Whether one region of a player with `regions` regions may fall apart
    /// into `fragments` pieces.
    fn split_fits(&self, regions: u32, fragments: u32) -> bool {
        u64::from(regions) + u64::from(fragments) <= u64::from(self.areas_limit) + 1
    }

    /// Gives the empty cell `idx` to `player` and updates every counter the
    /// change touches.
    fn claim(&mut self, player: u32, idx: usize) {
        let merged = self.grid.count_adjacent_regions_owned_by(idx, player);
        self.grid.set_owner(idx, player);
        self.occupied += 1;

        // `idx` was empty, so it bordered the territory of each neighbouring
        // owner exactly once.
        for &owner in self.grid.adjacent_owners(idx).iter() {
            self.players[slot(owner)].free_adjoining -= 1;
        }

        let mut gained = 0;
        for &n in self.grid.neighbors(idx).iter() {
            let owner = self.grid.owner(n);
            if owner == NO_OWNER && self.grid.count_adjacent_cells_owned_by(n, player) == 1 {
                gained += 1;
            } else if owner == player {
                self.grid.connect(n, idx);
            }
        }

        let p = &mut self.players[slot(player)];
        p.occupied_fields += 1;
        // The `merged` regions touching `idx` all exist, so regions >= merged.
        p.regions = p.regions + 1 - merged;
        p.free_adjoining += gained;
    }

    /// Empties the owned cell `idx`, re-deriving the former owner's regions
    /// around it and reversing the frontier bookkeeping of `claim`.
    fn release(&mut self, idx: usize) {
        let owner = self.grid.owner(idx);
        self.grid.set_owner(idx, NO_OWNER);
        self.grid.dissolve_region(idx);
        self.grid.rebuild_regions_around(idx, owner);
        self.occupied -= 1;

        for &neighbor_owner in self.grid.adjacent_owners(idx).iter() {
            self.players[slot(neighbor_owner)].free_adjoining += 1;
        }

        let mut lost = 0;
        for &n in self.grid.neighbors(idx).iter() {
            if self.grid.owner(n) == NO_OWNER && self.grid.count_adjacent_cells_owned_by(n, owner) == 0 {
                lost += 1;
            }
        }

        let fragments = self.grid.count_adjacent_regions_owned_by(idx, owner);
        let p = &mut self.players[slot(owner)];
        p.occupied_fields -= 1;
        // `idx` belonged to one of the owner's regions, so regions >= 1.
        p.regions = p.regions + fragments - 1;
        p.free_adjoining -= lost;
    }
}

/// Index into `Game::players` of a validated player id.
#[inline]
fn slot(player: u32) -> usize {
    player as usize - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(width: u32, height: u32, players: u32, areas: u32) -> Game {
        Game::new(width, height, players, areas).unwrap()
    }

    #[test]
    fn new_rejects_zero_arguments() {
        assert!(matches!(Game::new(0, 10, 2, 2), Err(ConfigError::ZeroWidth)));
        assert!(matches!(Game::new(10, 0, 2, 2), Err(ConfigError::ZeroHeight)));
        assert!(matches!(Game::new(10, 10, 0, 2), Err(ConfigError::ZeroPlayers)));
        assert!(matches!(Game::new(10, 10, 2, 0), Err(ConfigError::ZeroAreaLimit)));
    }

    #[test]
    fn new_game_is_empty() {
        let g = game(4, 3, 2, 1);
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
        assert_eq!(g.players(), 2);
        assert_eq!(g.areas_limit(), 1);
        assert_eq!(g.occupied_fields(), 0);
        assert_eq!(g.config(), GameConfig::new(4, 3, 2, 1));
        assert_eq!(g.free_fields(1), 12);
        assert_eq!(g.busy_fields(2), 0);
        assert!(g.player(0).is_none());
        assert!(g.player(3).is_none());
        assert_eq!(g.player(2).unwrap().id(), 2);
    }

    #[test]
    fn move_errors_name_the_reason() {
        let mut g = game(3, 3, 2, 1);
        assert_eq!(g.try_move(0, 0, 0), Err(MoveError::InvalidPlayer(0)));
        assert_eq!(g.try_move(3, 0, 0), Err(MoveError::InvalidPlayer(3)));
        assert_eq!(g.try_move(1, 3, 0), Err(MoveError::OutOfBounds { x: 3, y: 0 }));
        assert_eq!(g.try_move(1, 0, 0), Ok(()));
        assert_eq!(
            g.try_move(2, 0, 0),
            Err(MoveError::Occupied { x: 0, y: 0, owner: 1 })
        );
        assert_eq!(
            g.try_move(1, 2, 2),
            Err(MoveError::AreaLimit { player: 1, limit: 1, x: 2, y: 2 })
        );
        assert_eq!(g.try_move(1, 1, 0), Ok(()));
        assert_eq!(g.occupied_fields(), 2);
    }

    #[test]
    fn claim_merges_regions() {
        let mut g = game(5, 1, 1, 3);
        assert!(g.make_move(1, 0, 0));
        assert!(g.make_move(1, 2, 0));
        assert!(g.make_move(1, 4, 0));
        assert_eq!(g.player(1).unwrap().regions(), 3);
        // At the limit: frontier is (1,0) and (3,0).
        assert_eq!(g.free_fields(1), 2);
        assert!(g.make_move(1, 1, 0));
        assert_eq!(g.player(1).unwrap().regions(), 2);
        assert_eq!(g.free_fields(1), 1);
        assert!(g.make_move(1, 3, 0));
        assert_eq!(g.player(1).unwrap().regions(), 1);
        assert_eq!(g.free_fields(1), 0);
        assert_eq!(g.grid().regions().size(0), 5);
        g.audit().unwrap();
    }

    #[test]
    fn frontier_shared_between_players() {
        let mut g = game(3, 1, 2, 1);
        assert!(g.make_move(1, 0, 0));
        assert!(g.make_move(2, 2, 0));
        assert_eq!(g.free_fields(1), 1);
        assert_eq!(g.free_fields(2), 1);
        assert!(g.make_move(1, 1, 0));
        assert_eq!(g.free_fields(1), 0);
        assert_eq!(g.free_fields(2), 0);
        g.audit().unwrap();
    }

    #[test]
    fn golden_move_errors_name_the_reason() {
        let mut g = game(3, 3, 3, 2);
        assert!(g.make_move(1, 1, 1));
        assert_eq!(
            g.try_golden_move(2, 0, 0),
            Err(MoveError::EmptyTarget { x: 0, y: 0 })
        );
        assert_eq!(
            g.try_golden_move(1, 1, 1),
            Err(MoveError::OwnPiece { x: 1, y: 1, player: 1 })
        );
        assert_eq!(g.try_golden_move(4, 1, 1), Err(MoveError::InvalidPlayer(4)));
        assert_eq!(g.try_golden_move(2, 1, 5), Err(MoveError::OutOfBounds { x: 1, y: 5 }));
        assert_eq!(g.try_golden_move(2, 1, 1), Ok(()));
        assert_eq!(g.owner_at(1, 1), Some(2));
        assert_eq!(g.try_golden_move(2, 1, 1), Err(MoveError::GoldenMoveUsed(2)));
        assert_eq!(g.busy_fields(1), 0);
        assert_eq!(g.player(1).unwrap().regions(), 0);
        g.audit().unwrap();
    }

    #[test]
    fn golden_move_respects_victim_limit() {
        // Player 2 owns a vertical bar; cutting its middle would leave two
        // regions, one more than the limit allows.
        let mut g = game(3, 3, 2, 1);
        assert!(g.make_move(2, 1, 0));
        assert!(g.make_move(2, 1, 1));
        assert!(g.make_move(2, 1, 2));
        assert_eq!(g.regions_after_removal(1, 1), Some(2));
        assert_eq!(
            g.try_golden_move(1, 1, 1),
            Err(MoveError::VictimAreaLimit { victim: 2, x: 1, y: 1 })
        );
        assert!(g.golden_possible(1));
        assert!(g.golden_move(1, 1, 2));
        assert_eq!(g.player(2).unwrap().regions(), 1);
        assert!(!g.golden_possible(1));
        g.audit().unwrap();
    }

    #[test]
    fn golden_move_splits_victim_region() {
        let mut g = game(5, 1, 2, 2);
        for x in 0..5 {
            assert!(g.make_move(1, x, 0));
        }
        assert!(g.golden_move(2, 2, 0));
        let p1 = g.player(1).unwrap();
        assert_eq!(p1.regions(), 2);
        assert_eq!(p1.occupied_fields(), 4);
        assert_eq!(g.grid().regions().size(0), 2);
        assert_eq!(g.grid().regions().size(4), 2);
        assert!(!g.grid().regions().same_set(0, 4));
        g.audit().unwrap();
    }

    #[test]
    fn rejected_moves_leave_game_unchanged() {
        let mut g = game(3, 3, 2, 1);
        assert!(g.make_move(2, 0, 0));
        assert!(g.make_move(2, 0, 1));
        assert!(g.make_move(2, 0, 2));
        let before = g.clone();
        assert!(!g.make_move(2, 2, 2));
        assert!(!g.make_move(1, 0, 1));
        assert!(!g.golden_move(1, 0, 1));
        assert!(!g.golden_move(1, 1, 1));
        assert!(!g.golden_move(2, 0, 0));
        assert_eq!(g, before);
    }

    #[test]
    fn golden_possible_needs_a_foreign_piece() {
        let mut g = game(2, 2, 2, 2);
        assert!(!g.golden_possible(1));
        assert!(g.make_move(1, 0, 0));
        assert!(!g.golden_possible(1));
        assert!(g.golden_possible(2));
        assert!(!g.golden_possible(0));
        assert!(!g.golden_possible(3));
    }

    #[test]
    fn golden_possible_on_a_long_strip() {
        // Player 2 holds the whole top row; player 1, at the limit, sits under
        // every cell but the two ends. Each reachable target is a cut cell.
        const WIDTH: u32 = 40_000;
        let mut g = game(WIDTH, 2, 2, 1);
        for x in 0..WIDTH {
            assert!(g.make_move(2, x, 1));
        }
        for x in 1..WIDTH - 1 {
            assert!(g.make_move(1, x, 0));
        }
        assert!(!g.golden_possible(1));
        assert!(g.golden_possible(2));
    }

    #[test]
    fn golden_possible_uses_fragment_counts() {
        let mut g = game(5, 3, 2, 2);
        for x in 0..3 {
            assert!(g.make_move(2, x, 1));
        }
        assert!(g.make_move(1, 1, 0));
        assert!(g.make_move(1, 4, 0));
        // Cutting the line leaves player 2 with two regions, within the limit.
        assert!(g.golden_possible(1));
        let mut cut = g.clone();
        assert!(cut.golden_move(1, 1, 1));
        assert_eq!(cut.player(2).unwrap().regions(), 2);

        // A second region of player 2 leaves no room for the cut.
        assert!(g.make_move(2, 4, 2));
        assert!(!g.golden_possible(1));
        assert!(!g.golden_move(1, 1, 1));
        g.audit().unwrap();
    }

    #[test]
    fn queries_on_invalid_players_are_zero() {
        let g = game(2, 2, 2, 2);
        assert_eq!(g.busy_fields(0), 0);
        assert_eq!(g.busy_fields(u32::MAX), 0);
        assert_eq!(g.free_fields(0), 0);
        assert_eq!(g.free_fields(3), 0);
        assert_eq!(g.owner_at(5, 5), None);
    }
}
