//! Cell graph of a rectangular board.
//!
//! Cells live in a dense arena indexed by `y * width + x`. Each cell owns a
//! node in the board's `RegionSet`, addressed by the same index, and a
//! transient `visited` marker used by the bounded flood fills below. Every
//! traversal resets the markers it set before returning.
//!
//! Neighbours are derived from the index on demand (4-adjacency, boundary
//! aware) and returned by value, so callers can mutate the grid while
//! iterating over them.

use std::collections::{TryReserveError, VecDeque};
use std::ops::Deref;

use super::region::RegionSet;

/// Owner id of an unclaimed cell.
pub const NO_OWNER: u32 = 0;

/// Maximum number of neighbours a cell can have.
pub const MAX_NEIGHBORS: usize = 4;

/// One board cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub owner: u32,
    visited: bool,
}

impl Cell {
    /// Whether a traversal marker is set. Always false between calls.
    pub fn visited(&self) -> bool {
        self.visited
    }
}

/// Up to four neighbouring cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    cells: [usize; MAX_NEIGHBORS],
    len: u8,
}

impl Neighbors {
    fn push(&mut self, idx: usize) {
        self.cells[self.len as usize] = idx;
        self.len += 1;
    }
}

impl Deref for Neighbors {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.cells[..self.len as usize]
    }
}

/// Up to four distinct player ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owners {
    ids: [u32; MAX_NEIGHBORS],
    len: u8,
}

impl Deref for Owners {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.ids[..self.len as usize]
    }
}

/// The board: cells, their region sets, and traversal scratch space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    regions: RegionSet,
    queue: VecDeque<usize>,
    touched: Vec<usize>,
}

impl Grid {
    /// Allocates a `width` x `height` board of unowned cells.
    ///
    /// `len` must equal `width * height`; the caller has already checked
    /// that the product fits in `usize`.
    pub(crate) fn with_size(width: u32, height: u32, len: usize) -> Result<Self, TryReserveError> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(len)?;
        cells.resize(len, Cell::default());
        let regions = RegionSet::with_len(len)?;
        Ok(Grid {
            width,
            height,
            cells,
            regions,
            queue: VecDeque::new(),
            touched: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells on the board.
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    /// Arena index of `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Coordinates of the cell at `idx`.
    #[inline]
    pub(crate) fn coords(&self, idx: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((idx % w) as u32, (idx / w) as u32)
    }

    #[inline]
    pub(crate) fn owner(&self, idx: usize) -> u32 {
        self.cells[idx].owner
    }

    pub(crate) fn set_owner(&mut self, idx: usize, owner: u32) {
        self.cells[idx].owner = owner;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Neighbours of `idx` in up, left, down, right order, skipping those
    /// beyond the board edge.
    pub(crate) fn neighbors(&self, idx: usize) -> Neighbors {
        let (x, y) = self.coords(idx);
        let w = self.width as usize;
        let mut out = Neighbors {
            cells: [0; MAX_NEIGHBORS],
            len: 0,
        };
        if y + 1 < self.height {
            out.push(idx + w);
        }
        if x > 0 {
            out.push(idx - 1);
        }
        if y > 0 {
            out.push(idx - w);
        }
        if x + 1 < self.width {
            out.push(idx + 1);
        }
        out
    }

    /// Number of neighbours of `idx` owned by `player`.
    pub(crate) fn count_adjacent_cells_owned_by(&self, idx: usize, player: u32) -> u32 {
        if player == NO_OWNER {
            return 0;
        }
        self.neighbors(idx)
            .iter()
            .filter(|&&n| self.owner(n) == player)
            .count() as u32
    }

    /// Number of distinct regions of `player` touching `idx`.
    ///
    /// Pairwise same-set checks over at most four neighbours: a neighbour is
    /// counted unless a later neighbour belongs to the same region.
    pub(crate) fn count_adjacent_regions_owned_by(&self, idx: usize, player: u32) -> u32 {
        if player == NO_OWNER {
            return 0;
        }
        let nbrs = self.neighbors(idx);
        let mut count = 0;
        for (i, &a) in nbrs.iter().enumerate() {
            if self.owner(a) != player {
                continue;
            }
            let repeated = nbrs[i + 1..]
                .iter()
                .any(|&b| self.owner(b) == player && self.regions.same_set(a, b));
            if !repeated {
                count += 1;
            }
        }
        count
    }

    /// Distinct non-empty owners among the neighbours of `idx`.
    pub(crate) fn adjacent_owners(&self, idx: usize) -> Owners {
        let mut out = Owners {
            ids: [NO_OWNER; MAX_NEIGHBORS],
            len: 0,
        };
        for &n in self.neighbors(idx).iter() {
            let owner = self.owner(n);
            if owner != NO_OWNER && !out.contains(&owner) {
                out.ids[out.len as usize] = owner;
                out.len += 1;
            }
        }
        out
    }

    /// How many regions the region containing `idx` would fall apart into
    /// if the piece on `idx` were removed.
    ///
    /// Flood-fills same-owner cells from each neighbour without passing
    /// through `idx`, counting one region per fill that reaches unvisited
    /// territory. Returns 0 for an empty cell or a cell with no same-owner
    /// neighbours. Leaves the grid exactly as it found it.
    pub(crate) fn count_regions_after_removal(&mut self, idx: usize) -> u32 {
        let player = self.owner(idx);
        if player == NO_OWNER {
            return 0;
        }
        self.mark(idx);
        let mut count = 0;
        for &start in self.neighbors(idx).iter() {
            if self.owner(start) != player || self.cells[start].visited {
                continue;
            }
            self.flood(start, player, false);
            count += 1;
        }
        self.clear_marks();
        log::trace!("removing cell {idx} of player {player} leaves {count} region(s)");
        count
    }

    /// For every owned cell, the value `count_regions_after_removal` would
    /// return for it, computed for the whole board in one pass.
    ///
    /// Iterative low-link DFS over each region: a cell's fragments are its
    /// DFS children whose subtree cannot reach above it, plus the part
    /// holding its DFS parent. Empty cells get 0.
    pub(crate) fn removal_fragments(&self) -> Vec<u8> {
        let len = self.len();
        // Discovery times start at 1; 0 means unvisited.
        let mut disc = vec![0usize; len];
        let mut low = vec![0usize; len];
        let mut fragments = vec![0u8; len];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut time = 0;

        for root in 0..len {
            let player = self.owner(root);
            if player == NO_OWNER || disc[root] != 0 {
                continue;
            }
            time += 1;
            disc[root] = time;
            low[root] = time;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (cur, next) = *top;
                if let Some(&n) = self.neighbors(cur).get(next) {
                    top.1 += 1;
                    if self.owner(n) != player {
                        continue;
                    }
                    if disc[n] == 0 {
                        time += 1;
                        disc[n] = time;
                        low[n] = time;
                        fragments[n] = 1;
                        stack.push((n, 0));
                    } else {
                        low[cur] = low[cur].min(disc[n]);
                    }
                    continue;
                }
                stack.pop();
                if let Some(&(parent, _)) = stack.last() {
                    low[parent] = low[parent].min(low[cur]);
                    if low[cur] >= disc[parent] {
                        fragments[parent] += 1;
                    }
                }
            }
        }
        log::trace!("computed removal fragments for {len} cells");
        fragments
    }

    /// Re-derives region membership among the `player`-owned neighbours of
    /// `idx`: every same-owner cell reachable from a neighbour is unioned
    /// into that neighbour's region.
    pub(crate) fn rebuild_regions_around(&mut self, idx: usize, player: u32) {
        if player == NO_OWNER {
            return;
        }
        for &start in self.neighbors(idx).iter() {
            if self.owner(start) != player || self.cells[start].visited {
                continue;
            }
            self.flood(start, player, true);
        }
        self.clear_marks();
    }

    /// Joins the regions of `a` and `b`.
    pub(crate) fn connect(&mut self, a: usize, b: usize) {
        self.regions.union(a, b);
    }

    /// Dissolves the region containing `idx` into singleton cells.
    pub(crate) fn dissolve_region(&mut self, idx: usize) {
        self.regions.split(idx);
    }

    /// Breadth-first fill over `player` cells from `start`. Marks every cell
    /// it reaches; with `join`, unions each one into `start`'s region.
    fn flood(&mut self, start: usize, player: u32, join: bool) {
        self.mark(start);
        self.queue.push_back(start);
        while let Some(cur) = self.queue.pop_front() {
            for &next in self.neighbors(cur).iter() {
                if self.cells[next].visited || self.owner(next) != player {
                    continue;
                }
                self.mark(next);
                if join {
                    self.regions.union(next, start);
                }
                self.queue.push_back(next);
            }
        }
    }

    fn mark(&mut self, idx: usize) {
        self.cells[idx].visited = true;
        self.touched.push(idx);
    }

    fn clear_marks(&mut self) {
        for idx in self.touched.drain(..) {
            self.cells[idx].visited = false;
        }
    }
}
