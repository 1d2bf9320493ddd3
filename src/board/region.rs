//! Disjoint-region tracker.
//!
//! A union-find over cell indices that also supports `split`: dissolving a
//! whole set back into singletons. Every set is kept as a circular doubly
//! linked ring of its members, so both relabelling the absorbed set on union
//! and dissolving a set on split are a single walk around one ring.
//!
//! Each node stores its representative directly, which makes `same_set` and
//! `size` O(1). Union relabels the smaller set, so the total relabelling
//! work over a sequence of unions stays O(n log n).
//!
//! All operations silently ignore out-of-range indices.

use std::collections::TryReserveError;

/// Union-find record for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    /// Representative of the set this node belongs to.
    repr: usize,
    /// Next member in the set's ring.
    next: usize,
    /// Previous member in the set's ring.
    prev: usize,
    /// Set size. Authoritative only on the representative; zero on a node
    /// that was absorbed as a representative.
    size: u64,
}

impl Node {
    const fn singleton(idx: usize) -> Self {
        Node {
            repr: idx,
            next: idx,
            prev: idx,
            size: 1,
        }
    }
}

/// Arena of union-find nodes addressed by cell index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    nodes: Vec<Node>,
}

impl RegionSet {
    /// Creates `len` singleton sets, reporting allocation failure instead of
    /// aborting.
    pub fn with_len(len: usize) -> Result<Self, TryReserveError> {
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(len)?;
        nodes.extend((0..len).map(Node::singleton));
        Ok(RegionSet { nodes })
    }

    /// Resets `idx` to a fresh singleton set.
    ///
    /// Only sound when no other node still references `idx`; use `split`
    /// to dissolve a set that has other members.
    pub fn init(&mut self, idx: usize) {
        if let Some(node) = self.nodes.get_mut(idx) {
            *node = Node::singleton(idx);
        }
    }

    /// Representative of the set containing `idx`.
    #[inline]
    pub fn find(&self, idx: usize) -> Option<usize> {
        self.nodes.get(idx).map(|n| n.repr)
    }

    /// Returns true if both indices are valid and belong to the same set.
    #[inline]
    pub fn same_set(&self, a: usize, b: usize) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    /// Size of the set containing `idx`, or 0 for an invalid index.
    #[inline]
    pub fn size(&self, idx: usize) -> u64 {
        match self.find(idx) {
            Some(r) => self.nodes[r].size,
            None => 0,
        }
    }

    /// Returns true if `idx` is alone in its set.
    #[inline]
    pub fn is_singleton(&self, idx: usize) -> bool {
        self.nodes.get(idx).is_some_and(|n| n.next == idx)
    }

    /// Merges the sets containing `a` and `b`. The larger set absorbs the
    /// smaller one; on a tie the set of `b` absorbs the set of `a`.
    pub fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) if ra != rb => (ra, rb),
            _ => return,
        };

        let (big, small) = if self.nodes[ra].size <= self.nodes[rb].size {
            (rb, ra)
        } else {
            (ra, rb)
        };

        self.nodes[big].size += self.nodes[small].size;
        self.nodes[small].size = 0;

        let mut cur = small;
        loop {
            self.nodes[cur].repr = big;
            cur = self.nodes[cur].next;
            if cur == small {
                break;
            }
        }

        // Splice the two rings: big -> small_next .. small -> big_next .. big.
        let big_next = self.nodes[big].next;
        let small_next = self.nodes[small].next;
        self.nodes[big].next = small_next;
        self.nodes[small_next].prev = big;
        self.nodes[small].next = big_next;
        self.nodes[big_next].prev = small;
    }

    /// Dissolves the whole set containing `idx` into singletons.
    pub fn split(&mut self, idx: usize) {
        if idx >= self.nodes.len() || self.is_singleton(idx) {
            return;
        }
        let mut cur = idx;
        loop {
            let next = self.nodes[cur].next;
            self.nodes[cur] = Node::singleton(cur);
            cur = next;
            if cur == idx {
                break;
            }
        }
    }

    /// Collects the members of the set containing `idx` in ring order.
    pub fn members(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        if idx >= self.nodes.len() {
            return out;
        }
        let mut cur = idx;
        loop {
            out.push(cur);
            cur = self.nodes[cur].next;
            if cur == idx {
                break;
            }
        }
        out
    }

    /// Checks the ring links and representative bookkeeping of the set that
    /// contains `idx`: prev/next agree, every member names the same
    /// representative, and the representative's size matches the ring length.
    pub fn ring_is_consistent(&self, idx: usize) -> bool {
        let Some(repr) = self.find(idx) else {
            return false;
        };
        let members = self.members(idx);
        members.iter().all(|&m| {
            let node = &self.nodes[m];
            node.repr == repr && self.nodes[node.next].prev == m
        }) && self.nodes[repr].size == members.len() as u64
    }
}
