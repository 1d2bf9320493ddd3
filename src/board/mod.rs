//! Board representation.
//!
//! Contains the disjoint-region tracker and the cell graph built on top of
//! it. Both are addressed by the dense cell index `y * width + x`.

pub mod grid;
pub mod region;

pub use grid::{Cell, Grid, MAX_NEIGHBORS, NO_OWNER};
pub use region::RegionSet;
