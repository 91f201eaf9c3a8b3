//! Spatial data structures for the reveal grid
//!
//! This module contains:
//! - The arena-backed quadtree that explains how the grid was subdivided
//! - The per-pixel detail buffer mirrored from the tree

/// Per-pixel detail levels
pub mod detail;
/// Arena quadtree, nodes and regions
pub mod quadtree;

pub use detail::DetailBuffer;
pub use quadtree::{Node, NodeId, NodeKind, QuadTree, Region};
