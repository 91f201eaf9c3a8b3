//! Area-weighted random leaf selection

use crate::algorithm::frontier::Frontier;
use crate::spatial::quadtree::NodeId;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded random selector drawing leaves in proportion to their area
///
/// Larger unrefined regions are refined sooner on average while small ones are
/// never starved. The random source is a type parameter so tests and drivers
/// can inject any [`Rng`].
#[derive(Debug, Clone)]
pub struct AreaWeightedSelector<R = StdRng> {
    rng: R,
}

impl AreaWeightedSelector<StdRng> {
    /// Create a deterministic selector from a seed
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AreaWeightedSelector<R> {
    /// Wrap an existing random source
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one leaf with probability `area / total_area`
    ///
    /// Returns `None` only for an empty frontier, the normal end of a reveal.
    pub fn select(&mut self, frontier: &Frontier) -> Option<NodeId> {
        select_weighted_leaf(frontier, &mut self.rng)
    }
}

/// Draw one leaf from the frontier with probability proportional to its area
///
/// Draws a uniform integer in `[0, total_area)` and returns the first leaf, in
/// slot order, whose cumulative area exceeds it. If no slot claims the draw the
/// last leaf is returned; with exact integer sums this only matters for a
/// frontier whose areas are all zero.
pub fn select_weighted_leaf<R: Rng>(frontier: &Frontier, rng: &mut R) -> Option<NodeId> {
    let last = frontier.len().checked_sub(1)?;
    let total = frontier.total_area();
    if total == 0 {
        return frontier.member(last);
    }

    let draw = rng.random_range(0..total);
    let slot = frontier.weights().find(draw).unwrap_or(last);
    frontier.member(slot)
}
