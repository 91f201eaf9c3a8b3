//! Refinement engine driving the reveal one tick at a time
//!
//! Each tick draws a live leaf by area, lowers the detail level of its pixels
//! by one and splits it into four quadrants that join the frontier. Unit
//! leaves already sit at level 0 when drawn; they are retired instead, leaving
//! the buffer untouched. The tree, frontier and buffer are only ever mutated
//! together, so between ticks every live leaf's pixels hold
//! `max_level - depth`.

use bitvec::prelude::*;
use rand::{Rng, rngs::StdRng};

use crate::algorithm::frontier::Frontier;
use crate::algorithm::selection::AreaWeightedSelector;
use crate::io::configuration::RevealConfig;
use crate::io::error::{Result, WithContext, invalid_state};
use crate::spatial::{DetailBuffer, NodeId, NodeKind, QuadTree, Region};

/// What a tick did to the selected leaf
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefineKind {
    /// Pixels were lowered one level and the leaf was split
    Sharpened,
    /// A unit leaf was excluded from further refinement
    Retired,
}

/// Summary of a single completed tick
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RefineInfo {
    /// Depth of the refined node
    pub refined_depth: u32,
    /// Pixels covered by the refined node, `extent^2`
    pub pixels_refined: u64,
    /// Region covered by the refined node
    pub region: Region,
    /// Whether the region was sharpened or retired
    pub kind: RefineKind,
}

/// Result of asking the engine for a tick
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefineOutcome {
    /// A leaf was refined
    Refined(RefineInfo),
    /// Nothing is left to refine; the buffer is entirely zero
    FullyResolved,
}

impl RefineOutcome {
    /// Test for the terminal outcome
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::FullyResolved)
    }

    /// Details of the refined leaf, if any
    pub const fn info(&self) -> Option<&RefineInfo> {
        match self {
            Self::Refined(info) => Some(info),
            Self::FullyResolved => None,
        }
    }
}

/// Running totals since the last reset
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealProgress {
    /// Completed ticks of either kind
    pub ticks: u64,
    /// Ticks that lowered detail levels
    pub sharpened_ticks: u64,
    /// Ticks that retired a unit leaf
    pub retired_ticks: u64,
    /// Sum of `pixels_refined` over sharpening ticks
    pub pixels_sharpened: u64,
}

impl RevealProgress {
    fn record(&mut self, info: &RefineInfo) {
        self.ticks += 1;
        match info.kind {
            RefineKind::Sharpened => {
                self.sharpened_ticks += 1;
                self.pixels_sharpened += info.pixels_refined;
            }
            RefineKind::Retired => self.retired_ticks += 1,
        }
    }
}

/// Owns the quadtree, frontier, detail buffer and selector for one grid size
#[derive(Debug, Clone)]
pub struct RefinementEngine<R = StdRng> {
    tree: QuadTree,
    frontier: Frontier,
    buffer: DetailBuffer,
    selector: AreaWeightedSelector<R>,
    progress: RevealProgress,
}

impl RefinementEngine<StdRng> {
    /// Create an engine with a seeded selector
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `side_length` is not an accepted power of two
    pub fn with_seed(side_length: u32, seed: u64) -> Result<Self> {
        Self::with_selector(side_length, AreaWeightedSelector::from_seed(seed))
    }

    /// Create an engine from validated runtime configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration fails validation
    pub fn from_config(config: &RevealConfig) -> Result<Self> {
        config.validate()?;
        Self::with_seed(config.side_length, config.seed)
    }
}

impl<R: Rng> RefinementEngine<R> {
    /// Create an engine drawing from the given random source
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `side_length` is not an accepted power of two
    pub fn new(side_length: u32, rng: R) -> Result<Self> {
        Self::with_selector(side_length, AreaWeightedSelector::new(rng))
    }

    fn with_selector(side_length: u32, selector: AreaWeightedSelector<R>) -> Result<Self> {
        let tree = QuadTree::new(side_length)?;
        let max_level = tree.max_level();
        log::debug!("creating {side_length}x{side_length} reveal grid, maximum detail level {max_level}");

        let mut engine = Self {
            tree,
            frontier: Frontier::new(),
            buffer: DetailBuffer::new(side_length, max_level),
            selector,
            progress: RevealProgress::default(),
        };
        engine.seed_frontier();
        Ok(engine)
    }

    /// Return to a single blurred root leaf, ready for a new image
    pub fn reset(&mut self) {
        self.tree.reset();
        self.buffer.fill_max();
        self.progress = RevealProgress::default();
        self.seed_frontier();
        log::debug!(
            "reset {side}x{side} reveal grid",
            side = self.tree.side_length()
        );
    }

    /// Refine one area-weighted random leaf
    ///
    /// # Errors
    ///
    /// Returns an invalid state error if the tree, frontier and buffer have
    /// drifted apart, or an invalid operation error if splitting is rejected.
    /// Neither occurs while the engine is only driven through its own API.
    pub fn refine_one(&mut self) -> Result<RefineOutcome> {
        let Some(id) = self.selector.select(&self.frontier) else {
            return Ok(RefineOutcome::FullyResolved);
        };
        let tick = self.progress.ticks + 1;

        let node = *self
            .tree
            .node(id)
            .ok_or_else(|| invalid_state(&format!("frontier holds unknown node {id}")))
            .with_tick(tick)?;
        if node.is_interior() {
            return Err(invalid_state(&format!(
                "selected node {id} is an interior node"
            )))
            .with_tick(tick);
        }

        let region = node.region();
        let expected = self.level_at_depth(node.depth()).with_tick(tick)?;

        let kind = if node.is_terminal() {
            if self.buffer.region_level(region) != Some(expected) {
                return Err(invalid_state(&format!(
                    "unit leaf {id} does not hold level {expected}"
                )))
                .with_tick(tick);
            }
            self.tree.retire(id)?;
            self.leave_frontier(id).with_tick(tick)?;
            RefineKind::Retired
        } else {
            self.buffer.sharpen(region, expected).with_tick(tick)?;
            let children = self.tree.split(id)?;
            self.leave_frontier(id).with_tick(tick)?;
            for (child, quadrant) in children.into_iter().zip(region.quadrants()) {
                self.frontier.insert(child, quadrant.area());
            }
            RefineKind::Sharpened
        };

        let info = RefineInfo {
            refined_depth: node.depth(),
            pixels_refined: region.area(),
            region,
            kind,
        };
        self.progress.record(&info);
        log::trace!("tick {tick}: {kind:?} {region:?} at depth {}", node.depth());

        if self.frontier.is_empty() {
            log::debug!("reveal fully resolved after {tick} ticks");
        }

        Ok(RefineOutcome::Refined(info))
    }

    /// Flat row-major detail levels for the renderer
    pub fn detail_levels(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// The detail buffer
    pub const fn buffer(&self) -> &DetailBuffer {
        &self.buffer
    }

    /// The quadtree explaining the current buffer
    pub const fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// Leaves still eligible for refinement
    pub const fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Grid side length
    pub const fn side_length(&self) -> u32 {
        self.tree.side_length()
    }

    /// Coarsest detail level, `log2(side_length)`
    pub const fn max_level(&self) -> u8 {
        self.tree.max_level()
    }

    /// Totals since the last reset
    pub const fn progress(&self) -> RevealProgress {
        self.progress
    }

    /// Test if every region has been refined
    pub fn is_resolved(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Ticks needed to go from a reset to fully resolved
    ///
    /// Every node of extent 2 or more is sharpened once, `(side^2 - 1) / 3`
    /// of them, and every one of the `side^2` unit leaves is retired once.
    pub fn total_ticks(&self) -> u64 {
        let pixels = u64::from(self.side_length()).pow(2);
        (pixels - 1) / 3 + pixels
    }

    /// Sharpening ticks needed to go from a reset to fully resolved
    pub fn total_sharpening_ticks(&self) -> u64 {
        (u64::from(self.side_length()).pow(2) - 1) / 3
    }

    /// Check the tree, frontier and buffer against each other
    ///
    /// Verifies that childless nodes tile the grid with no gap or overlap,
    /// that the frontier holds exactly the live leaves, and that every
    /// leaf's pixels hold the level implied by its depth.
    ///
    /// # Errors
    ///
    /// Returns an invalid state error describing the first violation found
    pub fn verify_partition(&self) -> Result<()> {
        let side = self.side_length() as usize;
        let mut covered = bitvec![0; side * side];
        let mut live_leaves = 0;

        for (id, node) in self.tree.leaves() {
            let region = node.region();
            for y in region.rows() {
                for x in region.cols() {
                    let index = y * side + x;
                    if covered.get(index).as_deref() != Some(&false) {
                        return Err(invalid_state(&format!(
                            "leaf {id} overlaps another leaf or leaves the grid at ({x}, {y})"
                        )));
                    }
                    covered.set(index, true);
                }
            }

            let expected = match node.kind() {
                NodeKind::Leaf => {
                    live_leaves += 1;
                    if !self.frontier.contains(id) {
                        return Err(invalid_state(&format!(
                            "live leaf {id} is missing from the frontier"
                        )));
                    }
                    self.level_at_depth(node.depth())?
                }
                NodeKind::Retired => {
                    if self.frontier.contains(id) {
                        return Err(invalid_state(&format!(
                            "retired leaf {id} is still in the frontier"
                        )));
                    }
                    0
                }
                NodeKind::Interior { .. } => continue,
            };
            if self.buffer.region_level(region) != Some(expected) {
                return Err(invalid_state(&format!(
                    "leaf {id} does not hold uniform level {expected}"
                )));
            }
        }

        if covered.not_all() {
            return Err(invalid_state(&"leaf regions leave part of the grid uncovered"));
        }
        if live_leaves != self.frontier.len() {
            return Err(invalid_state(&format!(
                "frontier holds {} nodes but the tree has {live_leaves} live leaves",
                self.frontier.len()
            )));
        }
        Ok(())
    }

    fn seed_frontier(&mut self) {
        self.frontier.clear();
        let root = NodeId::ROOT;
        let area = self
            .tree
            .node(root)
            .map_or(0, |node| node.region().area());
        self.frontier.insert(root, area);
    }

    fn leave_frontier(&mut self, id: NodeId) -> Result<()> {
        if self.frontier.remove(id) {
            Ok(())
        } else {
            Err(invalid_state(&format!("node {id} was not in the frontier")))
        }
    }

    fn level_at_depth(&self, depth: u32) -> Result<u8> {
        u32::from(self.max_level())
            .checked_sub(depth)
            .map(|level| level as u8)
            .ok_or_else(|| {
                invalid_state(&format!(
                    "depth {depth} exceeds maximum level {}",
                    self.max_level()
                ))
            })
    }
}
