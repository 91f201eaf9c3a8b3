//! Live leaf set with area weights kept in prefix-summed form

use crate::math::cumulative::CumulativeWeights;
use crate::spatial::quadtree::NodeId;

/// The set of leaves that may still be refined
///
/// Members occupy dense slots so enumeration order is stable between
/// mutations. Removal moves the last member into the vacated slot, keeping
/// insertion and removal `O(log n)` including the weight update.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    members: Vec<NodeId>,
    /// Slot of each node, indexed by arena position
    slot_of: Vec<Option<usize>>,
    weights: CumulativeWeights,
}

impl Frontier {
    /// Create an empty frontier
    pub const fn new() -> Self {
        Self {
            members: Vec::new(),
            slot_of: Vec::new(),
            weights: CumulativeWeights::new(),
        }
    }

    /// Number of live leaves
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Test if nothing is left to refine
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Combined area of all live leaves
    pub const fn total_area(&self) -> u64 {
        self.weights.total()
    }

    /// Test membership
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Add a leaf with the given area
    ///
    /// Returns `false` if the leaf was already present.
    pub fn insert(&mut self, id: NodeId, area: u64) -> bool {
        if self.contains(id) {
            return false;
        }
        if id.index() >= self.slot_of.len() {
            self.slot_of.resize(id.index() + 1, None);
        }
        if let Some(entry) = self.slot_of.get_mut(id.index()) {
            *entry = Some(self.members.len());
        }
        self.members.push(id);
        self.weights.push(area);
        true
    }

    /// Remove a leaf
    ///
    /// Returns `false` if the leaf was not present.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(slot) = self.slot_of.get_mut(id.index()).and_then(Option::take) else {
            return false;
        };

        let last = self.members.len() - 1;
        let last_weight = self.weights.weight(last).unwrap_or(0);
        self.weights.set(slot, last_weight);
        self.weights.pop();
        self.members.swap_remove(slot);

        if let Some(&moved) = self.members.get(slot) {
            if let Some(entry) = self.slot_of.get_mut(moved.index()) {
                *entry = Some(slot);
            }
        }
        true
    }

    /// Remove every leaf, keeping allocations
    pub fn clear(&mut self) {
        self.members.clear();
        self.slot_of.clear();
        self.weights.clear();
    }

    /// Leaf stored at `slot`
    pub fn member(&self, slot: usize) -> Option<NodeId> {
        self.members.get(slot).copied()
    }

    /// Enumerate members with their areas in slot order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, u64)> + '_ {
        self.members
            .iter()
            .enumerate()
            .map(|(slot, &id)| (id, self.weights.weight(slot).unwrap_or(0)))
    }

    /// Prefix-summed areas in slot order
    pub const fn weights(&self) -> &CumulativeWeights {
        &self.weights
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        self.slot_of.get(id.index()).copied().flatten()
    }
}
