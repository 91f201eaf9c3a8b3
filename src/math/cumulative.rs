//! Fenwick tree over integer slot weights
//!
//! Backs area-weighted leaf selection: slots are appended and removed as leaves
//! enter and leave the frontier, and a uniform draw in `[0, total)` is mapped
//! back to the slot whose cumulative range contains it.

/// Prefix-summed integer weights supporting append, pop, replace and search
///
/// Every operation is `O(log n)`. Integer weights keep the cumulative ranges
/// exact, so a draw strictly below [`CumulativeWeights::total`] always lands on
/// a slot with non-zero weight.
#[derive(Debug, Clone, Default)]
pub struct CumulativeWeights {
    /// Fenwick nodes, node `i` (1-based) stored at `tree[i - 1]`
    tree: Vec<u64>,
    weights: Vec<u64>,
    total: u64,
}

impl CumulativeWeights {
    /// Create an empty set of weights
    pub const fn new() -> Self {
        Self {
            tree: Vec::new(),
            weights: Vec::new(),
            total: 0,
        }
    }

    /// Create an empty set with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: Vec::with_capacity(capacity),
            weights: Vec::with_capacity(capacity),
            total: 0,
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Test if no slots are present
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all slot weights
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Weight stored at `slot`
    pub fn weight(&self, slot: usize) -> Option<u64> {
        self.weights.get(slot).copied()
    }

    /// Remove every slot, keeping the allocation
    pub fn clear(&mut self) {
        self.tree.clear();
        self.weights.clear();
        self.total = 0;
    }

    /// Append a slot at the end
    pub fn push(&mut self, weight: u64) {
        let index = self.weights.len() + 1;
        let lowbit = index & index.wrapping_neg();
        // Node `index` covers slots (index - lowbit, index]
        let covered = self.prefix_sum(index - 1) - self.prefix_sum(index - lowbit);
        self.tree.push(covered + weight);
        self.weights.push(weight);
        self.total += weight;
    }

    /// Remove the last slot and return its weight
    pub fn pop(&mut self) -> Option<u64> {
        let weight = self.weights.pop()?;
        self.tree.pop();
        self.total -= weight;
        Some(weight)
    }

    /// Replace the weight at `slot`, returning the previous weight
    pub fn set(&mut self, slot: usize, weight: u64) -> Option<u64> {
        let previous = self.weight(slot)?;
        if weight >= previous {
            self.add(slot, weight - previous);
            self.total += weight - previous;
        } else {
            self.subtract(slot, previous - weight);
            self.total -= previous - weight;
        }
        if let Some(stored) = self.weights.get_mut(slot) {
            *stored = weight;
        }
        Some(previous)
    }

    /// Sum of the first `count` slots
    pub fn prefix_sum(&self, count: usize) -> u64 {
        let mut sum = 0;
        let mut index = count.min(self.tree.len());
        while index > 0 {
            sum += self.tree.get(index - 1).copied().unwrap_or(0);
            index &= index - 1;
        }
        sum
    }

    /// Find the first slot whose cumulative end exceeds `offset`
    ///
    /// Returns `None` when `offset >= total`, which includes the empty case.
    pub fn find(&self, offset: u64) -> Option<usize> {
        if offset >= self.total {
            return None;
        }

        let len = self.tree.len();
        let mut position = 0;
        let mut remaining = offset;
        let mut step = if len == 0 { 0 } else { 1 << len.ilog2() };

        while step > 0 {
            let next = position + step;
            if next <= len {
                let node = self.tree.get(next - 1).copied().unwrap_or(u64::MAX);
                if node <= remaining {
                    position = next;
                    remaining -= node;
                }
            }
            step >>= 1;
        }

        (position < len).then_some(position)
    }

    fn add(&mut self, slot: usize, delta: u64) {
        let mut index = slot + 1;
        while index <= self.tree.len() {
            if let Some(node) = self.tree.get_mut(index - 1) {
                *node += delta;
            }
            index += index & index.wrapping_neg();
        }
    }

    fn subtract(&mut self, slot: usize, delta: u64) {
        let mut index = slot + 1;
        while index <= self.tree.len() {
            if let Some(node) = self.tree.get_mut(index - 1) {
                *node -= delta;
            }
            index += index & index.wrapping_neg();
        }
    }
}
