//! Tests for frontier membership and area bookkeeping

#[cfg(test)]
mod tests {
    use quadreveal::algorithm::frontier::Frontier;
    use quadreveal::spatial::{NodeId, QuadTree};

    fn leaf_ids(count: usize) -> Vec<NodeId> {
        // Split a tree so the arena holds enough distinct ids
        let mut tree = QuadTree::new(64).expect("valid side length");
        let mut next = NodeId::ROOT;
        while tree.node_count() < count {
            let children = tree.split(next).expect("leaf above unit size");
            next = children[0];
        }
        tree.iter().map(|(id, _)| id).take(count).collect()
    }

    // Tests insertion, membership and total area
    // Verified by not accumulating area on insert
    #[test]
    fn test_insert_and_contains() {
        let ids = leaf_ids(5);
        let mut frontier = Frontier::new();

        assert!(frontier.is_empty());
        assert!(frontier.insert(ids[1], 16));
        assert!(frontier.insert(ids[4], 4));
        assert!(!frontier.insert(ids[1], 16));

        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.total_area(), 20);
        assert!(frontier.contains(ids[1]));
        assert!(frontier.contains(ids[4]));
        assert!(!frontier.contains(ids[0]));
    }

    // Tests removal moves the last member into the freed slot
    // Verified by forgetting to update the moved member's slot
    #[test]
    fn test_remove_keeps_slots_consistent() {
        let ids = leaf_ids(4);
        let mut frontier = Frontier::new();
        for (area, &id) in [1, 2, 3, 4].into_iter().zip(&ids) {
            frontier.insert(id, area);
        }

        assert!(frontier.remove(ids[1]));
        assert!(!frontier.remove(ids[1]));

        let members: Vec<(NodeId, u64)> = frontier.iter().collect();
        assert_eq!(members, vec![(ids[0], 1), (ids[3], 4), (ids[2], 3)]);
        assert_eq!(frontier.total_area(), 8);

        // The moved member must still be removable from its new slot
        assert!(frontier.remove(ids[3]));
        assert_eq!(frontier.member(1), Some(ids[2]));
        assert_eq!(frontier.total_area(), 4);
        assert_eq!(frontier.weights().prefix_sum(1), 1);
    }

    // Tests removing the last member and reinserting
    // Verified by skipping the weight pop on removal
    #[test]
    fn test_remove_last_then_reinsert() {
        let ids = leaf_ids(2);
        let mut frontier = Frontier::new();
        frontier.insert(ids[0], 9);
        frontier.insert(ids[1], 7);

        assert!(frontier.remove(ids[1]));
        assert!(frontier.remove(ids[0]));
        assert!(frontier.is_empty());
        assert_eq!(frontier.total_area(), 0);

        assert!(frontier.insert(ids[1], 5));
        assert_eq!(frontier.member(0), Some(ids[1]));
        assert_eq!(frontier.total_area(), 5);
    }

    // Tests clearing drops all members
    // Verified by keeping slot lookups after clear
    #[test]
    fn test_clear() {
        let ids = leaf_ids(3);
        let mut frontier = Frontier::new();
        for &id in &ids {
            frontier.insert(id, 1);
        }

        frontier.clear();

        assert!(frontier.is_empty());
        assert!(!frontier.contains(ids[0]));
        assert!(frontier.insert(ids[0], 2));
        assert_eq!(frontier.total_area(), 2);
    }
}
