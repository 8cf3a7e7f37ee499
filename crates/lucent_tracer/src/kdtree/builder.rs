//! Recursive kd-tree construction.

use lucent_math::Aabb;

use super::split::{classify, find_best_split, BuildItem};
use super::{KdNode, TreeStats};

/// Carries the construction limits and accumulates statistics.
pub(crate) struct KdTreeBuilder {
    max_depth: u32,
    leaf_size: usize,
    stats: TreeStats,
}

impl KdTreeBuilder {
    pub fn new(max_depth: u32, leaf_size: usize) -> Self {
        Self {
            max_depth,
            leaf_size: leaf_size.max(1),
            stats: TreeStats::default(),
        }
    }

    /// Build the subtree over `items` inside `bounds`.
    pub fn build(&mut self, items: Vec<BuildItem>, bounds: Aabb, depth_remaining: u32) -> KdNode {
        self.stats.nodes += 1;

        if items.len() <= self.leaf_size || depth_remaining == 0 {
            return self.leaf(items, bounds, depth_remaining);
        }

        let Some(plane) = find_best_split(&items, &bounds) else {
            return self.leaf(items, bounds, depth_remaining);
        };

        let mut left_items = Vec::with_capacity(plane.left_count);
        let mut right_items = Vec::with_capacity(plane.right_count);
        for item in &items {
            let (in_left, in_right) = classify(item, plane.axis, plane.position);
            if in_left {
                left_items.push(*item);
            }
            if in_right {
                right_items.push(*item);
            }
        }

        // Unsplittable clustering
        if left_items.is_empty() || right_items.is_empty() {
            return self.leaf(items, bounds, depth_remaining);
        }
        drop(items);

        let mut left_bounds = bounds;
        left_bounds.set_max(plane.axis, plane.position);
        let mut right_bounds = bounds;
        right_bounds.set_min(plane.axis, plane.position);

        let left = self.build(left_items, left_bounds, depth_remaining - 1);
        let right = self.build(right_items, right_bounds, depth_remaining - 1);

        KdNode::Split {
            axis: plane.axis,
            position: plane.position,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn leaf(&mut self, items: Vec<BuildItem>, bounds: Aabb, depth_remaining: u32) -> KdNode {
        self.stats.leaves += 1;
        if items.is_empty() {
            self.stats.empty_leaves += 1;
        }
        self.stats.primitive_refs += items.len();
        self.stats.max_depth = self
            .stats
            .max_depth
            .max(self.max_depth.saturating_sub(depth_remaining));

        KdNode::Leaf {
            primitives: items.into_iter().map(|item| item.index).collect(),
            bounds,
        }
    }

    pub fn finish(self) -> TreeStats {
        self.stats
    }
}
