//! kd-tree spatial partition over scene primitives.
//!
//! Construction recursively cuts the primitive set with axis-aligned planes
//! chosen by a surface-area heuristic ([`split`]). Primitives straddling a
//! plane are referenced from both children. Traversal walks the tree front to
//! back along the ray and stops at the first leaf whose closest hit lies
//! before the next plane crossing.

mod builder;
mod split;
mod traverse;

use std::time::Instant;

use lucent_core::KdTreeConfig;
use lucent_math::Aabb;

use crate::{Primitive, TracerError, TracerResult};
use builder::KdTreeBuilder;
use split::BuildItem;

/// Tree node: an axis-aligned split or a leaf of primitive indices.
#[derive(Debug)]
pub enum KdNode {
    Split {
        /// 0=X, 1=Y, 2=Z
        axis: usize,
        position: f32,
        /// Half-space below `position`
        left: Box<KdNode>,
        /// Half-space above `position`
        right: Box<KdNode>,
    },
    Leaf {
        /// Indices into the primitive slice the tree was built over
        primitives: Vec<usize>,
        bounds: Aabb,
    },
}

/// Shape of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub empty_leaves: usize,
    /// Deepest leaf, counted in split levels below the root
    pub max_depth: u32,
    /// Total leaf entries, counting duplicates
    pub primitive_refs: usize,
}

/// kd-tree over a primitive slice. The tree stores indices; the slice is
/// passed again at query time.
#[derive(Debug)]
pub struct KdTree {
    root: KdNode,
    bounds: Aabb,
    stats: TreeStats,
}

impl KdTree {
    /// Build over every primitive in `primitives`.
    pub fn build<P: Primitive>(primitives: &[P], config: &KdTreeConfig) -> TracerResult<Self> {
        let indices: Vec<usize> = (0..primitives.len()).collect();
        Self::build_subset(primitives, &indices, config)
    }

    /// Build over `indices` of `primitives`.
    ///
    /// Fails if any referenced primitive reports NaN or infinite bounds.
    pub fn build_subset<P: Primitive>(
        primitives: &[P],
        indices: &[usize],
        config: &KdTreeConfig,
    ) -> TracerResult<Self> {
        let start = Instant::now();

        let mut items = Vec::with_capacity(indices.len());
        let mut bounds = Aabb::EMPTY;
        for &index in indices {
            let Some(primitive) = primitives.get(index) else {
                log::warn!("kd-tree build skipping out-of-range primitive {}", index);
                continue;
            };
            let bbox = primitive.bounding_box();
            if bbox.has_nan() || !bbox.is_finite() {
                return Err(TracerError::InvalidBounds { index, bbox });
            }
            let bbox = Aabb::new(bbox.x, bbox.y, bbox.z);
            bounds.union_with(&bbox);
            items.push(BuildItem {
                index,
                bbox,
                normal_sign: [
                    primitive.reference_normal_sign(0),
                    primitive.reference_normal_sign(1),
                    primitive.reference_normal_sign(2),
                ],
            });
        }

        let count = items.len();
        let mut builder = KdTreeBuilder::new(config.max_depth, config.leaf_size);
        let root = builder.build(items, bounds, config.max_depth);
        let stats = builder.finish();

        log::info!(
            "Built kd-tree over {} primitives: {} nodes, {} leaves ({} empty), depth {}, {} refs in {:.2?}",
            count,
            stats.nodes,
            stats.leaves,
            stats.empty_leaves,
            stats.max_depth,
            stats.primitive_refs,
            start.elapsed()
        );

        Ok(Self {
            root,
            bounds,
            stats,
        })
    }

    pub fn root(&self) -> &KdNode {
        &self.root
    }

    /// Union of all member bounds.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    /// Visit every leaf with its bounding volume and primitive indices.
    pub fn for_each_leaf<F>(&self, mut f: F)
    where
        F: FnMut(&Aabb, &[usize]),
    {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                KdNode::Leaf { primitives, bounds } => f(bounds, primitives),
                KdNode::Split { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}
