//! Front-to-back ray traversal.

use lucent_math::{Aabb, Interval, PARALLEL_EPSILON};

use super::{KdNode, KdTree};
use crate::primitive::closest_among;
use crate::{LocalHit, Primitive, Ray};

/// Relative widening of a leaf's parametric segment, so hits that land on a
/// split plane are not lost to rounding in the plane-crossing distance.
const LEAF_SLACK: f32 = 1e-4;

/// Relative distance from a split plane within which a ray point counts as
/// lying on it. Children on both sides are visited for that stretch.
const PLANE_TOLERANCE: f32 = 1e-5;

type Hit = (usize, LocalHit);

impl KdTree {
    /// Closest hit with `t` inside `ray_t` among the primitives in the tree.
    ///
    /// `primitives` must be the slice the tree was built over.
    pub fn intersect<P: Primitive>(
        &self,
        primitives: &[P],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<(usize, LocalHit)> {
        if ray_t.is_empty() || ray.is_degenerate() || self.bounds.is_empty() {
            return None;
        }

        let segment = padded(&self.bounds).clip_ray(&ray.geometry(), ray_t)?;
        traverse(&self.root, primitives, ray, segment, ray_t)
    }
}

/// Visit `node` for the part of the ray inside `segment`; hits are accepted
/// anywhere in `query`.
fn traverse<P: Primitive>(
    node: &KdNode,
    primitives: &[P],
    ray: &Ray,
    segment: Interval,
    query: Interval,
) -> Option<Hit> {
    match node {
        KdNode::Leaf { primitives: members, .. } => {
            if members.is_empty() {
                return None;
            }
            let slack = LEAF_SLACK * segment.min.abs().max(segment.max.abs()).max(1.0);
            let window = Interval::new(segment.min - slack, segment.max + slack).intersect(&query);
            closest_among(primitives, members.iter().copied(), ray, window)
        }

        KdNode::Split {
            axis,
            position,
            left,
            right,
        } => {
            let o = ray.origin()[*axis];
            let d = ray.direction()[*axis];
            let tolerance = PLANE_TOLERANCE * position.abs().max(o.abs()).max(1.0);

            // Never crosses the plane: stay on the origin's side unless it lies on it
            if d.abs() < PARALLEL_EPSILON {
                if o < *position - tolerance {
                    return traverse(left, primitives, ray, segment, query);
                }
                if o > *position + tolerance {
                    return traverse(right, primitives, ray, segment, query);
                }
                let a = traverse(left, primitives, ray, segment, query);
                let b = traverse(right, primitives, ray, segment, query);
                return closer(a, b);
            }

            let t_split = (*position - o) / d;
            // Parametric stretch over which the ray is within tolerance of the plane
            let band = tolerance / d.abs();
            let (near, far) = if d > 0.0 { (left, right) } else { (right, left) };

            let near_segment = Interval::new(segment.min, segment.max.min(t_split + band));
            let mut near_hit = None;
            if !near_segment.is_empty() {
                near_hit = traverse(near, primitives, ray, near_segment, query);
                if let Some((_, hit)) = near_hit {
                    if hit.t < t_split - band {
                        return near_hit;
                    }
                }
            }

            let far_segment = Interval::new(segment.min.max(t_split - band), segment.max);
            if far_segment.is_empty() {
                return near_hit;
            }
            let far_hit = traverse(far, primitives, ray, far_segment, query);
            closer(near_hit, far_hit)
        }
    }
}

/// `bounds` grown by the plane tolerance, so rays skimming a face of the
/// tree still enter it.
fn padded(bounds: &Aabb) -> Aabb {
    let mut grown = *bounds;
    for axis in 0..3 {
        let extent = bounds.axis_interval(axis);
        let tolerance = PLANE_TOLERANCE * extent.min.abs().max(extent.max.abs()).max(1.0);
        grown.set_min(axis, extent.min - tolerance);
        grown.set_max(axis, extent.max + tolerance);
    }
    grown
}

fn closer(a: Option<Hit>, b: Option<Hit>) -> Option<Hit> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.1.t < a.1.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}
