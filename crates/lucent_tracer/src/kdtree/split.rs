//! Surface-area-heuristic split plane selection.
//!
//! Candidate planes are the faces of every member's bounding box that lie
//! strictly inside the node. For each candidate the node box is cut in two
//! and scored as `left_count * left_area + right_count * right_area`; the
//! cheapest candidate that beats the unsplit cost `count * area` wins.
//!
//! A member overlapping both half-spaces counts on both sides. A member with
//! zero extent on the axis lying exactly on the plane goes to the side its
//! normal faces: negative sign to the left, zero or positive to the right.

use std::cmp::Ordering;

use lucent_math::Aabb;

/// Primitive reference carried through tree construction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuildItem {
    /// Index into the primitive slice
    pub index: usize,
    pub bbox: Aabb,
    /// Reference normal sign per axis
    pub normal_sign: [i8; 3],
}

/// Chosen split plane with its cost and side counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplitPlane {
    pub axis: usize,
    pub position: f32,
    pub cost: f32,
    pub left_count: usize,
    pub right_count: usize,
}

/// Which sides of the plane at `position` on `axis` the item belongs to.
pub(crate) fn classify(item: &BuildItem, axis: usize, position: f32) -> (bool, bool) {
    let extent = item.bbox.axis_interval(axis);
    if extent.min == position && extent.max == position {
        if item.normal_sign[axis] < 0 {
            (true, false)
        } else {
            (false, true)
        }
    } else {
        (extent.min < position, extent.max > position)
    }
}

/// Per-axis sorted bounds used to count members on each side of a plane.
struct AxisEvents {
    mins: Vec<f32>,
    maxs: Vec<f32>,
    /// Positions of flat members that resolve to the left
    flat_left: Vec<f32>,
    /// Positions of flat members that resolve to the right
    flat_right: Vec<f32>,
}

impl AxisEvents {
    fn new(items: &[BuildItem], axis: usize) -> Self {
        let mut mins = Vec::with_capacity(items.len());
        let mut maxs = Vec::with_capacity(items.len());
        let mut flat_left = Vec::new();
        let mut flat_right = Vec::new();

        for item in items {
            let extent = item.bbox.axis_interval(axis);
            mins.push(extent.min);
            maxs.push(extent.max);
            if extent.min == extent.max {
                if item.normal_sign[axis] < 0 {
                    flat_left.push(extent.min);
                } else {
                    flat_right.push(extent.min);
                }
            }
        }

        for v in [&mut mins, &mut maxs, &mut flat_left, &mut flat_right] {
            v.sort_unstable_by(total_order);
        }

        Self {
            mins,
            maxs,
            flat_left,
            flat_right,
        }
    }

    /// Members counted left and right of `position`.
    fn counts(&self, position: f32) -> (usize, usize) {
        let starts_below = self.mins.partition_point(|&m| m < position);
        let ends_above = self.maxs.len() - self.maxs.partition_point(|&m| m <= position);
        let left = starts_below + count_equal(&self.flat_left, position);
        let right = ends_above + count_equal(&self.flat_right, position);
        (left, right)
    }
}

fn total_order(a: &f32, b: &f32) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

fn count_equal(sorted: &[f32], value: f32) -> usize {
    let lo = sorted.partition_point(|&v| v < value);
    let hi = sorted.partition_point(|&v| v <= value);
    hi - lo
}

/// Find the cheapest split of `items` inside `bounds`.
///
/// Returns `None` when no candidate costs strictly less than leaving the
/// node unsplit. Candidates that would leave one side empty are not
/// considered. Ties keep the first candidate in axis order, then ascending
/// position.
pub(crate) fn find_best_split(items: &[BuildItem], bounds: &Aabb) -> Option<SplitPlane> {
    let n = items.len();
    let area = bounds.area();
    if n == 0 || !area.is_finite() {
        return None;
    }

    let unsplit_cost = n as f32 * area;
    let mut best: Option<SplitPlane> = None;

    for axis in 0..3 {
        let extent = bounds.axis_interval(axis);
        let events = AxisEvents::new(items, axis);

        let mut candidates: Vec<f32> = events
            .mins
            .iter()
            .chain(events.maxs.iter())
            .copied()
            .filter(|&p| extent.surrounds(p))
            .collect();
        candidates.sort_unstable_by(total_order);
        candidates.dedup();

        for position in candidates {
            let (left_count, right_count) = events.counts(position);
            if left_count == 0 || right_count == 0 {
                continue;
            }

            let mut left_box = *bounds;
            left_box.set_max(axis, position);
            let mut right_box = *bounds;
            right_box.set_min(axis, position);

            let cost = left_count as f32 * left_box.area() + right_count as f32 * right_box.area();
            if cost < best.map_or(unsplit_cost, |b| b.cost) {
                best = Some(SplitPlane {
                    axis,
                    position,
                    cost,
                    left_count,
                    right_count,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_math::Vec3;

    fn item(index: usize, min: Vec3, max: Vec3) -> BuildItem {
        BuildItem {
            index,
            bbox: Aabb::from_points(min, max),
            normal_sign: [0; 3],
        }
    }

    fn bounds_of(items: &[BuildItem]) -> Aabb {
        items.iter().fold(Aabb::EMPTY, |acc, i| Aabb::surrounding(&acc, &i.bbox))
    }

    /// Brute-force side counts using `classify`.
    fn naive_counts(items: &[BuildItem], axis: usize, position: f32) -> (usize, usize) {
        items.iter().fold((0, 0), |(l, r), item| {
            let (in_left, in_right) = classify(item, axis, position);
            (l + in_left as usize, r + in_right as usize)
        })
    }

    #[test]
    fn test_two_separated_clusters_split_between() {
        let items = vec![
            item(0, Vec3::ZERO, Vec3::ONE),
            item(1, Vec3::new(9.0, 0.0, 0.0), Vec3::new(10.0, 1.0, 1.0)),
        ];
        let bounds = bounds_of(&items);

        let plane = find_best_split(&items, &bounds).unwrap();
        assert_eq!(plane.axis, 0);
        assert!(plane.position >= 1.0 && plane.position <= 9.0);
        assert_eq!((plane.left_count, plane.right_count), (1, 1));

        // First of the tied candidates wins
        assert_eq!(plane.position, 1.0);
    }

    #[test]
    fn test_counts_match_classification() {
        let items = vec![
            item(0, Vec3::ZERO, Vec3::splat(2.0)),
            item(1, Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)),
            item(2, Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0)),
            item(3, Vec3::new(4.0, 0.0, 0.0), Vec3::new(6.0, 1.0, 1.0)),
        ];

        for axis in 0..3 {
            let events = AxisEvents::new(&items, axis);
            for position in [0.0, 0.5, 1.0, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0] {
                assert_eq!(
                    events.counts(position),
                    naive_counts(&items, axis, position),
                    "axis {axis} position {position}"
                );
            }
        }
    }

    #[test]
    fn test_straddling_item_counts_on_both_sides() {
        let wide = item(0, Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(classify(&wide, 0, 5.0), (true, true));
        assert_eq!(classify(&wide, 0, 10.0), (true, false));
        assert_eq!(classify(&wide, 0, 0.0), (false, true));
    }

    #[test]
    fn test_flat_item_on_plane_uses_normal_sign() {
        let mut flat = item(0, Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(classify(&flat, 2, 2.0), (false, true));

        flat.normal_sign = [0, 0, -1];
        assert_eq!(classify(&flat, 2, 2.0), (true, false));

        flat.normal_sign = [0, 0, 1];
        assert_eq!(classify(&flat, 2, 2.0), (false, true));
    }

    #[test]
    fn test_no_split_when_nothing_improves() {
        // Identical boxes: every cut keeps everything on both sides
        let items: Vec<_> = (0..8).map(|i| item(i, Vec3::ZERO, Vec3::ONE)).collect();
        assert!(find_best_split(&items, &bounds_of(&items)).is_none());

        // A node box with zero area cannot be improved on
        let segments: Vec<_> = (0..4)
            .map(|i| item(i, Vec3::new(i as f32, 0.0, 0.0), Vec3::new(i as f32 + 1.0, 0.0, 0.0)))
            .collect();
        let line = bounds_of(&segments);
        assert_eq!(line.area(), 0.0);
        assert!(find_best_split(&segments, &line).is_none());

        assert!(find_best_split(&[], &Aabb::from_points(Vec3::ZERO, Vec3::ONE)).is_none());
    }

    #[test]
    fn test_best_split_beats_unsplit_cost() {
        let items: Vec<_> = (0..16)
            .map(|i| {
                let x = i as f32 * 2.0;
                item(i, Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0))
            })
            .collect();
        let bounds = bounds_of(&items);

        let plane = find_best_split(&items, &bounds).unwrap();
        assert_eq!(plane.axis, 0);
        assert!(plane.cost < items.len() as f32 * bounds.area());
        assert_eq!(plane.left_count + plane.right_count, items.len());
    }
}
