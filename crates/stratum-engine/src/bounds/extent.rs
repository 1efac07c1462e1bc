use crate::coords::{Aabb, Vec2};

use super::Bounds;

/// Computes bounds from the extreme points of a shape.
///
/// - box center: midpoint of the per-axis min/max
/// - half-extents: half the size, inflated by half the stroke width
/// - origin: `min + anchor * size`, the shape's logical reference point
///
/// Empty input keeps `current`'s center and origin with zero extents.
pub(crate) fn from_points<I>(points: I, line_width: f32, anchor: Vec2, current: Bounds) -> Bounds
where
    I: IntoIterator<Item = Vec2>,
{
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return Bounds {
            aabb: Aabb::new(current.aabb.center, Vec2::zero()),
            origin: current.origin,
        };
    };

    let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    let size = max - min;
    let half_stroke = line_width.max(0.0) * 0.5;

    Bounds {
        aabb: Aabb::new((min + max) * 0.5, size * 0.5).inflated(half_stroke),
        origin: min + size.scale(anchor),
    }
}
