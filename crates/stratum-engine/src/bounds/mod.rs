//! Incremental bounding-volume maintenance.
//!
//! Each shape kind declares the attribute keys its box depends on
//! ([`dependencies`]); callers must invoke [`update`] only when a changed key is in
//! that set. Dispatch is a plain `match` on [`ShapeKind`].
//!
//! Boxes are expressed in object-local (declared) coordinates. The anchor does not
//! move the box; it picks the logical origin inside it, which batchers use as the
//! reference point for relative vertex data.

mod extent;

use crate::coords::{Aabb, Vec2};
use crate::scene::{AttrKey, Attributes, ShapeKind};

/// Bounding box plus the anchor-derived logical origin.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Bounds {
    /// Box in declared coordinates, including stroke.
    pub aabb: Aabb,
    /// Logical origin: `min + anchor * size` (stroke excluded).
    pub origin: Vec2,
}

impl Bounds {
    /// Box relative to the logical origin.
    #[inline]
    pub fn local(self) -> Aabb {
        self.aabb.translated(-self.origin)
    }
}

const LINE_DEPS: &[AttrKey] = &[
    AttrKey::X1,
    AttrKey::Y1,
    AttrKey::X2,
    AttrKey::Y2,
    AttrKey::LineWidth,
    AttrKey::Anchor,
];
const POINTS_DEPS: &[AttrKey] = &[AttrKey::Points, AttrKey::LineWidth, AttrKey::Anchor];
const CIRCLE_DEPS: &[AttrKey] = &[
    AttrKey::Cx,
    AttrKey::Cy,
    AttrKey::R,
    AttrKey::LineWidth,
    AttrKey::Anchor,
];
const RECT_DEPS: &[AttrKey] = &[
    AttrKey::X,
    AttrKey::Y,
    AttrKey::Width,
    AttrKey::Height,
    AttrKey::LineWidth,
    AttrKey::Anchor,
];

/// Attribute keys the box of `kind` depends on.
#[inline]
pub fn dependencies(kind: ShapeKind) -> &'static [AttrKey] {
    match kind {
        ShapeKind::Line => LINE_DEPS,
        ShapeKind::Polyline | ShapeKind::Polygon | ShapeKind::Path => POINTS_DEPS,
        ShapeKind::Circle => CIRCLE_DEPS,
        ShapeKind::Rect => RECT_DEPS,
    }
}

/// True when a change to `key` requires recomputing the box of `kind`.
#[inline]
pub fn depends_on(kind: ShapeKind, key: AttrKey) -> bool {
    dependencies(kind).contains(&key)
}

/// Recomputes bounds of a `kind` shape from its attributes.
///
/// Missing coordinates default to zero; degenerate input yields zero-extent boxes.
pub fn update(kind: ShapeKind, attrs: &Attributes, current: Bounds) -> Bounds {
    let line_width = attrs.number_or(AttrKey::LineWidth, 0.0);
    let anchor = attrs.point(AttrKey::Anchor).unwrap_or_default();

    match kind {
        ShapeKind::Line => {
            let [a, b] = line_endpoints(attrs);
            extent::from_points([a, b], line_width, anchor, current)
        }
        ShapeKind::Polyline | ShapeKind::Polygon | ShapeKind::Path => {
            let points = attrs.points(AttrKey::Points).unwrap_or(&[]);
            extent::from_points(points.iter().copied(), line_width, anchor, current)
        }
        ShapeKind::Circle => {
            let c = Vec2::new(attrs.number_or(AttrKey::Cx, 0.0), attrs.number_or(AttrKey::Cy, 0.0));
            let r = Vec2::splat(attrs.number_or(AttrKey::R, 0.0).abs());
            extent::from_points([c - r, c + r], line_width, anchor, current)
        }
        ShapeKind::Rect => {
            let p = Vec2::new(attrs.number_or(AttrKey::X, 0.0), attrs.number_or(AttrKey::Y, 0.0));
            let size = Vec2::new(
                attrs.number_or(AttrKey::Width, 0.0),
                attrs.number_or(AttrKey::Height, 0.0),
            );
            extent::from_points([p, p + size], line_width, anchor, current)
        }
    }
}

/// Line endpoints in declared coordinates.
#[inline]
pub(crate) fn line_endpoints(attrs: &Attributes) -> [Vec2; 2] {
    [
        Vec2::new(attrs.number_or(AttrKey::X1, 0.0), attrs.number_or(AttrKey::Y1, 0.0)),
        Vec2::new(attrs.number_or(AttrKey::X2, 0.0), attrs.number_or(AttrKey::Y2, 0.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::AttrValue;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn polyline(points: Vec<Vec2>, anchor: Vec2) -> Attributes {
        let mut a = Attributes::new();
        a.insert(AttrKey::Points, AttrValue::Points(points));
        a.insert(AttrKey::Anchor, AttrValue::Point(anchor));
        a
    }

    // ── anchor ────────────────────────────────────────────────────────────

    #[test]
    fn centered_anchor_center_is_mean_of_extremes_for_any_order() {
        let pts = vec![v(3.0, -1.0), v(-5.0, 7.0), v(1.0, 2.0), v(9.0, 0.0)];
        let expected = v((-5.0 + 9.0) / 2.0, (-1.0 + 7.0) / 2.0);

        let mut reversed = pts.clone();
        reversed.reverse();
        let mut rotated = pts.clone();
        rotated.rotate_left(2);

        for order in [pts, reversed, rotated] {
            let b = update(ShapeKind::Polyline, &polyline(order, v(0.5, 0.5)), Bounds::default());
            assert_eq!(b.aabb.center, expected);
            assert_eq!(b.origin, expected);
        }
    }

    // ── degenerate ────────────────────────────────────────────────────────

    #[test]
    fn single_point_is_zero_area() {
        let attrs = polyline(vec![v(4.0, 4.0)], v(0.0, 0.0));
        let b = update(ShapeKind::Polyline, &attrs, Bounds::default());
        assert_eq!(b.aabb.center, v(4.0, 4.0));
        assert!(b.aabb.is_empty());
    }

    #[test]
    fn zero_length_line_is_valid() {
        let mut a = Attributes::new();
        a.insert(AttrKey::X1, 2.0f32.into());
        a.insert(AttrKey::Y1, 2.0f32.into());
        a.insert(AttrKey::X2, 2.0f32.into());
        a.insert(AttrKey::Y2, 2.0f32.into());
        let b = update(ShapeKind::Line, &a, Bounds::default());
        assert_eq!(b.aabb.half_extents, Vec2::zero());
        assert_eq!(b.origin, v(2.0, 2.0));
    }

    #[test]
    fn missing_points_yield_zero_box() {
        let b = update(ShapeKind::Path, &Attributes::new(), Bounds::default());
        assert_eq!(b, Bounds::default());
    }

    // ── per kind ──────────────────────────────────────────────────────────

    #[test]
    fn circle_box_spans_radius() {
        let mut a = Attributes::new();
        a.insert(AttrKey::Cx, 10.0f32.into());
        a.insert(AttrKey::Cy, 5.0f32.into());
        a.insert(AttrKey::R, 3.0f32.into());
        a.insert(AttrKey::LineWidth, 2.0f32.into());
        let b = update(ShapeKind::Circle, &a, Bounds::default());
        assert_eq!(b.aabb.center, v(10.0, 5.0));
        assert_eq!(b.aabb.half_extents, v(4.0, 4.0));
        assert_eq!(b.origin, v(7.0, 2.0));
    }

    #[test]
    fn rect_with_negative_size_normalizes() {
        let mut a = Attributes::new();
        a.insert(AttrKey::X, 10.0f32.into());
        a.insert(AttrKey::Width, (-4.0f32).into());
        a.insert(AttrKey::Height, 2.0f32.into());
        let b = update(ShapeKind::Rect, &a, Bounds::default());
        assert_eq!(b.aabb.min(), v(6.0, 0.0));
        assert_eq!(b.aabb.max(), v(10.0, 2.0));
    }

    // ── dependency sets ───────────────────────────────────────────────────

    #[test]
    fn dependency_sets_exclude_paint_keys() {
        for kind in ShapeKind::ALL {
            assert!(depends_on(kind, AttrKey::LineWidth));
            assert!(depends_on(kind, AttrKey::Anchor));
            assert!(!depends_on(kind, AttrKey::Stroke));
            assert!(!depends_on(kind, AttrKey::LineDash));
        }
        assert!(depends_on(ShapeKind::Line, AttrKey::X2));
        assert!(!depends_on(ShapeKind::Line, AttrKey::Points));
        assert!(depends_on(ShapeKind::Polygon, AttrKey::Points));
    }
}
