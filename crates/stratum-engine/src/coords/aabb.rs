use super::Vec2;

/// Axis-aligned bounding box stored as center + half-extents.
///
/// Center/half-extent form keeps anchor adjustments and stroke inflation to a
/// single add each; `min()`/`max()` are derived on demand.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    #[inline]
    pub const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }

    /// Builds a box from two corners in any order.
    #[inline]
    pub fn from_min_max(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.center + self.half_extents
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// True when the box has no area (a point or a segment).
    #[inline]
    pub fn is_empty(self) -> bool {
        self.half_extents.x <= 0.0 || self.half_extents.y <= 0.0
    }

    /// Grows the half-extents by `amount` on both axes.
    #[inline]
    pub fn inflated(self, amount: f32) -> Self {
        Self {
            center: self.center,
            half_extents: self.half_extents + Vec2::splat(amount),
        }
    }

    #[inline]
    pub fn translated(self, by: Vec2) -> Self {
        Self {
            center: self.center + by,
            half_extents: self.half_extents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn from_min_max_is_order_independent() {
        let a = Aabb::from_min_max(v(10.0, 2.0), v(0.0, 8.0));
        let b = Aabb::from_min_max(v(0.0, 8.0), v(10.0, 2.0));
        assert_eq!(a, b);
        assert_eq!(a.center, v(5.0, 5.0));
        assert_eq!(a.half_extents, v(5.0, 3.0));
    }

    #[test]
    fn min_max_round_trip() {
        let b = Aabb::new(v(1.0, 1.0), v(2.0, 3.0));
        assert_eq!(b.min(), v(-1.0, -2.0));
        assert_eq!(b.max(), v(3.0, 4.0));
        assert_eq!(b.size(), v(4.0, 6.0));
    }

    // ── degenerate ────────────────────────────────────────────────────────

    #[test]
    fn single_point_box_is_empty_not_invalid() {
        let b = Aabb::from_min_max(v(3.0, 4.0), v(3.0, 4.0));
        assert!(b.is_empty());
        assert_eq!(b.size(), Vec2::zero());
    }

    // ── combinators ───────────────────────────────────────────────────────

    #[test]
    fn inflate_and_translate() {
        let b = Aabb::new(v(0.0, 0.0), v(1.0, 1.0)).inflated(0.5).translated(v(2.0, 0.0));
        assert_eq!(b.center, v(2.0, 0.0));
        assert_eq!(b.half_extents, v(1.5, 1.5));
    }
}
