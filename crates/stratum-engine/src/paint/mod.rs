//! Paint model shared between scene objects and batchers.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - paint sources (solid, linear gradient, image pattern)
//! - the stable content identity used by the mergeability predicate
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod gradient;
pub mod pattern;

use core::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

pub use color::Color;
pub use gradient::{ColorStop, LinearGradient, SpreadMode};
pub use pattern::{Pattern, Repetition};

/// Paint source for filling or stroking geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient(LinearGradient),
    Pattern(Pattern),
}

/// Coarse paint category; selects the shading program variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PaintClass {
    Constant,
    Gradient,
    Pattern,
}

/// Mergeability identity of a paint.
///
/// Constants carry no value: color travels in the instance record, so any two
/// constants are compatible. Non-constant paints carry a content hash and are
/// compatible only with identical content.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum PaintKey {
    #[default]
    Constant,
    Gradient(u64),
    Pattern(u64),
}

impl PaintKey {
    #[inline]
    pub fn class(self) -> PaintClass {
        match self {
            PaintKey::Constant => PaintClass::Constant,
            PaintKey::Gradient(_) => PaintClass::Gradient,
            PaintKey::Pattern(_) => PaintClass::Pattern,
        }
    }

    /// Resource hash for non-constant paints.
    #[inline]
    pub fn resource(self) -> Option<u64> {
        match self {
            PaintKey::Constant => None,
            PaintKey::Gradient(h) | PaintKey::Pattern(h) => Some(h),
        }
    }
}

impl Paint {
    #[inline]
    pub fn solid(color: Color) -> Self {
        Paint::Solid(color)
    }

    #[inline]
    pub fn class(&self) -> PaintClass {
        match self {
            Paint::Solid(_) => PaintClass::Constant,
            Paint::LinearGradient(_) => PaintClass::Gradient,
            Paint::Pattern(_) => PaintClass::Pattern,
        }
    }

    /// Stable hash of the paint content.
    ///
    /// Uses `FxHasher` (no per-process random state), so equal content yields the
    /// same value across frames and runs.
    pub fn content_hash(&self) -> u64 {
        let mut h = FxHasher::default();
        match self {
            Paint::Solid(c) => {
                0u8.hash(&mut h);
                c.hash_bits(&mut h);
            }
            Paint::LinearGradient(g) => {
                1u8.hash(&mut h);
                g.hash_content(&mut h);
            }
            Paint::Pattern(p) => {
                2u8.hash(&mut h);
                p.hash_content(&mut h);
            }
        }
        h.finish()
    }

    #[inline]
    pub fn key(&self) -> PaintKey {
        match self {
            Paint::Solid(_) => PaintKey::Constant,
            Paint::LinearGradient(_) => PaintKey::Gradient(self.content_hash()),
            Paint::Pattern(_) => PaintKey::Pattern(self.content_hash()),
        }
    }

    /// Per-instance color channels.
    ///
    /// Non-constant paints are sampled from a texture; the instance color then acts
    /// as an identity tint.
    #[inline]
    pub fn instance_color(&self) -> [f32; 4] {
        match self {
            Paint::Solid(c) => c.to_array(),
            Paint::LinearGradient(_) | Paint::Pattern(_) => Color::white().to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    fn red() -> Color {
        Color::from_straight(1.0, 0.0, 0.0, 1.0)
    }

    fn blue() -> Color {
        Color::from_straight(0.0, 0.0, 1.0, 1.0)
    }

    fn gradient(end_x: f32) -> Paint {
        Paint::LinearGradient(LinearGradient::new(
            Vec2::zero(),
            Vec2::new(end_x, 0.0),
            vec![ColorStop::new(0.0, red()), ColorStop::new(1.0, blue())],
            SpreadMode::Pad,
        ))
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn constants_share_a_key_regardless_of_color() {
        assert_eq!(Paint::solid(red()).key(), Paint::solid(blue()).key());
        assert_eq!(Paint::solid(red()).key(), PaintKey::Constant);
    }

    #[test]
    fn identical_patterns_share_a_key_across_instances() {
        let a = Paint::Pattern(Pattern::new("bricks.png", (64, 64), Repetition::Repeat));
        let b = Paint::Pattern(Pattern::new("bricks.png", (64, 64), Repetition::Repeat));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn pattern_content_changes_the_key() {
        let a = Paint::Pattern(Pattern::new("bricks.png", (64, 64), Repetition::Repeat));
        let b = Paint::Pattern(Pattern::new("bricks.png", (64, 64), Repetition::NoRepeat));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn gradient_keys_follow_content() {
        assert_eq!(gradient(10.0).key(), gradient(10.0).key());
        assert_ne!(gradient(10.0).key(), gradient(20.0).key());
    }

    #[test]
    fn constant_never_equals_non_constant() {
        let p = Paint::Pattern(Pattern::new("a.png", (1, 1), Repetition::Repeat));
        assert_ne!(Paint::solid(red()).key(), p.key());
        assert_ne!(gradient(1.0).key().class(), p.key().class());
    }

    // ── instance data ─────────────────────────────────────────────────────

    #[test]
    fn instance_color_is_premultiplied_for_solids() {
        let c = Color::from_straight(1.0, 0.5, 0.0, 0.5);
        assert_eq!(Paint::solid(c).instance_color(), [0.5, 0.25, 0.0, 0.5]);
        assert_eq!(gradient(1.0).instance_color(), [1.0; 4]);
    }
}
