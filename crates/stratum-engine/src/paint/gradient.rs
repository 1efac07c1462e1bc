use core::hash::{Hash, Hasher};

use crate::coords::Vec2;

use super::Color;

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

/// A single gradient stop.
///
/// `t` is expected in [0, 1] in typical usage, but is not strictly enforced.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Linear gradient definition in object-local space.
///
/// Gradients are sampled from a ramp texture, so two gradients share a batch only
/// when their content hashes match (see [`Paint::content_hash`](super::Paint::content_hash)).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMode,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2, stops: Vec<ColorStop>, spread: SpreadMode) -> Self {
        Self {
            start,
            end,
            stops,
            spread,
        }
    }

    pub(crate) fn hash_content<H: Hasher>(&self, state: &mut H) {
        for p in [self.start, self.end] {
            p.x.to_bits().hash(state);
            p.y.to_bits().hash(state);
        }
        self.stops.len().hash(state);
        for s in &self.stops {
            s.t.to_bits().hash(state);
            s.color.hash_bits(state);
        }
        self.spread.hash(state);
    }
}
