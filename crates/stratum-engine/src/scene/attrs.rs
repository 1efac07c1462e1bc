use rustc_hash::FxHashMap;

use crate::coords::Vec2;
use crate::paint::Paint;

use super::{BlendMode, LineCap};

/// Style attribute keys understood by the core.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum AttrKey {
    // line endpoints
    X1,
    Y1,
    X2,
    Y2,
    // circle
    Cx,
    Cy,
    R,
    // rect
    X,
    Y,
    Width,
    Height,
    // polyline / polygon / path vertices
    Points,

    LineWidth,
    Anchor,
    Stroke,
    Fill,
    LineCap,
    LineDash,
    LineDashOffset,
    BlendMode,
}

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f32),
    Numbers(Vec<f32>),
    Point(Vec2),
    Points(Vec<Vec2>),
    Paint(Paint),
    LineCap(LineCap),
    BlendMode(BlendMode),
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Number(v)
    }
}

impl From<Vec<f32>> for AttrValue {
    fn from(v: Vec<f32>) -> Self {
        AttrValue::Numbers(v)
    }
}

impl From<Vec2> for AttrValue {
    fn from(v: Vec2) -> Self {
        AttrValue::Point(v)
    }
}

impl From<Vec<Vec2>> for AttrValue {
    fn from(v: Vec<Vec2>) -> Self {
        AttrValue::Points(v)
    }
}

impl From<Paint> for AttrValue {
    fn from(v: Paint) -> Self {
        AttrValue::Paint(v)
    }
}

impl From<LineCap> for AttrValue {
    fn from(v: LineCap) -> Self {
        AttrValue::LineCap(v)
    }
}

impl From<BlendMode> for AttrValue {
    fn from(v: BlendMode) -> Self {
        AttrValue::BlendMode(v)
    }
}

/// Style attribute map with typed accessors.
///
/// Accessors return `None` both for a missing key and for a value of the wrong
/// type; callers apply their own defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: FxHashMap<AttrKey, AttrValue>,
}

impl Attributes {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: AttrKey) -> Option<&AttrValue> {
        self.values.get(&key)
    }

    /// Stores `value`, returning the previous one.
    #[inline]
    pub fn insert(&mut self, key: AttrKey, value: AttrValue) -> Option<AttrValue> {
        self.values.insert(key, value)
    }

    #[inline]
    pub fn remove(&mut self, key: AttrKey) -> Option<AttrValue> {
        self.values.remove(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn number(&self, key: AttrKey) -> Option<f32> {
        match self.get(key)? {
            AttrValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Number with a fallback for missing or mistyped values.
    #[inline]
    pub fn number_or(&self, key: AttrKey, default: f32) -> f32 {
        self.number(key).unwrap_or(default)
    }

    pub fn numbers(&self, key: AttrKey) -> Option<&[f32]> {
        match self.get(key)? {
            AttrValue::Numbers(v) => Some(v),
            _ => None,
        }
    }

    pub fn point(&self, key: AttrKey) -> Option<Vec2> {
        match self.get(key)? {
            AttrValue::Point(v) => Some(*v),
            _ => None,
        }
    }

    pub fn points(&self, key: AttrKey) -> Option<&[Vec2]> {
        match self.get(key)? {
            AttrValue::Points(v) => Some(v),
            _ => None,
        }
    }

    pub fn paint(&self, key: AttrKey) -> Option<&Paint> {
        match self.get(key)? {
            AttrValue::Paint(v) => Some(v),
            _ => None,
        }
    }

    pub fn line_cap(&self, key: AttrKey) -> Option<LineCap> {
        match self.get(key)? {
            AttrValue::LineCap(v) => Some(*v),
            _ => None,
        }
    }

    pub fn blend_mode(&self, key: AttrKey) -> Option<BlendMode> {
        match self.get(key)? {
            AttrValue::BlendMode(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_reject_mismatched_values() {
        let mut a = Attributes::new();
        a.insert(AttrKey::LineWidth, AttrValue::Number(2.0));
        a.insert(AttrKey::Anchor, AttrValue::Point(Vec2::new(0.5, 0.5)));

        assert_eq!(a.number(AttrKey::LineWidth), Some(2.0));
        assert_eq!(a.point(AttrKey::LineWidth), None);
        assert_eq!(a.number(AttrKey::Anchor), None);
        assert_eq!(a.number_or(AttrKey::X1, 7.0), 7.0);
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut a = Attributes::new();
        assert!(a.insert(AttrKey::X1, 1.0f32.into()).is_none());
        assert_eq!(a.insert(AttrKey::X1, 2.0f32.into()), Some(AttrValue::Number(1.0)));
        assert_eq!(a.len(), 1);
    }
}
