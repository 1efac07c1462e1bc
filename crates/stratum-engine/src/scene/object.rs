use slotmap::new_key_type;

use crate::coords::Vec2;

use super::{AttrKey, AttrValue, Attributes, ShapeKind};

new_key_type! {
    /// Stable handle of a scene object. Derived render state is keyed by it.
    pub struct ObjectId;
}

/// A drawable scene entity.
///
/// Every write through [`set_attr`](Self::set_attr) or
/// [`set_offset`](Self::set_offset) bumps `version`, even when the value is
/// unchanged; the renderer compares versions once per frame to detect changes it
/// was not notified about.
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: ObjectId,
    kind: ShapeKind,
    attrs: Attributes,
    offset: Vec2,
    version: u64,
}

impl SceneObject {
    /// Creates a detached object. Its id stays null until a [`Scene`](super::Scene)
    /// assigns one, or [`with_id`](Self::with_id) is used by hosts with their own
    /// id allocation.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: ObjectId::default(),
            kind,
            attrs: Attributes::new(),
            offset: Vec2::zero(),
            version: 0,
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    #[must_use]
    pub fn with(mut self, key: AttrKey, value: impl Into<AttrValue>) -> Self {
        self.set_attr(key, value);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.set_offset(offset);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    pub(crate) fn assign_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    #[inline]
    pub fn attr(&self, key: AttrKey) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Parent-relative translation.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_attr(&mut self, key: AttrKey, value: impl Into<AttrValue>) {
        self.attrs.insert(key, value.into());
        self.version += 1;
    }

    pub fn remove_attr(&mut self, key: AttrKey) -> Option<AttrValue> {
        let old = self.attrs.remove(key);
        self.version += 1;
        old
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.version += 1;
    }
}
