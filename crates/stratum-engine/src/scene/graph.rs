use slotmap::SlotMap;

use crate::coords::Vec2;

use super::{AttrKey, AttrValue, ObjectId, SceneObject};

/// Mutation event recorded by [`Scene`] between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneChange {
    Added(ObjectId),
    Removed(ObjectId),
    AttributeChanged(ObjectId, AttrKey),
    TransformChanged(ObjectId),
}

/// Minimal host-side scene store.
///
/// Owns objects, keeps paint order (back-to-front), and buffers mutations as
/// [`SceneChange`] events so they can be replayed into the renderer between
/// frames rather than mid-compile.
///
/// Performance characteristics:
/// - `insert()` / `set_attr()` are O(1)
/// - `insert_at()` / `remove()` are O(n) in paint-order length
#[derive(Debug, Default)]
pub struct Scene {
    objects: SlotMap<ObjectId, SceneObject>,
    order: Vec<ObjectId>,
    changes: Vec<SceneChange>,
}

impl Scene {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Appends `object` on top of the paint order.
    pub fn insert(&mut self, object: SceneObject) -> ObjectId {
        let index = self.order.len();
        self.insert_at(index, object)
    }

    /// Inserts `object` at paint position `index` (clamped to the end).
    pub fn insert_at(&mut self, index: usize, mut object: SceneObject) -> ObjectId {
        let id = self.objects.insert_with_key(|k| {
            object.assign_id(k);
            object
        });
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        self.changes.push(SceneChange::Added(id));
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let object = self.objects.remove(id)?;
        self.order.retain(|&o| o != id);
        self.changes.push(SceneChange::Removed(id));
        Some(object)
    }

    #[inline]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Writes an attribute and records the change. Returns `false` for unknown ids.
    pub fn set_attr(&mut self, id: ObjectId, key: AttrKey, value: impl Into<AttrValue>) -> bool {
        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        object.set_attr(key, value);
        self.changes.push(SceneChange::AttributeChanged(id, key));
        true
    }

    pub fn set_offset(&mut self, id: ObjectId, offset: Vec2) -> bool {
        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        object.set_offset(offset);
        self.changes.push(SceneChange::TransformChanged(id));
        true
    }

    /// Mutable access that bypasses change recording.
    ///
    /// Writes still bump the object's version, so the next compiled frame picks
    /// them up by version comparison.
    #[inline]
    pub fn get_mut_untracked(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    /// Ids in paint order (back-to-front).
    #[inline]
    pub fn order(&self) -> &[ObjectId] {
        &self.order
    }

    /// Objects in paint order, ready for `Renderer::compile_frame`.
    pub fn paint_ordered(&self) -> Vec<&SceneObject> {
        self.order.iter().filter_map(|&id| self.objects.get(id)).collect()
    }

    /// Takes all changes recorded since the previous drain.
    #[inline]
    pub fn drain_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ShapeKind;

    fn line() -> SceneObject {
        SceneObject::new(ShapeKind::Line)
    }

    #[test]
    fn insert_assigns_ids_and_paint_order() {
        let mut scene = Scene::new();
        let a = scene.insert(line());
        let b = scene.insert(line());
        let c = scene.insert_at(1, line());

        assert_eq!(scene.order(), &[a, c, b]);
        assert_eq!(scene.get(c).map(|o| o.id()), Some(c));
        let ids: Vec<_> = scene.paint_ordered().iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![a, c, b]);
    }

    #[test]
    fn writes_bump_version_and_record_changes() {
        let mut scene = Scene::new();
        let a = scene.insert(line());
        let v0 = scene.get(a).map(|o| o.version()).unwrap_or_default();

        assert!(scene.set_attr(a, AttrKey::X1, 5.0f32));
        assert!(scene.set_attr(a, AttrKey::X1, 5.0f32));
        assert!(scene.set_offset(a, Vec2::new(1.0, 1.0)));

        assert_eq!(scene.get(a).unwrap().version(), v0 + 3);
        assert_eq!(
            scene.drain_changes(),
            vec![
                SceneChange::Added(a),
                SceneChange::AttributeChanged(a, AttrKey::X1),
                SceneChange::AttributeChanged(a, AttrKey::X1),
                SceneChange::TransformChanged(a),
            ]
        );
        assert!(scene.drain_changes().is_empty());
    }

    #[test]
    fn remove_drops_from_order() {
        let mut scene = Scene::new();
        let a = scene.insert(line());
        let b = scene.insert(line());
        assert!(scene.remove(a).is_some());
        assert!(scene.remove(a).is_none());
        assert_eq!(scene.order(), &[b]);
        assert!(!scene.set_attr(a, AttrKey::X1, 1.0f32));
    }
}
