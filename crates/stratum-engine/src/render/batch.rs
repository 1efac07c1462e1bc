//! Batches: groups of mutually compatible objects drawn by one instanced call.

use slotmap::new_key_type;

use crate::error::{ConfigError, GeometryError};
use crate::paint::{PaintClass, PaintKey};
use crate::scene::{AttrKey, BlendMode, ObjectId, SceneObject, ShapeKind};

use super::draw_call::{
    BindingSet, DrawCall, GeometryRef, SortKey, SurfaceHandle, TextureBinding, UniformBinding,
};
use super::geometry::{FieldId, GeometryBuffer};
use super::program::{OBJECT_PARAMS, ProgramId, ProgramRegistry, SCENE_PARAMS};
use super::shapes::ShapeBatcher;

new_key_type! {
    /// Handle of a live batch. Never reused for a different batch.
    pub struct BatchId;
}

/// Everything that decides whether two objects may share a batch.
///
/// Two objects are mergeable iff their keys are equal. Constant paints collapse
/// to [`PaintKey::Constant`] (color is instance data); gradients and patterns keep
/// a content hash. Equality is symmetric and transitive, so comparing a candidate
/// with the batch key is the same as comparing it with every member.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MergeKey {
    pub kind: ShapeKind,
    pub program: ProgramId,
    pub blend: BlendMode,
    pub stroke: PaintKey,
    pub fill: PaintKey,
}

impl MergeKey {
    /// Derives the key of `object` from the attributes `batcher` declares as
    /// shading-relevant, and resolves its program.
    pub fn for_object(
        batcher: &dyn ShapeBatcher,
        object: &SceneObject,
        programs: &ProgramRegistry,
    ) -> Result<Self, ConfigError> {
        let attrs = object.attrs();
        let merge_attrs = batcher.merge_attrs();
        let paint_key = |key: AttrKey| {
            if merge_attrs.contains(&key) {
                attrs.paint(key).map(|p| p.key()).unwrap_or_default()
            } else {
                PaintKey::Constant
            }
        };

        let kind = object.kind();
        let primary_attr = batcher.primary_paint();
        let primary = attrs
            .paint(primary_attr)
            .map(|p| p.key().class())
            .unwrap_or(PaintClass::Constant);
        let program = programs.resolve(kind, primary)?;

        let key = Self {
            kind,
            program,
            blend: if merge_attrs.contains(&AttrKey::BlendMode) {
                attrs.blend_mode(AttrKey::BlendMode).unwrap_or_default()
            } else {
                BlendMode::Normal
            },
            stroke: paint_key(AttrKey::Stroke),
            fill: paint_key(AttrKey::Fill),
        };

        // Programs sample the primary paint only.
        for (attr, paint) in [(AttrKey::Stroke, key.stroke), (AttrKey::Fill, key.fill)] {
            if attr != primary_attr && paint.class() != PaintClass::Constant {
                return Err(ConfigError::MissingProgram { kind, paint: paint.class() });
            }
        }
        let slots = programs.get(program).map_or(0, |p| p.texture_slots as usize);
        if key.bindings().textures.len() > slots {
            return Err(ConfigError::MissingProgram { kind, paint: primary });
        }
        Ok(key)
    }

    /// Pairwise mergeability predicate.
    #[inline]
    pub fn is_mergeable_with(&self, other: &MergeKey) -> bool {
        self == other
    }

    /// Uniform blocks plus one texture per non-constant paint.
    pub fn bindings(&self) -> BindingSet {
        let uniforms = [SCENE_PARAMS, OBJECT_PARAMS]
            .iter()
            .map(|u| UniformBinding { binding: u.binding, name: u.name })
            .collect();
        let textures = [self.fill, self.stroke]
            .into_iter()
            .filter_map(|k| k.resource().map(|r| (k.class(), r)))
            .enumerate()
            .map(|(slot, (class, resource))| TextureBinding { slot: slot as u32, class, resource })
            .collect();
        BindingSet { uniforms, textures }
    }
}

/// A sealed-able group of compatible members.
///
/// Owns exactly one geometry buffer and one draw call record. Member order is
/// paint order and matches record order in the geometry buffer.
#[derive(Debug)]
pub struct Batch {
    id: BatchId,
    key: MergeKey,
    members: Vec<ObjectId>,
    geometry: GeometryBuffer,
    draw_call: DrawCall,
}

impl Batch {
    pub(crate) fn new(
        id: BatchId,
        key: MergeKey,
        batcher: &dyn ShapeBatcher,
        surface: SurfaceHandle,
    ) -> Self {
        let geometry = GeometryBuffer::new(*batcher.layout(), batcher.footprint());
        let draw_call = DrawCall {
            batch: id,
            kind: key.kind,
            program: key.program,
            blend: key.blend,
            geometry: GeometryRef {
                index_count: geometry.footprint().index_count(),
                instance_count: 0,
                instance_stride: geometry.layout().byte_stride() as u32,
            },
            bindings: key.bindings(),
            sort_key: SortKey::new(0, key.program),
            surface,
            objects: Vec::new(),
        };
        Self { id, key, members: Vec::new(), geometry, draw_call }
    }

    #[inline]
    pub fn id(&self) -> BatchId {
        self.id
    }

    #[inline]
    pub fn key(&self) -> &MergeKey {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.key.kind
    }

    #[inline]
    pub fn program(&self) -> ProgramId {
        self.key.program
    }

    #[inline]
    pub fn members(&self) -> &[ObjectId] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    #[inline]
    pub(crate) fn geometry_mut(&mut self) -> &mut GeometryBuffer {
        &mut self.geometry
    }

    /// Draw call as of the last seal.
    #[inline]
    pub fn draw_call(&self) -> &DrawCall {
        &self.draw_call
    }

    /// Replaces all members and rebuilds the geometry.
    pub(crate) fn rebuild<F>(&mut self, members: Vec<ObjectId>, write: F)
    where
        F: FnMut(usize, &mut [f32]),
    {
        self.geometry.rebuild(members.len(), write);
        self.members = members;
    }

    /// Appends a member; returns its slot.
    pub(crate) fn push_member<F>(&mut self, id: ObjectId, write: F) -> usize
    where
        F: FnOnce(&mut [f32]),
    {
        let slot = self.geometry.push_record(write);
        self.members.push(id);
        debug_assert_eq!(slot + 1, self.members.len());
        slot
    }

    /// Removes the member at `slot`, compacting the records behind it.
    pub(crate) fn remove_member(&mut self, slot: usize) -> Result<ObjectId, GeometryError> {
        self.geometry.remove_record(slot)?;
        Ok(self.members.remove(slot))
    }

    #[inline]
    pub(crate) fn patch(
        &mut self,
        slot: usize,
        field: FieldId,
        values: &[f32],
    ) -> Result<(), GeometryError> {
        self.geometry.patch_field(slot, field, values)
    }

    #[inline]
    pub(crate) fn write_member<F>(&mut self, slot: usize, write: F) -> Result<(), GeometryError>
    where
        F: FnOnce(&mut [f32]),
    {
        self.geometry.write_record(slot, write)
    }

    /// Refreshes the draw call for emission at paint position `order`.
    pub(crate) fn seal(&mut self, order: u32) -> &DrawCall {
        self.draw_call.sort_key = SortKey::new(order, self.key.program);
        self.draw_call.geometry.instance_count = self.members.len() as u32;
        self.draw_call.objects.clear();
        self.draw_call.objects.extend_from_slice(&self.members);
        &self.draw_call
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{Color, Paint, Pattern, Repetition};
    use crate::render::shapes::{ShapeRegistry, CIRCLE, LINE, RECT};

    fn programs() -> ProgramRegistry {
        ProgramRegistry::builtin(&ShapeRegistry::builtin())
    }

    fn line(stroke: Paint) -> SceneObject {
        SceneObject::new(ShapeKind::Line).with(AttrKey::Stroke, stroke)
    }

    fn pattern(image: &str) -> Paint {
        Paint::Pattern(Pattern::new(image, (8, 8), Repetition::Repeat))
    }

    fn key(o: &SceneObject) -> MergeKey {
        MergeKey::for_object(&LINE, o, &programs()).unwrap()
    }

    // ── predicate ─────────────────────────────────────────────────────────

    #[test]
    fn constants_of_different_color_merge() {
        let a = line(Paint::solid(Color::from_straight(1.0, 0.0, 0.0, 1.0)));
        let b = line(Paint::solid(Color::from_straight(0.0, 1.0, 0.0, 0.5)));
        assert!(key(&a).is_mergeable_with(&key(&b)));
    }

    #[test]
    fn constant_never_merges_with_pattern() {
        let a = line(Paint::solid(Color::white()));
        let b = line(pattern("p.png"));
        assert!(!key(&a).is_mergeable_with(&key(&b)));
        assert!(!key(&b).is_mergeable_with(&key(&a)));
    }

    #[test]
    fn patterns_merge_by_content_not_by_object() {
        let a = line(pattern("p.png"));
        let b = line(pattern("p.png"));
        let c = line(pattern("q.png"));
        assert!(key(&a).is_mergeable_with(&key(&b)));
        assert!(!key(&a).is_mergeable_with(&key(&c)));
    }

    #[test]
    fn blend_mode_splits() {
        let a = line(Paint::solid(Color::white()));
        let b = line(Paint::solid(Color::white())).with(AttrKey::BlendMode, BlendMode::Multiply);
        assert!(!key(&a).is_mergeable_with(&key(&b)));
    }

    #[test]
    fn fill_is_ignored_for_lines() {
        let a = line(Paint::solid(Color::white()));
        let b = line(Paint::solid(Color::white())).with(AttrKey::Fill, pattern("p.png"));
        assert_eq!(key(&a), key(&b));
    }

    #[test]
    fn textured_stroke_on_filled_shape_has_no_program() {
        let programs = programs();
        let circle = SceneObject::new(ShapeKind::Circle)
            .with(AttrKey::Fill, Paint::solid(Color::white()))
            .with(AttrKey::Stroke, pattern("p.png"));
        assert_eq!(
            MergeKey::for_object(&CIRCLE, &circle, &programs),
            Err(ConfigError::MissingProgram { kind: ShapeKind::Circle, paint: PaintClass::Pattern })
        );

        let rect = SceneObject::new(ShapeKind::Rect)
            .with(AttrKey::Fill, pattern("p.png"))
            .with(AttrKey::Stroke, pattern("q.png"));
        assert!(MergeKey::for_object(&RECT, &rect, &programs).is_err());

        let plain = SceneObject::new(ShapeKind::Rect).with(AttrKey::Fill, pattern("p.png"));
        let k = MergeKey::for_object(&RECT, &plain, &programs).unwrap();
        assert_eq!(k.bindings().textures.len(), 1);
    }

    // ── bindings ──────────────────────────────────────────────────────────

    #[test]
    fn textured_key_binds_its_resource() {
        let k = key(&line(pattern("p.png")));
        let b = k.bindings();
        assert_eq!(b.uniforms.len(), 2);
        assert_eq!(b.textures.len(), 1);
        assert_eq!(Some(b.textures[0].resource), k.stroke.resource());

        assert!(key(&line(Paint::solid(Color::white()))).bindings().textures.is_empty());
    }
}
