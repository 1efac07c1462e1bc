//! Batch manager: routes scene objects into batches and compiles frames.
//!
//! Change flow:
//! - `notify_*` hooks keep derived state (bounds, merge key, slot) current and
//!   patch the affected record fields in place
//! - `compile_frame` refreshes objects whose version moved without a notification,
//!   partitions the paint order into runs and reconciles runs with live batches
//!
//! Each scene write bumps an object's version by one and a notification accounts
//! for exactly one write. Anything the hooks could not account for is caught by
//! the version check at compile time.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{Key, SecondaryMap, SlotMap};

use crate::bounds::{self, Bounds};
use crate::error::{CompileError, ConfigError, GeometryError};
use crate::scene::{AttrKey, AttrValue, ObjectId, Scene, SceneChange, SceneObject, ShapeKind};

use super::batch::{Batch, BatchId, MergeKey};
use super::ctx::{RenderContext, RendererConfig};
use super::draw_call::DrawCall;
use super::geometry::{FieldId, GeometryBuffer};
use super::partition::{partition, Planned, Run};
use super::shapes::ShapeBatcher;

/// Counters for observing incremental behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Bounding-volume recomputations.
    pub bounds_updates: u64,
    /// Single-field record patches.
    pub field_patches: u64,
    /// Batches built from scratch.
    pub full_rebuilds: u64,
    /// Records appended to an existing batch.
    pub appends: u64,
    /// Batches reused unchanged by a frame.
    pub reuses: u64,
    /// Objects removed from their batch after a merge-key change.
    pub evictions: u64,
    /// Full record rewrites for unnotified changes.
    pub refreshes: u64,
    /// Successfully compiled frames.
    pub frames: u64,
}

/// An object left out of a frame because it cannot be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedObject {
    pub id: ObjectId,
    pub error: ConfigError,
}

/// Output of one `compile_frame`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Draw calls in paint order.
    pub draw_calls: Vec<DrawCall>,
    pub skipped: Vec<SkippedObject>,
    /// Batches destroyed since the previous frame; their GPU buffers can go.
    pub released: Vec<BatchId>,
}

impl Frame {
    /// Member ids of every call, flattened in draw order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.draw_calls.iter().flat_map(|c| c.objects.iter().copied())
    }
}

/// Core-owned state derived from one scene object.
#[derive(Debug, Clone, Copy)]
struct RenderState {
    kind: ShapeKind,
    /// Object version this state reflects.
    version: u64,
    bounds: Bounds,
    key: Result<MergeKey, ConfigError>,
    batch: Option<BatchId>,
    slot: usize,
}

impl RenderState {
    /// Advances the synced version when `object` is exactly one write ahead.
    #[inline]
    fn account(&mut self, object: &SceneObject) {
        if self.version + 1 == object.version() {
            self.version = object.version();
        }
    }
}

/// Read-only result of the planning phase.
struct Plan {
    runs: Vec<Run>,
    skipped: Vec<SkippedObject>,
    /// Objects whose derived state is out of date, with their fresh merge key.
    stale: Vec<(usize, Result<MergeKey, ConfigError>)>,
}

/// Batches scene objects into ordered instanced draw calls.
#[derive(Debug)]
pub struct Renderer {
    ctx: RenderContext,
    states: SecondaryMap<ObjectId, RenderState>,
    batches: SlotMap<BatchId, Batch>,
    frame: Frame,
    /// Batches destroyed between frames, reported by the next frame.
    pending_released: Vec<BatchId>,
    /// Objects already warned about as skipped.
    reported: FxHashSet<ObjectId>,
    stats: RenderStats,
}

impl Renderer {
    pub fn new(ctx: RenderContext) -> Self {
        Self {
            ctx,
            states: SecondaryMap::new(),
            batches: SlotMap::with_key(),
            frame: Frame::default(),
            pending_released: Vec::new(),
            reported: FxHashSet::default(),
            stats: RenderStats::default(),
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    #[inline]
    pub fn config(&self) -> RendererConfig {
        self.ctx.config
    }

    /// Caps members per batch from the next compile on. Use after
    /// [`CompileError::BufferTooLarge`].
    #[inline]
    pub fn set_max_members_per_batch(&mut self, max: Option<usize>) {
        self.ctx.config.max_members_per_batch = max;
    }

    /// The last successfully compiled frame.
    #[inline]
    pub fn last_frame(&self) -> &Frame {
        &self.frame
    }

    #[inline]
    pub fn bounds(&self, id: ObjectId) -> Option<Bounds> {
        self.states.get(id).map(|s| s.bounds)
    }

    #[inline]
    pub fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.batches.get(id)
    }

    /// Batch currently holding `object`.
    #[inline]
    pub fn batch_of(&self, object: ObjectId) -> Option<BatchId> {
        self.states.get(object).and_then(|s| s.batch)
    }

    /// Mutable geometry of a live batch; the device layer drains its dirty range.
    #[inline]
    pub fn geometry_mut(&mut self, id: BatchId) -> Option<&mut GeometryBuffer> {
        self.batches.get_mut(id).map(|b| b.geometry_mut())
    }

    pub fn batches(&self) -> impl Iterator<Item = &Batch> {
        self.batches.values()
    }

    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    // ── notifications ─────────────────────────────────────────────────────

    /// Starts tracking `object`. It is batched by the next compiled frame.
    ///
    /// A configuration error is returned (and the object later skipped) but its
    /// bounds are still tracked.
    pub fn notify_object_added(&mut self, object: &SceneObject) -> Result<(), ConfigError> {
        let id = object.id();
        if self.states.contains_key(id) {
            self.detach_member(id);
        }

        let kind = object.kind();
        let bounds = bounds::update(kind, object.attrs(), Bounds::default());
        self.stats.bounds_updates += 1;
        let key = self.merge_key(object);

        self.states.insert(
            id,
            RenderState { kind, version: object.version(), bounds, key, batch: None, slot: 0 },
        );
        log::trace!("tracking {kind} {id:?}");
        key.map(|_| ())
    }

    /// Stops tracking `id`, compacting its batch.
    pub fn notify_object_removed(&mut self, id: ObjectId) {
        self.detach_member(id);
        self.states.remove(id);
        self.reported.remove(&id);
    }

    /// Applies one attribute write.
    ///
    /// Bounds are recomputed only when `key` is in the kind's dependency set.
    /// A merge-key change evicts the object from its batch; otherwise only the
    /// record fields affected by `key` are patched.
    pub fn notify_attribute_changed(
        &mut self,
        object: &SceneObject,
        key: AttrKey,
        value: &AttrValue,
    ) {
        debug_assert_eq!(
            object.attr(key),
            Some(value),
            "notified value differs from the stored one"
        );

        let id = object.id();
        let kind = object.kind();
        let Some(state) = self.states.get_mut(id) else {
            log::trace!("attribute change on untracked {id:?}");
            return;
        };

        if bounds::depends_on(kind, key) {
            state.bounds = bounds::update(kind, object.attrs(), state.bounds);
            self.stats.bounds_updates += 1;
        }
        state.account(object);

        let Ok(batcher) = self.ctx.shapes.get(kind) else {
            return;
        };

        if batcher.merge_attrs().contains(&key) {
            let next = MergeKey::for_object(batcher, object, &self.ctx.programs);
            let unchanged = state.key == next;
            state.key = next;
            if !unchanged {
                self.evict(id);
                return;
            }
        }

        let Some(batch) = state.batch else { return };
        let fields = batcher.fields_for(key);
        if fields.is_empty() {
            return;
        }
        let (slot, bounds) = (state.slot, state.bounds);
        self.patch(id, batch, slot, batcher, object, &bounds, fields);
    }

    /// Applies an offset write. Only `Translate` is patched.
    pub fn notify_transform_changed(&mut self, object: &SceneObject) {
        let id = object.id();
        let Some(state) = self.states.get_mut(id) else {
            return;
        };
        state.account(object);

        let (Some(batch), Ok(batcher)) = (state.batch, self.ctx.shapes.get(state.kind)) else {
            return;
        };
        let (slot, bounds) = (state.slot, state.bounds);
        self.patch(id, batch, slot, batcher, object, &bounds, &[FieldId::Translate]);
    }

    /// Replays buffered scene changes, in order.
    pub fn apply_changes(&mut self, scene: &Scene, changes: impl IntoIterator<Item = SceneChange>) {
        for change in changes {
            match change {
                SceneChange::Added(id) => {
                    if let Some(object) = scene.get(id) {
                        if let Err(e) = self.notify_object_added(object) {
                            log::debug!("added {id:?} cannot be drawn: {e}");
                        }
                    }
                }
                SceneChange::Removed(id) => self.notify_object_removed(id),
                SceneChange::AttributeChanged(id, key) => {
                    let Some(object) = scene.get(id) else {
                        continue;
                    };
                    // a removed attribute is picked up by the version check
                    if let Some(value) = object.attr(key) {
                        self.notify_attribute_changed(object, key, value);
                    }
                }
                SceneChange::TransformChanged(id) => {
                    if let Some(object) = scene.get(id) {
                        self.notify_transform_changed(object);
                    }
                }
            }
        }
    }

    // ── compile ───────────────────────────────────────────────────────────

    /// Compiles `objects` (back-to-front paint order) into draw calls.
    ///
    /// Fails without touching any state when a batch would exceed the buffer
    /// limit; the previous frame stays valid.
    pub fn compile_frame(&mut self, objects: &[&SceneObject]) -> Result<&Frame, CompileError> {
        let plan = self.plan(objects)?;
        self.commit(objects, plan);
        Ok(&self.frame)
    }

    fn plan(&self, objects: &[&SceneObject]) -> Result<Plan, CompileError> {
        let mut seen = FxHashSet::default();
        let mut planned = Vec::with_capacity(objects.len());
        let mut skipped = Vec::new();
        let mut stale = Vec::new();

        for (index, object) in objects.iter().enumerate() {
            let id = object.id();
            if id.is_null() || !seen.insert(id) {
                log::debug!("ignoring unidentified or repeated object {id:?}");
                continue;
            }

            let key = match self.states.get(id) {
                Some(state) if state.version == object.version() => state.key,
                _ => {
                    let key = self.merge_key(object);
                    stale.push((index, key));
                    key
                }
            };
            match key {
                Ok(key) => planned.push(Planned { id, key }),
                Err(error) => skipped.push(SkippedObject { id, error }),
            }
        }

        let runs = partition(&planned, self.ctx.config.max_members_per_batch);

        let limit = self.ctx.config.max_buffer_bytes;
        for run in &runs {
            let stride = self.ctx.shapes.get(run.kind()).map_or(0, |b| b.layout().byte_stride());
            let bytes = (run.members.len() * stride) as u64;
            if bytes > limit {
                return Err(CompileError::BufferTooLarge {
                    kind: run.kind(),
                    members: run.members.len(),
                    bytes,
                    limit,
                });
            }
        }

        Ok(Plan { runs, skipped, stale })
    }

    fn commit(&mut self, objects: &[&SceneObject], plan: Plan) {
        let Plan { runs, skipped, stale } = plan;

        for (index, key) in stale {
            self.refresh(objects[index], key);
        }

        let by_id: FxHashMap<ObjectId, &SceneObject> =
            objects.iter().map(|o| (o.id(), *o)).collect();
        let mut claimed = FxHashSet::default();
        let mut emitted = Vec::with_capacity(runs.len());
        for run in &runs {
            if let Some(id) = self.reconcile(run, &by_id, &claimed) {
                claimed.insert(id);
                emitted.push(id);
            }
            if !self.reported.is_empty() {
                for member in &run.members {
                    self.reported.remove(member);
                }
            }
        }

        let mut released = std::mem::take(&mut self.pending_released);
        let unclaimed: Vec<BatchId> =
            self.batches.keys().filter(|id| !claimed.contains(id)).collect();
        for batch_id in unclaimed {
            if let Some(batch) = self.batches.remove(batch_id) {
                for &member in batch.members() {
                    if let Some(state) = self.states.get_mut(member) {
                        if state.batch == Some(batch_id) {
                            state.batch = None;
                        }
                    }
                }
                log::debug!("released unused {} batch {batch_id:?}", batch.kind());
                released.push(batch_id);
            }
        }

        let draw_calls = emitted
            .iter()
            .enumerate()
            .filter_map(|(order, id)| {
                self.batches.get_mut(*id).map(|b| b.seal(order as u32).clone())
            })
            .collect();

        for s in &skipped {
            if self.reported.insert(s.id) {
                log::warn!("skipping {:?}: {}", s.id, s.error);
            }
        }

        self.stats.frames += 1;
        self.frame = Frame { draw_calls, skipped, released };
    }

    /// Brings derived state up to date with an object whose version moved
    /// without a notification.
    fn refresh(&mut self, object: &SceneObject, key: Result<MergeKey, ConfigError>) {
        let id = object.id();
        let kind = object.kind();
        let current = self.states.get(id).map(|s| s.bounds).unwrap_or_default();
        let bounds = bounds::update(kind, object.attrs(), current);
        self.stats.bounds_updates += 1;

        let Some(state) = self.states.get_mut(id) else {
            self.states.insert(
                id,
                RenderState { kind, version: object.version(), bounds, key, batch: None, slot: 0 },
            );
            return;
        };

        let rekeyed = state.key != key;
        state.version = object.version();
        state.bounds = bounds;
        state.key = key;
        if rekeyed {
            self.evict(id);
            return;
        }

        let Some(batch_id) = state.batch else { return };
        let slot = state.slot;
        let written = match (self.batches.get_mut(batch_id), self.ctx.shapes.get(kind)) {
            (Some(batch), Ok(batcher)) if batch.members().get(slot) == Some(&id) => batch
                .write_member(slot, |record| batcher.write_instance(object, &bounds, record))
                .is_ok(),
            _ => false,
        };
        if written {
            self.stats.refreshes += 1;
        } else {
            log::debug!("membership of {id:?} out of sync; re-routing");
            self.evict(id);
        }
    }

    /// Maps a run onto a batch: reuse on exact match, append on prefix match,
    /// otherwise build a new batch.
    fn reconcile(
        &mut self,
        run: &Run,
        objects: &FxHashMap<ObjectId, &SceneObject>,
        claimed: &FxHashSet<BatchId>,
    ) -> Option<BatchId> {
        let batcher = match self.ctx.shapes.get(run.kind()) {
            Ok(b) => b,
            Err(e) => {
                log::debug!("run without batcher: {e}");
                return None;
            }
        };

        let candidate = run
            .members
            .first()
            .and_then(|first| self.states.get(*first))
            .and_then(|s| s.batch)
            .filter(|id| !claimed.contains(id))
            .filter(|id| {
                self.batches
                    .get(*id)
                    .is_some_and(|b| b.key() == &run.key && run.members.starts_with(b.members()))
            });

        if let Some(batch_id) = candidate {
            let existing = self.batches.get(batch_id).map_or(0, |b| b.len());
            if existing == run.members.len() {
                self.stats.reuses += 1;
                return Some(batch_id);
            }
            for &member in &run.members[existing..] {
                self.detach_member(member);
                let (Some(object), Some(state)) =
                    (objects.get(&member), self.states.get_mut(member))
                else {
                    continue;
                };
                let Some(batch) = self.batches.get_mut(batch_id) else {
                    break;
                };
                let bounds = state.bounds;
                state.slot = batch.push_member(member, |record| {
                    batcher.write_instance(object, &bounds, record)
                });
                state.batch = Some(batch_id);
                self.stats.appends += 1;
            }
            log::debug!(
                "appended {} members to {} batch {batch_id:?}",
                run.members.len() - existing,
                run.kind()
            );
            return Some(batch_id);
        }

        for &member in &run.members {
            self.detach_member(member);
        }
        let surface = self.ctx.surface;
        let batch_id = self
            .batches
            .insert_with_key(|id| Batch::new(id, run.key, batcher, surface));
        let states = &self.states;
        if let Some(batch) = self.batches.get_mut(batch_id) {
            batch.rebuild(run.members.clone(), |i, record| {
                let member = run.members[i];
                if let (Some(object), Some(state)) = (objects.get(&member), states.get(member)) {
                    batcher.write_instance(object, &state.bounds, record);
                }
            });
        }
        for (slot, &member) in run.members.iter().enumerate() {
            if let Some(state) = self.states.get_mut(member) {
                state.batch = Some(batch_id);
                state.slot = slot;
            }
        }
        self.stats.full_rebuilds += 1;
        log::debug!("built {} batch {batch_id:?} with {} members", run.kind(), run.members.len());
        Some(batch_id)
    }

    // ── membership ────────────────────────────────────────────────────────

    fn merge_key(&self, object: &SceneObject) -> Result<MergeKey, ConfigError> {
        let batcher = self.ctx.shapes.get(object.kind())?;
        MergeKey::for_object(batcher, object, &self.ctx.programs)
    }

    /// Patches `fields` of one record. Any inconsistency evicts the object.
    #[allow(clippy::too_many_arguments)]
    fn patch(
        &mut self,
        id: ObjectId,
        batch_id: BatchId,
        slot: usize,
        batcher: &dyn ShapeBatcher,
        object: &SceneObject,
        bounds: &Bounds,
        fields: &[FieldId],
    ) {
        let result = match self.batches.get_mut(batch_id) {
            Some(batch) if batch.members().get(slot) == Some(&id) => {
                patch_fields(batch, batcher, object, bounds, slot, fields)
            }
            _ => Err(GeometryError::MemberOutOfRange { index: slot, count: 0 }),
        };
        match result {
            Ok(()) => {
                self.stats.field_patches += fields.len() as u64;
                log::trace!("patched {fields:?} of {id:?}");
            }
            Err(e) => {
                log::debug!("patch of {id:?} failed ({e}); re-routing");
                self.evict(id);
            }
        }
    }

    /// Removes `id` from its batch; it is re-routed by the next compile.
    fn evict(&mut self, id: ObjectId) {
        if self.detach_member(id) {
            self.stats.evictions += 1;
            log::debug!("evicted {id:?} from its batch");
        }
    }

    /// Clears `id`'s membership. Returns whether it was in a batch.
    fn detach_member(&mut self, id: ObjectId) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        let Some(batch_id) = state.batch.take() else {
            return false;
        };
        let hint = state.slot;

        let Some(batch) = self.batches.get_mut(batch_id) else {
            return true;
        };
        let slot = if batch.members().get(hint) == Some(&id) {
            Some(hint)
        } else {
            batch.members().iter().position(|m| *m == id)
        };
        if let Some(slot) = slot {
            match batch.remove_member(slot) {
                Ok(_) => {
                    for (i, member) in batch.members().iter().enumerate().skip(slot) {
                        if let Some(s) = self.states.get_mut(*member) {
                            s.slot = i;
                        }
                    }
                }
                Err(e) => log::debug!("compaction of batch {batch_id:?} failed: {e}"),
            }
        }
        if batch.is_empty() {
            self.batches.remove(batch_id);
            self.pending_released.push(batch_id);
            log::debug!("destroyed empty batch {batch_id:?}");
        }
        true
    }
}

fn patch_fields(
    batch: &mut Batch,
    batcher: &dyn ShapeBatcher,
    object: &SceneObject,
    bounds: &Bounds,
    slot: usize,
    fields: &[FieldId],
) -> Result<(), GeometryError> {
    let mut scratch = [0.0f32; 16];
    for &field in fields {
        let desc = batch
            .geometry()
            .layout()
            .field(field)
            .ok_or(GeometryError::UnknownField(field))?;
        let out = scratch.get_mut(..desc.components).ok_or(GeometryError::ComponentMismatch {
            field,
            expected: desc.components,
            got: 16,
        })?;
        batcher.write_field(object, bounds, field, out);
        batch.patch(slot, field, out)?;
    }
    Ok(())
}
