//! Shape batchers: per-kind instance layouts, footprints and record writers.
//!
//! Batchers are stateless statics registered in a [`ShapeRegistry`]; a kind with no
//! registered batcher still gets bounds but cannot be drawn.

mod common;

pub mod circle;
pub mod line;
pub mod rect;

use std::collections::BTreeMap;

use crate::bounds::Bounds;
use crate::error::ConfigError;
use crate::scene::{AttrKey, SceneObject, ShapeKind};

use super::geometry::{FieldId, Footprint, InstanceLayout};
use super::program::ProgramVariant;

pub use circle::CIRCLE;
pub use line::LINE;
pub use rect::RECT;

/// Geometry synthesis for one shape kind.
pub trait ShapeBatcher: Sync + core::fmt::Debug {
    fn kind(&self) -> ShapeKind;

    /// Per-instance record layout.
    fn layout(&self) -> &'static InstanceLayout;

    /// Per-vertex data shared by every instance.
    fn footprint(&self) -> &'static Footprint;

    /// Program variants, each routed for a set of paint classes.
    fn programs(&self) -> &'static [ProgramVariant];

    /// Paint attribute whose class selects the program.
    fn primary_paint(&self) -> AttrKey;

    /// Attributes that feed the merge key.
    fn merge_attrs(&self) -> &'static [AttrKey];

    /// Record fields affected by a change to `key`. Empty when none are.
    fn fields_for(&self, key: AttrKey) -> &'static [FieldId];

    /// Writes one field of `object`'s record into `out` (exactly the field's width).
    fn write_field(&self, object: &SceneObject, bounds: &Bounds, field: FieldId, out: &mut [f32]);

    /// Writes every field of `object`'s record.
    fn write_instance(&self, object: &SceneObject, bounds: &Bounds, record: &mut [f32]) {
        for f in self.layout().fields() {
            self.write_field(object, bounds, f.id, &mut record[f.range()]);
        }
    }
}

/// Shape kind → static batcher.
#[derive(Debug, Default, Clone)]
pub struct ShapeRegistry {
    batchers: BTreeMap<ShapeKind, &'static dyn ShapeBatcher>,
}

impl ShapeRegistry {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Line, circle and rect.
    pub fn builtin() -> Self {
        let mut r = Self::empty();
        r.register(&LINE);
        r.register(&CIRCLE);
        r.register(&RECT);
        r
    }

    /// Registers `batcher` for its kind and returns the one it replaced.
    pub fn register(
        &mut self,
        batcher: &'static dyn ShapeBatcher,
    ) -> Option<&'static dyn ShapeBatcher> {
        self.batchers.insert(batcher.kind(), batcher)
    }

    pub fn get(&self, kind: ShapeKind) -> Result<&'static dyn ShapeBatcher, ConfigError> {
        self.batchers
            .get(&kind)
            .copied()
            .ok_or(ConfigError::UnknownShape(kind))
    }

    /// Registered batchers in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &'static dyn ShapeBatcher> + '_ {
        self.batchers.values().copied()
    }
}
