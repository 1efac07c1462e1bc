use core::cmp::Ordering;

use crate::paint::PaintClass;
use crate::scene::{BlendMode, ObjectId, ShapeKind};

use super::batch::BatchId;
use super::program::ProgramId;

/// Opaque backend surface/context handle. The core only passes it through.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct SurfaceHandle(pub u64);

/// Draw-call ordering key.
///
/// Ordering rules:
/// 1) `order`: ascending paint position of the batch (never reordered)
/// 2) `program`: ascending, groups state changes when orders tie
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SortKey {
    pub order: u32,
    pub program: ProgramId,
}

impl SortKey {
    #[inline]
    pub const fn new(order: u32, program: ProgramId) -> Self {
        Self { order, program }
    }

    /// Single integer form: order in the high bits, program in the low 16.
    #[inline]
    pub const fn packed(self) -> u64 {
        ((self.order as u64) << 16) | self.program.0 as u64
    }
}

impl Ord for SortKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.order.cmp(&other.order) {
            Ordering::Equal => self.program.cmp(&other.program),
            o => o,
        }
    }
}

impl PartialOrd for SortKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Geometry reference of a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct GeometryRef {
    pub index_count: u32,
    pub instance_count: u32,
    /// Instance record size in bytes.
    pub instance_stride: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformBinding {
    pub binding: u32,
    pub name: &'static str,
}

/// Texture sampled by a non-constant paint, identified by its content hash.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureBinding {
    pub slot: u32,
    pub class: PaintClass,
    pub resource: u64,
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct BindingSet {
    pub uniforms: Vec<UniformBinding>,
    pub textures: Vec<TextureBinding>,
}

/// One compiled unit of GPU work.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub batch: BatchId,
    pub kind: ShapeKind,
    pub program: ProgramId,
    /// Part of the pipeline state, not of the program.
    pub blend: BlendMode,
    pub geometry: GeometryRef,
    pub bindings: BindingSet,
    pub sort_key: SortKey,
    pub surface: SurfaceHandle,
    /// Members in instance (= paint) order.
    pub objects: Vec<ObjectId>,
}
