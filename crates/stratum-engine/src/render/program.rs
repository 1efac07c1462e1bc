//! Backend-agnostic shading program descriptions and the kind → program registry.

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::paint::PaintClass;
use crate::scene::ShapeKind;

use super::geometry::{Footprint, InstanceLayout};
use super::shapes::ShapeRegistry;

/// Registry-assigned program identity. Also the secondary draw-call sort key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct ProgramId(pub u16);

/// Float vector width of an attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    F32,
    F32x2,
    F32x3,
    F32x4,
}

impl VertexFormat {
    /// Format for `components` floats (1..=4).
    #[inline]
    pub const fn from_components(components: usize) -> Option<Self> {
        match components {
            1 => Some(VertexFormat::F32),
            2 => Some(VertexFormat::F32x2),
            3 => Some(VertexFormat::F32x3),
            4 => Some(VertexFormat::F32x4),
            _ => None,
        }
    }

    #[inline]
    pub const fn components(self) -> usize {
        match self {
            VertexFormat::F32 => 1,
            VertexFormat::F32x2 => 2,
            VertexFormat::F32x3 => 3,
            VertexFormat::F32x4 => 4,
        }
    }
}

/// Attribute fetch frequency.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StepMode {
    Vertex,
    Instance,
}

/// Vertex buffer slot holding the shared footprint.
pub const FOOTPRINT_BUFFER: u32 = 0;
/// Vertex buffer slot holding per-instance records.
pub const INSTANCE_BUFFER: u32 = 1;

/// One named shader input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeSlot {
    pub name: &'static str,
    pub location: u32,
    pub buffer: u32,
    pub format: VertexFormat,
    pub byte_offset: u32,
    pub step: StepMode,
}

/// Uniform block binding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformBlock {
    pub name: &'static str,
    pub binding: u32,
    /// Size in bytes (16-byte aligned).
    pub size: u32,
}

/// Per-frame scene parameters: view-projection matrix + viewport.
pub const SCENE_PARAMS: UniformBlock = UniformBlock {
    name: "ub_SceneParams",
    binding: 0,
    size: 80,
};
/// Per-batch parameters: blend mode code + opacity, padded.
pub const OBJECT_PARAMS: UniformBlock = UniformBlock {
    name: "ub_ObjectParams",
    binding: 1,
    size: 16,
};

/// WGSL module text plus entry points. Compiling it is the backend's job.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShaderSource {
    pub wgsl: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
}

impl ShaderSource {
    #[inline]
    pub const fn new(
        wgsl: &'static str,
        vertex_entry: &'static str,
        fragment_entry: &'static str,
    ) -> Self {
        Self { wgsl, vertex_entry, fragment_entry }
    }
}

/// Program variant a batcher offers for a set of paint classes.
#[derive(Debug, Copy, Clone)]
pub struct ProgramVariant {
    pub name: &'static str,
    pub shaders: ShaderSource,
    pub paints: &'static [PaintClass],
    pub texture_slots: u32,
}

/// Backend-agnostic shading program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDescriptor {
    pub id: ProgramId,
    pub name: &'static str,
    pub shaders: ShaderSource,
    pub attributes: Vec<AttributeSlot>,
    pub uniform_blocks: Vec<UniformBlock>,
    pub texture_slots: u32,
    pub footprint_stride: u32,
    pub instance_stride: u32,
}

impl ProgramDescriptor {
    /// Describes an instanced program: footprint attributes first (buffer 0,
    /// per-vertex), then one attribute per layout field (buffer 1, per-instance),
    /// with consecutive locations.
    ///
    /// The id is assigned by [`ProgramRegistry::register`].
    pub fn instanced(
        name: &'static str,
        shaders: ShaderSource,
        footprint: &Footprint,
        layout: &InstanceLayout,
        texture_slots: u32,
    ) -> Self {
        let mut attributes = Vec::with_capacity(footprint.attributes.len() + layout.fields().len());
        let mut location = 0u32;

        for a in footprint.attributes {
            if let Some(format) = VertexFormat::from_components(a.components) {
                attributes.push(AttributeSlot {
                    name: a.name,
                    location,
                    buffer: FOOTPRINT_BUFFER,
                    format,
                    byte_offset: (a.offset * 4) as u32,
                    step: StepMode::Vertex,
                });
                location += 1;
            }
        }
        for f in layout.fields() {
            if let Some(format) = VertexFormat::from_components(f.components) {
                attributes.push(AttributeSlot {
                    name: f.id.attribute_name(),
                    location,
                    buffer: INSTANCE_BUFFER,
                    format,
                    byte_offset: f.byte_offset() as u32,
                    step: StepMode::Instance,
                });
                location += 1;
            }
        }

        Self {
            id: ProgramId::default(),
            name,
            shaders,
            attributes,
            uniform_blocks: vec![SCENE_PARAMS, OBJECT_PARAMS],
            texture_slots,
            footprint_stride: (footprint.vertex_stride * 4) as u32,
            instance_stride: layout.byte_stride() as u32,
        }
    }
}

/// Maps `(shape kind, primary paint class)` to the program that draws it.
#[derive(Debug, Default)]
pub struct ProgramRegistry {
    programs: Vec<ProgramDescriptor>,
    routes: FxHashMap<(ShapeKind, PaintClass), ProgramId>,
}

impl ProgramRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every program variant offered by the batchers in `shapes`.
    pub fn builtin(shapes: &ShapeRegistry) -> Self {
        let mut registry = Self::new();
        for batcher in shapes.iter() {
            for variant in batcher.programs() {
                let desc = ProgramDescriptor::instanced(
                    variant.name,
                    variant.shaders,
                    batcher.footprint(),
                    batcher.layout(),
                    variant.texture_slots,
                );
                let id = registry.register(desc);
                for &paint in variant.paints {
                    registry.route(batcher.kind(), paint, id);
                }
            }
        }
        registry
    }

    /// Stores `desc` and returns its assigned id.
    pub fn register(&mut self, mut desc: ProgramDescriptor) -> ProgramId {
        let id = ProgramId(self.programs.len() as u16);
        desc.id = id;
        log::debug!("registered program {:?} `{}`", id, desc.name);
        self.programs.push(desc);
        id
    }

    /// Routes `(kind, paint)` to `program`, replacing any previous route.
    pub fn route(&mut self, kind: ShapeKind, paint: PaintClass, program: ProgramId) {
        self.routes.insert((kind, paint), program);
    }

    pub fn resolve(&self, kind: ShapeKind, paint: PaintClass) -> Result<ProgramId, ConfigError> {
        self.routes
            .get(&(kind, paint))
            .copied()
            .ok_or(ConfigError::MissingProgram { kind, paint })
    }

    #[inline]
    pub fn get(&self, id: ProgramId) -> Option<&ProgramDescriptor> {
        self.programs.get(id.0 as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramDescriptor> {
        self.programs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> ProgramRegistry {
        ProgramRegistry::builtin(&ShapeRegistry::builtin())
    }

    fn slot<'a>(p: &'a ProgramDescriptor, name: &str) -> &'a AttributeSlot {
        p.attributes.iter().find(|a| a.name == name).unwrap()
    }

    #[test]
    fn builtin_routes_line_paints() {
        let r = builtin();
        let solid = r.resolve(ShapeKind::Line, PaintClass::Constant).unwrap();
        let pattern = r.resolve(ShapeKind::Line, PaintClass::Pattern).unwrap();
        let gradient = r.resolve(ShapeKind::Line, PaintClass::Gradient).unwrap();
        assert_ne!(solid, pattern);
        assert_eq!(pattern, gradient);
        assert_eq!(r.get(pattern).map(|p| p.texture_slots), Some(1));
    }

    #[test]
    fn unrouted_combination_is_a_config_error() {
        let r = builtin();
        assert_eq!(
            r.resolve(ShapeKind::Circle, PaintClass::Pattern),
            Err(ConfigError::MissingProgram { kind: ShapeKind::Circle, paint: PaintClass::Pattern })
        );
        assert!(r.resolve(ShapeKind::Polyline, PaintClass::Constant).is_err());
    }

    #[test]
    fn instanced_line_attributes_follow_layout() {
        let r = builtin();
        let id = r.resolve(ShapeKind::Line, PaintClass::Constant).unwrap();
        let p = r.get(id).unwrap();

        let pos = slot(p, "a_Position");
        assert_eq!((pos.location, pos.buffer, pos.step), (0, FOOTPRINT_BUFFER, StepMode::Vertex));
        let uv = slot(p, "a_Uv");
        assert_eq!((uv.location, uv.byte_offset), (1, 8));

        let points = slot(p, "a_Points");
        assert_eq!(points.format, VertexFormat::F32x4);
        assert_eq!(points.step, StepMode::Instance);
        assert_eq!(points.byte_offset, 8);

        let dash = slot(p, "a_Dash");
        assert_eq!((dash.format, dash.byte_offset), (VertexFormat::F32x3, 28));

        assert_eq!(p.instance_stride, 60);
        assert_eq!(p.footprint_stride, 16);
        assert_eq!(p.uniform_blocks, vec![SCENE_PARAMS, OBJECT_PARAMS]);
    }

    #[test]
    fn ids_are_dense_and_stable() {
        let r = builtin();
        for (i, p) in r.iter().enumerate() {
            assert_eq!(p.id, ProgramId(i as u16));
        }
        assert_eq!(r.len(), 6);
    }
}
