use crate::render::program::{ProgramDescriptor, StepMode, VertexFormat, FOOTPRINT_BUFFER};

/// wgpu format of a float attribute.
#[inline]
pub fn vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match format {
        VertexFormat::F32 => wgpu::VertexFormat::Float32,
        VertexFormat::F32x2 => wgpu::VertexFormat::Float32x2,
        VertexFormat::F32x3 => wgpu::VertexFormat::Float32x3,
        VertexFormat::F32x4 => wgpu::VertexFormat::Float32x4,
    }
}

/// Owned vertex attribute lists of one program, split by buffer slot.
///
/// `layouts()` borrows from this value, so keep it alive while the pipeline
/// descriptor is in use.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramVertexLayouts {
    footprint_stride: u64,
    instance_stride: u64,
    footprint: Vec<wgpu::VertexAttribute>,
    instance: Vec<wgpu::VertexAttribute>,
}

impl ProgramVertexLayouts {
    pub fn from_descriptor(desc: &ProgramDescriptor) -> Self {
        let mut footprint = Vec::new();
        let mut instance = Vec::new();
        for slot in &desc.attributes {
            let attr = wgpu::VertexAttribute {
                format: vertex_format(slot.format),
                offset: slot.byte_offset as u64,
                shader_location: slot.location,
            };
            match (slot.buffer, slot.step) {
                (FOOTPRINT_BUFFER, StepMode::Vertex) => footprint.push(attr),
                _ => instance.push(attr),
            }
        }
        Self {
            footprint_stride: desc.footprint_stride as u64,
            instance_stride: desc.instance_stride as u64,
            footprint,
            instance,
        }
    }

    /// Buffer layouts in slot order: footprint (per vertex), then instances.
    pub fn layouts(&self) -> [wgpu::VertexBufferLayout<'_>; 2] {
        [
            wgpu::VertexBufferLayout {
                array_stride: self.footprint_stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &self.footprint,
            },
            wgpu::VertexBufferLayout {
                array_stride: self.instance_stride,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &self.instance,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::PaintClass;
    use crate::render::{ProgramRegistry, ShapeRegistry};
    use crate::scene::ShapeKind;

    #[test]
    fn line_program_splits_attributes_by_buffer() {
        let programs = ProgramRegistry::builtin(&ShapeRegistry::builtin());
        let id = programs.resolve(ShapeKind::Line, PaintClass::Constant).unwrap();
        let layouts = ProgramVertexLayouts::from_descriptor(programs.get(id).unwrap());
        let [footprint, instance] = layouts.layouts();

        assert_eq!(footprint.array_stride, 16);
        assert_eq!(footprint.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(footprint.attributes.len(), 2);

        assert_eq!(instance.array_stride, 60);
        assert_eq!(instance.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(instance.attributes.len(), 6);
        let dash = instance.attributes[3];
        assert_eq!(
            (dash.format, dash.offset, dash.shader_location),
            (wgpu::VertexFormat::Float32x3, 28, 5)
        );
    }
}
