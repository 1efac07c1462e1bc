use rustc_hash::FxHashMap;

use crate::render::program::{OBJECT_PARAMS, SCENE_PARAMS};
use crate::render::{DrawCall, ProgramId, ProgramRegistry};
use crate::scene::BlendMode;

use super::format::ProgramVertexLayouts;
use super::resources::PipelineSource;

const BLEND_MODES: [BlendMode; 4] = [
    BlendMode::Normal,
    BlendMode::Multiply,
    BlendMode::Screen,
    BlendMode::Additive,
];

/// Premultiplied-alpha blend state for a compositing mode.
pub fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    let color = |src_factor, dst_factor| wgpu::BlendComponent {
        src_factor,
        dst_factor,
        operation: wgpu::BlendOperation::Add,
    };
    let alpha = color(wgpu::BlendFactor::One, wgpu::BlendFactor::OneMinusSrcAlpha);
    let color = match mode {
        BlendMode::Normal => color(wgpu::BlendFactor::One, wgpu::BlendFactor::OneMinusSrcAlpha),
        BlendMode::Multiply => color(wgpu::BlendFactor::Dst, wgpu::BlendFactor::OneMinusSrcAlpha),
        BlendMode::Screen => color(wgpu::BlendFactor::One, wgpu::BlendFactor::OneMinusSrc),
        BlendMode::Additive => color(wgpu::BlendFactor::One, wgpu::BlendFactor::One),
    };
    wgpu::BlendState { color, alpha }
}

/// Render pipelines for every registered program and blend mode.
///
/// Bind group 0 holds the scene and object uniform blocks; group 1 the paint
/// texture and sampler for textured programs. The host creates the bind groups
/// from [`scene_layout`](Self::scene_layout) and [`paint_layout`](Self::paint_layout)
/// and hands them back here.
#[derive(Debug)]
pub struct ProgramPipelines {
    scene_layout: wgpu::BindGroupLayout,
    paint_layout: wgpu::BindGroupLayout,
    pipelines: FxHashMap<(ProgramId, BlendMode), wgpu::RenderPipeline>,
    scene_bindings: Option<wgpu::BindGroup>,
    paint_bindings: FxHashMap<u64, wgpu::BindGroup>,
}

impl ProgramPipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        programs: &ProgramRegistry,
    ) -> Self {
        let uniform = |binding, size| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        };
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("stratum scene bgl"),
            entries: &[
                uniform(SCENE_PARAMS.binding, SCENE_PARAMS.size as u64),
                uniform(OBJECT_PARAMS.binding, OBJECT_PARAMS.size as u64),
            ],
        });
        let paint_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("stratum paint bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let mut pipelines = FxHashMap::default();
        for desc in programs.iter() {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.name),
                source: wgpu::ShaderSource::Wgsl(desc.shaders.wgsl.into()),
            });
            let layout = if desc.texture_slots > 0 {
                device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("stratum textured pipeline layout"),
                    bind_group_layouts: &[&scene_layout, &paint_layout],
                    immediate_size: 0,
                })
            } else {
                device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("stratum pipeline layout"),
                    bind_group_layouts: &[&scene_layout],
                    immediate_size: 0,
                })
            };
            let vertex_layouts = ProgramVertexLayouts::from_descriptor(desc);
            let buffers = vertex_layouts.layouts();

            for mode in BLEND_MODES {
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(desc.name),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some(desc.shaders.vertex_entry),
                        compilation_options: Default::default(),
                        buffers: &buffers,
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some(desc.shaders.fragment_entry),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(blend_state(mode)),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                });
                pipelines.insert((desc.id, mode), pipeline);
            }
            log::debug!("created pipelines for program `{}`", desc.name);
        }

        Self {
            scene_layout,
            paint_layout,
            pipelines,
            scene_bindings: None,
            paint_bindings: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn scene_layout(&self) -> &wgpu::BindGroupLayout {
        &self.scene_layout
    }

    #[inline]
    pub fn paint_layout(&self) -> &wgpu::BindGroupLayout {
        &self.paint_layout
    }

    /// Uniform bind group (group 0) shared by every call.
    pub fn set_scene_bindings(&mut self, bind_group: wgpu::BindGroup) {
        self.scene_bindings = Some(bind_group);
    }

    /// Texture bind group (group 1) for the paint with content hash `resource`.
    pub fn insert_paint(&mut self, resource: u64, bind_group: wgpu::BindGroup) {
        self.paint_bindings.insert(resource, bind_group);
    }

    pub fn remove_paint(&mut self, resource: u64) -> Option<wgpu::BindGroup> {
        self.paint_bindings.remove(&resource)
    }
}

impl PipelineSource for ProgramPipelines {
    fn pipeline(&self, call: &DrawCall) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&(call.program, call.blend))
    }

    fn bind(&self, rpass: &mut wgpu::RenderPass<'_>, call: &DrawCall) -> bool {
        let Some(scene) = self.scene_bindings.as_ref() else {
            return false;
        };
        rpass.set_bind_group(0, scene, &[]);
        match call.bindings.textures.first() {
            None => true,
            Some(texture) => match self.paint_bindings.get(&texture.resource) {
                Some(paint) => {
                    rpass.set_bind_group(1, paint, &[]);
                    true
                }
                None => false,
            },
        }
    }
}
