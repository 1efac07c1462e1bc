//! wgpu submission layer.
//!
//! This module is responsible for:
//! - mirroring each batch's geometry into GPU buffers, re-uploading dirty ranges only
//! - translating program descriptors into vertex buffer layouts and pipelines
//! - encoding compiled frames into a render pass
//!
//! Surface creation and presentation stay with the host.

mod buffers;
mod format;
mod limits;
mod pipeline;
mod resources;

pub use buffers::GpuGeometry;
pub use format::{vertex_format, ProgramVertexLayouts};
pub use limits::limits_config;
pub use pipeline::{blend_state, ProgramPipelines};
pub use resources::{GpuResources, PipelineSource};
