use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use crate::render::{BatchId, DrawCall, Frame, Renderer};

use super::buffers::GpuGeometry;

/// Host-side pipeline and binding provider for [`GpuResources::encode`].
pub trait PipelineSource {
    fn pipeline(&self, call: &DrawCall) -> Option<&wgpu::RenderPipeline>;

    /// Sets the bind groups `call` needs. Returns `false` to skip the call.
    fn bind(&self, rpass: &mut wgpu::RenderPass<'_>, call: &DrawCall) -> bool;
}

/// Per-batch GPU buffers, keyed by batch id.
///
/// Buffers are created on the first `prepare` after a batch appears and dropped
/// once the batch is gone. No buffer is shared across batches.
#[derive(Debug, Default)]
pub struct GpuResources {
    geometry: FxHashMap<BatchId, GpuGeometry>,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live GPU geometries.
    #[inline]
    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    /// Syncs GPU buffers with the renderer's last frame.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        renderer: &mut Renderer,
    ) -> Result<()> {
        for id in &renderer.last_frame().released {
            self.geometry.remove(id);
        }
        self.geometry.retain(|id, _| renderer.batch(*id).is_some());

        let ids: Vec<BatchId> = renderer.last_frame().draw_calls.iter().map(|c| c.batch).collect();
        let mut uploaded = 0u64;
        for id in ids {
            let geometry = renderer
                .geometry_mut(id)
                .with_context(|| format!("draw call references destroyed batch {id:?}"))?;
            let gpu = self
                .geometry
                .entry(id)
                .or_insert_with(|| GpuGeometry::new(device, &*geometry));
            uploaded += gpu.sync(device, queue, geometry);
        }
        log::trace!("prepared {} batches, {uploaded} bytes uploaded", self.geometry.len());
        Ok(())
    }

    /// Issues one indexed, instanced draw per call. Returns the number issued.
    pub fn encode(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        frame: &Frame,
        pipelines: &impl PipelineSource,
    ) -> usize {
        let mut issued = 0;
        for call in &frame.draw_calls {
            let Some(geometry) = self.geometry.get(&call.batch) else {
                log::debug!("batch {:?} has no GPU geometry; prepare first", call.batch);
                continue;
            };
            let Some(pipeline) = pipelines.pipeline(call) else {
                log::debug!("no pipeline for program {:?}", call.program);
                continue;
            };
            if !pipelines.bind(rpass, call) {
                continue;
            }
            rpass.set_pipeline(pipeline);
            if !geometry.bind(rpass) {
                continue;
            }
            rpass.draw_indexed(0..call.geometry.index_count, 0, 0..call.geometry.instance_count);
            issued += 1;
        }
        issued
    }
}
