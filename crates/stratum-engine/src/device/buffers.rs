use wgpu::util::DeviceExt;

use crate::render::GeometryBuffer;

/// Smallest instance buffer allocation, in bytes.
const MIN_INSTANCE_BYTES: u64 = 256;

/// GPU mirror of one batch's geometry.
///
/// Footprint buffers are immutable. The instance buffer grows by powers of two
/// and otherwise receives only the dirty byte range on each sync.
#[derive(Debug)]
pub struct GpuGeometry {
    footprint_vbo: wgpu::Buffer,
    footprint_ibo: wgpu::Buffer,
    instance_vbo: Option<wgpu::Buffer>,
    capacity: u64,
    /// Instance bytes currently valid on the GPU.
    len: u64,
}

impl GpuGeometry {
    pub fn new(device: &wgpu::Device, geometry: &GeometryBuffer) -> Self {
        let footprint_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stratum footprint vbo"),
            contents: bytemuck::cast_slice(geometry.vertex_data()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let footprint_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stratum footprint ibo"),
            contents: bytemuck::cast_slice(geometry.index_data()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self { footprint_vbo, footprint_ibo, instance_vbo: None, capacity: 0, len: 0 }
    }

    /// Uploads what changed since the last sync. Returns the bytes written.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        geometry: &mut GeometryBuffer,
    ) -> u64 {
        let dirty = geometry.take_dirty();
        let bytes = geometry.instance_bytes();
        let needed = bytes.len() as u64;
        self.len = needed;
        if needed == 0 {
            return 0;
        }

        if self.instance_vbo.is_none() || needed > self.capacity {
            let capacity = needed.next_power_of_two().max(MIN_INSTANCE_BYTES);
            let vbo = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stratum instance vbo"),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&vbo, 0, bytes);
            log::debug!("allocated {capacity}-byte instance buffer");
            self.instance_vbo = Some(vbo);
            self.capacity = capacity;
            return needed;
        }

        let Some(range) = dirty else { return 0 };
        let start = (range.start * 4).min(bytes.len());
        let end = (range.end * 4).min(bytes.len());
        if start >= end {
            return 0;
        }
        if let Some(vbo) = self.instance_vbo.as_ref() {
            queue.write_buffer(vbo, start as u64, &bytes[start..end]);
            log::trace!("uploaded instance bytes {start}..{end}");
        }
        (end - start) as u64
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Binds footprint and instance buffers. Returns `false` when there is
    /// nothing to draw.
    pub fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) -> bool {
        let Some(instance_vbo) = self.instance_vbo.as_ref() else {
            return false;
        };
        if self.len == 0 {
            return false;
        }
        rpass.set_vertex_buffer(0, self.footprint_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..self.len));
        rpass.set_index_buffer(self.footprint_ibo.slice(..), wgpu::IndexFormat::Uint32);
        true
    }
}
