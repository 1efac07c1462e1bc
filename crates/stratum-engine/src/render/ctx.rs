use super::draw_call::SurfaceHandle;
use super::program::ProgramRegistry;
use super::shapes::ShapeRegistry;

/// Renderer limits.
///
/// Keep this structure small. `device::limits_config` derives it from the
/// adapter's limits; hosts without a device use the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Upper bound on members per batch. `None` batches without limit.
    pub max_members_per_batch: Option<usize>,

    /// Largest instance buffer, in bytes, a single batch may need.
    pub max_buffer_bytes: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_members_per_batch: None,
            max_buffer_bytes: 256 << 20,
        }
    }
}

/// Collaborators the renderer consults. Passed in explicitly; nothing is global.
#[derive(Debug)]
pub struct RenderContext {
    pub shapes: ShapeRegistry,
    pub programs: ProgramRegistry,
    pub config: RendererConfig,
    pub surface: SurfaceHandle,
}

impl RenderContext {
    #[inline]
    pub fn new(
        shapes: ShapeRegistry,
        programs: ProgramRegistry,
        config: RendererConfig,
        surface: SurfaceHandle,
    ) -> Self {
        Self { shapes, programs, config, surface }
    }

    /// Built-in batchers and programs with default limits.
    pub fn builtin(surface: SurfaceHandle) -> Self {
        let shapes = ShapeRegistry::builtin();
        let programs = ProgramRegistry::builtin(&shapes);
        Self::new(shapes, programs, RendererConfig::default(), surface)
    }

    #[inline]
    pub fn with_config(mut self, config: RendererConfig) -> Self {
        self.config = config;
        self
    }
}
