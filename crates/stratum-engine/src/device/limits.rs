use crate::render::RendererConfig;

/// Renderer limits for a device: a batch's instance buffer must fit in one
/// wgpu buffer.
pub fn limits_config(limits: &wgpu::Limits) -> RendererConfig {
    RendererConfig {
        max_buffer_bytes: limits.max_buffer_size,
        ..RendererConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_limit_follows_device() {
        let limits = wgpu::Limits::downlevel_webgl2_defaults();
        let config = limits_config(&limits);
        assert_eq!(config.max_buffer_bytes, limits.max_buffer_size);
        assert_eq!(config.max_members_per_batch, None);
    }
}
