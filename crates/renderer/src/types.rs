use std::time::Duration;

/// Source text for one fragment shader together with the seed that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedShader {
    pub seed: u64,
    /// Complete Vulkan-style GLSL 450 fragment shader.
    pub source: String,
}

/// Supplies shaders and per-frame uniform values to the preview window.
///
/// `shader_for` runs on a worker thread, `uniforms` on the event-loop thread,
/// so implementations must be shareable across both.
pub trait ShaderProvider: Send + Sync + 'static {
    fn shader_for(&self, seed: u64) -> ProvidedShader;

    /// Values written to the 16-byte uniform block before each frame.
    fn uniforms(&self, elapsed_seconds: f32) -> [f32; 4];
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    /// Optional FPS cap; `None` renders on every redraw opportunity.
    pub target_fps: Option<f32>,
    /// Seed for the first shader. Later shaders derive their seeds from the clock.
    pub initial_seed: Option<u64>,
    /// Regenerate automatically after this much time without a new shader.
    pub regenerate_every: Option<Duration>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            title: "Procedural Pollock".to_string(),
            target_fps: None,
            initial_seed: None,
            regenerate_every: None,
        }
    }
}

/// Summary of the adapter wgpu selected, used for logging and FPS policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
        }
    }

    /// True for CPU rasterizers such as llvmpipe or WARP.
    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_adapters_count_as_software() {
        let profile = AdapterProfile {
            name: "llvmpipe".into(),
            backend: wgpu::Backend::Vulkan,
            device_type: wgpu::DeviceType::Cpu,
        };
        assert!(profile.is_software());
        let discrete = AdapterProfile {
            device_type: wgpu::DeviceType::DiscreteGpu,
            ..profile
        };
        assert!(!discrete.is_software());
    }

    #[test]
    fn default_config_is_uncapped_and_clock_seeded() {
        let config = RendererConfig::default();
        assert_eq!(config.target_fps, None);
        assert_eq!(config.initial_seed, None);
        assert_eq!(config.regenerate_every, None);
    }
}
