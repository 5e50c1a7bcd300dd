//! Preview window for generated fragment shaders.
//!
//! The crate owns the winit window, the `wgpu` pipeline and the uniform block
//! that animated shaders read. Shader text comes from a [`ShaderProvider`],
//! which keeps this crate ignorant of how shaders are produced. The overall
//! flow is:
//!
//! ```text
//!   CLI / pollock
//!          │ RendererConfig + Arc<dyn ShaderProvider>
//!          ▼
//!   Renderer::run ──▶ winit event loop ──▶ GpuState::render() ─▶ GPU UBO
//!          │                  ▲
//!          │ seed             │ WindowCommand::PipelineReady
//!          ▼                  │
//!   shader worker ──▶ shader_for() ──▶ validate_fragment() ──▶ render pipeline
//! ```
//!
//! The worker thread validates each shader with naga and compiles its
//! pipeline, so the event loop only swaps finished pipelines in. A bad shader
//! is reported with its seed and the pipeline already on screen keeps running.

pub mod compile;
mod gpu;
pub mod runtime;
mod types;
mod window;

use std::sync::Arc;

use anyhow::Result;

pub use compile::{validate_fragment, CompileDiagnostic};
pub use gpu::FrameUniforms;
pub use types::{AdapterProfile, ProvidedShader, RendererConfig, ShaderProvider};

/// Entry point that owns the configuration for one preview session.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Opens the window and blocks until the user closes it.
    ///
    /// Must be called from the main thread; winit requires it on most platforms.
    pub fn run(self, provider: Arc<dyn ShaderProvider>) -> Result<()> {
        tracing::debug!(
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            fps = ?self.config.target_fps,
            seed = ?self.config.initial_seed,
            "starting preview window"
        );
        window::run_window(self.config, provider)
    }
}
