//! GPU plumbing for the preview window.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `pipeline` turns generated GLSL into a render pipeline inside a
//!   validation error scope; `PipelineBuilder` does it from the shader worker.
//! - `uniforms` mirrors the 16-byte uniform block every generated shader reads.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use pipeline::{PipelineBuilder, ShaderPipeline};
pub(crate) use state::GpuState;
pub use uniforms::FrameUniforms;
