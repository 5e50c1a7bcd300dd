use std::sync::Arc;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;

use crate::types::AdapterProfile;

use super::context::GpuContext;
use super::pipeline::{PipelineBuilder, PipelineLayouts, ShaderPipeline};
use super::uniforms::FrameUniforms;

pub(crate) struct GpuState {
    context: GpuContext,
    layouts: Arc<PipelineLayouts>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: FrameUniforms,
    current: Option<ShaderPipeline>,
}

impl GpuState {
    pub(crate) fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size)?;
        let layouts = Arc::new(PipelineLayouts::new(&context.device));

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: FrameUniforms::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let uniforms = FrameUniforms::default();
        Self::write_uniforms(&context.queue, &uniform_buffer, &uniforms);

        Ok(Self {
            context,
            layouts,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            current: None,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn current_seed(&self) -> Option<u64> {
        self.current.as_ref().map(|pipeline| pipeline.seed)
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// A handle for compiling pipelines on another thread against this device.
    pub(crate) fn pipeline_builder(&self) -> PipelineBuilder {
        PipelineBuilder::new(
            self.context.device.clone(),
            Arc::clone(&self.layouts),
            self.context.surface_format,
        )
    }

    /// Makes `pipeline` the one drawn from the next frame on.
    pub(crate) fn install(&mut self, pipeline: ShaderPipeline) {
        let next = pipeline.seed;
        if let Some(previous) = self.current.replace(pipeline) {
            debug!(previous = previous.seed, next, "replaced shader pipeline");
        }
    }

    /// Clears to black and draws the current shader, if any, with `buf` as its uniforms.
    pub(crate) fn render(&mut self, buf: [f32; 4]) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        if frame.suboptimal {
            warn!("surface is suboptimal; presenting anyway");
        }
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.uniforms.set(buf);
        Self::write_uniforms(&self.context.queue, &self.uniform_buffer, &self.uniforms);

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if let Some(pipeline) = self.current.as_ref() {
                render_pass.set_pipeline(&pipeline.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn write_uniforms(queue: &wgpu::Queue, buffer: &wgpu::Buffer, uniforms: &FrameUniforms) {
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(uniforms));
    }
}
