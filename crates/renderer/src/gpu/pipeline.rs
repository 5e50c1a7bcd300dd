use std::sync::Arc;

use crate::compile::{
    compile_fragment_shader, compile_vertex_shader, validate_fragment, CompileDiagnostic,
};
use crate::types::ProvidedShader;

pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub pipeline_layout: wgpu::PipelineLayout,
    pub vertex_module: wgpu::ShaderModule,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shader pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        Self {
            uniform_layout,
            pipeline_layout,
            vertex_module: compile_vertex_shader(device),
        }
    }
}

pub(crate) struct ShaderPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub seed: u64,
}

impl ShaderPipeline {
    /// Builds a pipeline for a generated fragment shader.
    ///
    /// Module creation and pipeline creation run inside a validation error
    /// scope, so a bad shader comes back as a diagnostic instead of reaching
    /// the device's uncaptured-error handler.
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        surface_format: wgpu::TextureFormat,
        seed: u64,
        source: &str,
    ) -> Result<Self, CompileDiagnostic> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let fragment_module = compile_fragment_shader(device, source);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shader pipeline"),
            layout: Some(&layouts.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &layouts.vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
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
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(CompileDiagnostic::Device(error.to_string()));
        }

        Ok(Self { pipeline, seed })
    }
}

/// Everything the shader worker needs to build pipelines off the event loop.
///
/// Error scopes belong to the thread that pushed them, so the whole
/// push/create/pop sequence stays on whichever thread calls [`Self::build`].
#[derive(Clone)]
pub(crate) struct PipelineBuilder {
    device: wgpu::Device,
    layouts: Arc<PipelineLayouts>,
    surface_format: wgpu::TextureFormat,
}

impl PipelineBuilder {
    pub fn new(
        device: wgpu::Device,
        layouts: Arc<PipelineLayouts>,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            layouts,
            surface_format,
        }
    }

    /// Checks `shader` with naga, then compiles it into a pipeline.
    pub fn build(&self, shader: &ProvidedShader) -> Result<ShaderPipeline, CompileDiagnostic> {
        validate_fragment(&shader.source)?;
        ShaderPipeline::new(
            &self.device,
            &self.layouts,
            self.surface_format,
            shader.seed,
            &shader.source,
        )
    }
}
