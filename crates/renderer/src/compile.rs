use std::borrow::Cow;

use wgpu::naga;
use wgpu::naga::ShaderStage;

/// Why a fragment shader could not be turned into a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileDiagnostic {
    #[error("GLSL front end rejected the fragment shader:\n{0}")]
    Parse(String),
    #[error("fragment shader failed validation:\n{0}")]
    Validation(String),
    #[error("device rejected the shader pipeline: {0}")]
    Device(String),
}

/// Runs the GLSL front end and the IR validator over `source` without a GPU.
///
/// This is the same naga path wgpu takes when it creates the module, so a
/// shader that passes here only fails later for device-specific reasons.
pub fn validate_fragment(source: &str) -> Result<(), CompileDiagnostic> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options::from(ShaderStage::Fragment);
    let module = frontend
        .parse(&options, source)
        .map_err(|errors| CompileDiagnostic::Parse(errors.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|error| CompileDiagnostic::Validation(error.emit_to_string(source)))?;
    Ok(())
}

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Hands generated GLSL to wgpu. Errors surface through the caller's error scope.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("generated fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Minimal full-screen triangle vertex shader; `v_uv` spans `[0, 1]` with the
/// origin in the bottom-left corner.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
