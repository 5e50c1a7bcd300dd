use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use artconfig::ArtConfig;
use renderer::{ProvidedShader, Renderer, RendererConfig, ShaderProvider};
use shadergen::{Generator, GeneratorSettings, ShadingLanguage};
use tracing_subscriber::EnvFilter;

use crate::cli::{GeneratorArgs, RunArgs};
use crate::paths::load_config;
use crate::settings::generator_settings;

/// Logs go to stderr so `generate` output on stdout stays clean.
pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Feeds the preview window from a [`Generator`].
pub struct GeneratorProvider {
    generator: Generator,
}

impl GeneratorProvider {
    /// The window only consumes GLSL, whatever the configured language.
    pub fn new(settings: GeneratorSettings) -> Self {
        if settings.language != ShadingLanguage::Glsl {
            tracing::warn!(
                language = %settings.language,
                "preview window renders GLSL; ignoring configured language"
            );
        }
        Self {
            generator: Generator::new(GeneratorSettings {
                language: ShadingLanguage::Glsl,
                ..settings
            }),
        }
    }
}

impl ShaderProvider for GeneratorProvider {
    fn shader_for(&self, seed: u64) -> ProvidedShader {
        let shader = self.generator.generate(seed);
        tracing::info!(
            seed,
            max_depth = shader.max_depth,
            mask = shader.mask,
            nodes = shader.tree.node_count(),
            "generated shader"
        );
        ProvidedShader {
            seed,
            source: shader.source,
        }
    }

    fn uniforms(&self, elapsed_seconds: f32) -> [f32; 4] {
        shadergen::time_uniforms(elapsed_seconds)
    }
}

pub fn renderer_config(config: &ArtConfig, args: &RunArgs) -> RendererConfig {
    let size = args.size.unwrap_or_else(|| config.window_size());
    let target_fps = match args.fps {
        Some(fps) if fps > 0.0 => Some(fps),
        Some(_) => None,
        None => config.fps_cap(),
    };
    RendererConfig {
        surface_size: (size.width, size.height),
        target_fps,
        initial_seed: args.seed.or(config.generator.seed),
        regenerate_every: args.regenerate_every.or(config.window.regenerate_every),
        ..RendererConfig::default()
    }
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let overrides = GeneratorArgs {
        seed: args.seed,
        style: args.style,
        static_mode: args.static_mode,
        depth: None,
    };
    let settings = generator_settings(&config, &overrides);
    let renderer_config = renderer_config(&config, &args);
    tracing::info!(
        style = %settings.style,
        animate = settings.animate,
        seed = ?renderer_config.initial_seed,
        "opening preview window (space regenerates, escape quits)"
    );

    let provider: Arc<dyn ShaderProvider> = Arc::new(GeneratorProvider::new(settings));
    Renderer::new(renderer_config).run(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use artconfig::WindowSize;
    use std::time::Duration;

    #[test]
    fn provider_always_emits_glsl() {
        let provider = GeneratorProvider::new(GeneratorSettings {
            language: ShadingLanguage::Hlsl,
            ..GeneratorSettings::animated()
        });
        let shader = provider.shader_for(3);
        assert_eq!(shader.seed, 3);
        assert!(shader.source.starts_with("#version 450"));
        assert_eq!(provider.uniforms(0.0), [0.5, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn flags_take_precedence_over_window_section() {
        let mut config = ArtConfig::default();
        config.window.fps = Some(30.0);
        config.window.regenerate_every = Some(Duration::from_secs(60));
        config.generator.seed = Some(1);

        let args = RunArgs {
            seed: Some(2),
            size: Some(WindowSize {
                width: 640,
                height: 480,
            }),
            fps: Some(0.0),
            ..RunArgs::default()
        };
        let resolved = renderer_config(&config, &args);
        assert_eq!(resolved.surface_size, (640, 480));
        assert_eq!(resolved.target_fps, None);
        assert_eq!(resolved.initial_seed, Some(2));
        assert_eq!(resolved.regenerate_every, Some(Duration::from_secs(60)));

        let from_config = renderer_config(&config, &RunArgs::default());
        assert_eq!(from_config.surface_size, (1280, 720));
        assert_eq!(from_config.target_fps, Some(30.0));
        assert_eq!(from_config.initial_seed, Some(1));
    }
}
