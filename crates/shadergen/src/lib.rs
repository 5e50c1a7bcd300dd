//! Seed-driven generator for procedural pixel shaders.
//!
//! A seed is hashed into a private random stream, the stream picks a maximum
//! depth and a colour mask, three channel expressions are expanded over a
//! weighted catalog of primitives, and the result is written out behind a
//! static prelude of helper functions:
//!
//! ```text
//!   seed ─▶ ShaderRng ─▶ MaxDepth ─▶ mask ─▶ ShaderTree::expand ─▶ emit_shader
//!                                                                     │
//!                                          prelude + entry point ◀────┘
//! ```
//!
//! Generation is total: every call returns complete source with no
//! placeholders left, and identical settings plus an identical seed always
//! produce identical text.

pub mod catalog;
pub mod emit;
pub mod prelude;
pub mod rng;
pub mod tree;

use tracing::debug;

pub use catalog::{Catalog, Style};
pub use emit::{ShadingLanguage, UnknownLanguage};
pub use rng::{mix_seed, Seed, ShaderRng};
pub use tree::{Expr, ShaderTree};

/// Bounds for each of the two draws that make up a random maximum depth.
pub const DEPTH_DRAW_MIN: u32 = 3;
pub const DEPTH_DRAW_MAX: u32 = 7;

/// How the maximum expansion depth is chosen for a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthPolicy {
    /// Sum of two uniform draws in `[lo, hi]`, so the result is centre-heavy.
    Random { lo: u32, hi: u32 },
    /// A fixed depth; no draws are consumed.
    Fixed(u32),
}

impl Default for DepthPolicy {
    fn default() -> Self {
        DepthPolicy::Random {
            lo: DEPTH_DRAW_MIN,
            hi: DEPTH_DRAW_MAX,
        }
    }
}

impl DepthPolicy {
    fn resolve(self, rng: &mut ShaderRng) -> u32 {
        match self {
            DepthPolicy::Random { lo, hi } => {
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                rng.int_between(lo, hi) + rng.int_between(lo, hi)
            }
            DepthPolicy::Fixed(depth) => depth,
        }
    }
}

/// Everything that shapes a shader apart from the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneratorSettings {
    pub style: Style,
    /// When false the time channels are left out of the catalog and the source.
    pub animate: bool,
    pub language: ShadingLanguage,
    pub depth: DepthPolicy,
}

impl GeneratorSettings {
    /// Animated GLSL in the classic style with a random depth.
    pub fn animated() -> Self {
        Self {
            animate: true,
            ..Self::default()
        }
    }
}

/// Output of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedShader {
    pub seed: Seed,
    pub max_depth: u32,
    /// Pattern of the mask template that post-processes the base colour.
    pub mask: &'static str,
    pub tree: ShaderTree,
    pub source: String,
}

/// Builds shaders for a fixed set of settings.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    settings: GeneratorSettings,
    catalog: &'static Catalog,
}

impl Generator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            catalog: Catalog::get(settings.style),
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    /// Produces a complete shader for `seed`.
    ///
    /// The stream is consumed in a fixed order: depth, mask, expansion rounds,
    /// then literals while the source is written.
    pub fn generate(&self, seed: Seed) -> GeneratedShader {
        let mut rng = ShaderRng::from_seed_value(seed);
        let max_depth = self.settings.depth.resolve(&mut rng);
        let tree = ShaderTree::expand(self.catalog, self.settings.animate, max_depth, &mut rng);
        let source = emit::emit_shader(&tree, self.catalog, self.settings.language, &mut rng);
        let mask = self
            .catalog
            .masks()
            .get(tree.mask.0)
            .map(|entry| entry.template.pattern())
            .unwrap_or(catalog::IDENTITY_MASK);

        debug!(
            seed,
            max_depth,
            mask,
            nodes = tree.node_count(),
            style = %self.settings.style,
            language = %self.settings.language,
            "generated shader"
        );

        GeneratedShader {
            seed,
            max_depth,
            mask,
            tree,
            source,
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorSettings::animated())
    }
}

/// Animated classic-style GLSL for `seed`.
pub fn generate_shader(seed: Seed) -> String {
    Generator::default().generate(seed).source
}

/// Uniform values for `elapsed_seconds`: `sinTime`, `cosTime`, then two unused
/// slots. Both time channels oscillate inside `[0, 1]`.
pub fn time_uniforms(elapsed_seconds: f32) -> [f32; 4] {
    let half = elapsed_seconds * 0.5;
    [0.5 + 0.5 * half.sin(), 0.5 + 0.5 * half.cos(), 0.0, 0.0]
}
