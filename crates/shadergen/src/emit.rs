//! Serialisation of a [`ShaderTree`] into pixel-shader source.

use std::fmt;
use std::str::FromStr;

use crate::catalog::{Catalog, Segment, Template, COS_TIME, SIN_TIME};
use crate::rng::ShaderRng;
use crate::tree::{Expr, ShaderTree};

/// Smallest literal written into a shader.
pub const LITERAL_MIN: f64 = 0.000_001;
/// Largest literal written into a shader.
pub const LITERAL_MAX: f64 = 0.999_999;

/// Target dialect of the emitted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingLanguage {
    /// Direct3D pixel shader with a `cbuffer` and `SV_TARGET` output.
    Hlsl,
    /// Vulkan-style GLSL 450, as consumed by the preview renderer.
    #[default]
    Glsl,
}

impl ShadingLanguage {
    pub const ALL: [ShadingLanguage; 2] = [ShadingLanguage::Hlsl, ShadingLanguage::Glsl];

    pub fn name(self) -> &'static str {
        match self {
            ShadingLanguage::Hlsl => "hlsl",
            ShadingLanguage::Glsl => "glsl",
        }
    }

    /// Suffix appended to float literals.
    pub fn literal_suffix(self) -> &'static str {
        match self {
            ShadingLanguage::Hlsl => "f",
            ShadingLanguage::Glsl => "",
        }
    }
}

impl fmt::Display for ShadingLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shading language '{0}' (expected glsl or hlsl)")]
pub struct UnknownLanguage(pub String);

impl FromStr for ShadingLanguage {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "glsl" => Ok(ShadingLanguage::Glsl),
            "hlsl" => Ok(ShadingLanguage::Hlsl),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Formats a literal with six decimals after clamping it into
/// `[LITERAL_MIN, LITERAL_MAX]`.
pub fn format_literal(value: f64, language: ShadingLanguage) -> String {
    let clamped = value.clamp(LITERAL_MIN, LITERAL_MAX);
    format!("{clamped:.6}{}", language.literal_suffix())
}

/// Writes the complete shader: prelude, entry point and colour program.
///
/// Literal marks draw from `rng` in textual order, so the emitted text is a
/// pure function of the tree and the stream position.
///
/// # Panics
///
/// Panics if `tree` was not built from `catalog`: an index outside a table,
/// or a call whose argument count differs from its template's slots.
pub fn emit_shader(
    tree: &ShaderTree,
    catalog: &Catalog,
    language: ShadingLanguage,
    rng: &mut ShaderRng,
) -> String {
    let mut writer = Writer {
        catalog,
        language,
        animate: tree.animate,
        rng,
        out: String::with_capacity(8 * 1024),
    };

    let prelude = catalog.prelude(language);
    match language {
        ShadingLanguage::Glsl => {
            writer.push(GLSL_HEADER);
            writer.push(prelude);
            writer.push("\nvoid main()\n{\n    vec2 uv = v_uv;\n");
            writer.push("    float invX = 1.0 - uv.x;\n    float invY = 1.0 - uv.y;\n");
            if tree.animate {
                writer.push(&format!("    float {SIN_TIME} = params.buf.x;\n"));
                writer.push(&format!("    float {COS_TIME} = params.buf.y;\n"));
            }
            writer.push("    vec3 rgb = vec3(");
        }
        ShadingLanguage::Hlsl => {
            writer.push(prelude);
            writer.push(HLSL_HEADER);
            writer.push("    float invX = 1.0f - uv.x;\n    float invY = 1.0f - uv.y;\n");
            if tree.animate {
                writer.push(&format!("    float {SIN_TIME} = buf.x;\n"));
                writer.push(&format!("    float {COS_TIME} = buf.y;\n"));
            }
            writer.push("    float3 rgb = float3(");
        }
    }

    let [red, green, blue] = &tree.channels;
    writer.expr(red);
    writer.push(", ");
    writer.expr(green);
    writer.push(", ");
    writer.expr(blue);
    writer.push(");\n    rgb = ");

    let mask = &catalog.masks().entries()[tree.mask.0];
    writer.template(&mask.template, &mut tree.mask_args.iter());
    writer.push(";\n");

    match language {
        ShadingLanguage::Glsl => writer.push("    out_color = vec4(rgb, 1.0);\n}\n"),
        ShadingLanguage::Hlsl => writer.push("    return float4(rgb, 1.0f);\n}\n"),
    }
    writer.out
}

const GLSL_HEADER: &str = "#version 450

layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform Params
{
    vec4 buf;
} params;
";

const HLSL_HEADER: &str = "
cbuffer ConstantBuffer
{
    float4 buf;
};

float4 main(float2 uv : TEXCOORD) : SV_TARGET
{
";

struct Writer<'a> {
    catalog: &'a Catalog,
    language: ShadingLanguage,
    animate: bool,
    rng: &'a mut ShaderRng,
    out: String,
}

impl Writer<'_> {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn expr(&mut self, expr: &Expr) {
        let catalog = self.catalog;
        // Tree indices always come from the catalog that expanded them.
        let (entry, args) = match expr {
            Expr::Value(value) => (
                &catalog.values(self.animate).entries()[value.0],
                &[] as &[Expr],
            ),
            Expr::Call { function, args } => (
                &catalog.functions().entries()[function.0],
                args.as_slice(),
            ),
        };
        let mut args = args.iter();
        self.template(&entry.template, &mut args);
        assert!(
            args.next().is_none(),
            "call has more arguments than its template has slots"
        );
    }

    fn template<'e>(&mut self, template: &Template, args: &mut impl Iterator<Item = &'e Expr>) {
        for segment in template.segments() {
            match segment {
                Segment::Text(text) => self.push(text),
                Segment::Slot => {
                    let arg = args.next().unwrap_or_else(|| {
                        panic!("template `{}` is missing an argument", template.pattern())
                    });
                    self.expr(arg);
                }
                Segment::Literal => {
                    let literal = format_literal(self.rng.float_open(), self.language);
                    self.push(&literal);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Style;
    use crate::tree::{FunctionRef, MaskRef, ValueRef};

    fn literal_index(catalog: &Catalog, animate: bool) -> usize {
        catalog
            .values(animate)
            .entries()
            .iter()
            .position(|entry| entry.template.pattern() == "#")
            .expect("literal value")
    }

    #[test]
    fn literals_clamp_and_carry_language_suffix() {
        assert_eq!(format_literal(0.5, ShadingLanguage::Hlsl), "0.500000f");
        assert_eq!(format_literal(0.5, ShadingLanguage::Glsl), "0.500000");
        assert_eq!(format_literal(1e-9, ShadingLanguage::Glsl), "0.000001");
        assert_eq!(format_literal(0.999_999_9, ShadingLanguage::Glsl), "0.999999");
    }

    #[test]
    fn language_parses_case_insensitively() {
        assert_eq!("GLSL".parse::<ShadingLanguage>(), Ok(ShadingLanguage::Glsl));
        assert_eq!("hlsl".parse::<ShadingLanguage>(), Ok(ShadingLanguage::Hlsl));
        assert!("wgsl".parse::<ShadingLanguage>().is_err());
    }

    #[test]
    fn literals_are_drawn_in_textual_order() {
        let catalog = Catalog::get(Style::Pollock);
        let literal = ValueRef(literal_index(catalog, false));
        let tree = ShaderTree {
            max_depth: 1,
            animate: false,
            mask: MaskRef(catalog.identity_mask().expect("identity")),
            mask_args: vec![],
            channels: [Expr::Value(literal), Expr::Value(ValueRef(0)), Expr::Value(literal)],
        };

        let mut draws = ShaderRng::from_seed_value(5);
        let first = format_literal(draws.float_open(), ShadingLanguage::Glsl);
        let second = format_literal(draws.float_open(), ShadingLanguage::Glsl);

        let mut rng = ShaderRng::from_seed_value(5);
        let source = emit_shader(&tree, catalog, ShadingLanguage::Glsl, &mut rng);
        assert!(
            source.contains(&format!("vec3 rgb = vec3({first}, uv.x, {second});")),
            "{source}"
        );
        assert!(source.contains("    rgb = rgb;\n"));
    }

    #[test]
    fn glsl_skeleton_has_renderer_interface() {
        let catalog = Catalog::get(Style::Pollock);
        let tree = ShaderTree {
            max_depth: 1,
            animate: true,
            mask: MaskRef(1),
            mask_args: vec![Expr::Value(ValueRef(1))],
            channels: [
                Expr::Call {
                    function: FunctionRef(0),
                    args: vec![Expr::Value(ValueRef(4))],
                },
                Expr::Value(ValueRef(2)),
                Expr::Value(ValueRef(3)),
            ],
        };
        let mut rng = ShaderRng::from_seed_value(0);
        let source = emit_shader(&tree, catalog, ShadingLanguage::Glsl, &mut rng);
        assert!(source.starts_with("#version 450\n"));
        assert!(source.contains("layout(location = 0) out vec4 out_color;"));
        assert!(source.contains("float sinTime = params.buf.x;"));
        assert!(source.contains("vec3 rgb = vec3(fInv(sinTime), invX, invY);"));
        assert!(source.contains("rgb = fAdd3(rgb, uv.y);"));
        assert!(source.contains(catalog.prelude(ShadingLanguage::Glsl)));
    }

    #[test]
    #[should_panic(expected = "missing an argument")]
    fn call_without_its_arguments_is_rejected() {
        let catalog = Catalog::get(Style::Pollock);
        let tree = ShaderTree {
            max_depth: 1,
            animate: true,
            mask: MaskRef(catalog.identity_mask().expect("identity")),
            mask_args: vec![],
            channels: [
                Expr::Call {
                    function: FunctionRef(0),
                    args: vec![],
                },
                Expr::Value(ValueRef(0)),
                Expr::Value(ValueRef(0)),
            ],
        };
        let mut rng = ShaderRng::from_seed_value(0);
        emit_shader(&tree, catalog, ShadingLanguage::Glsl, &mut rng);
    }

    #[test]
    #[should_panic]
    fn index_outside_the_catalog_is_rejected() {
        let catalog = Catalog::get(Style::Pollock);
        let tree = ShaderTree {
            max_depth: 1,
            animate: true,
            mask: MaskRef(catalog.masks().len()),
            mask_args: vec![],
            channels: [
                Expr::Value(ValueRef(0)),
                Expr::Value(ValueRef(0)),
                Expr::Value(ValueRef(0)),
            ],
        };
        let mut rng = ShaderRng::from_seed_value(0);
        emit_shader(&tree, catalog, ShadingLanguage::Glsl, &mut rng);
    }

    #[test]
    fn hlsl_skeleton_matches_pixel_shader_layout() {
        let catalog = Catalog::get(Style::Bounce);
        let literal = ValueRef(literal_index(catalog, false));
        let tree = ShaderTree {
            max_depth: 1,
            animate: false,
            mask: MaskRef(0),
            mask_args: vec![],
            channels: [
                Expr::Value(literal),
                Expr::Value(ValueRef(0)),
                Expr::Value(ValueRef(1)),
            ],
        };
        let mut rng = ShaderRng::from_seed_value(0);
        let source = emit_shader(&tree, catalog, ShadingLanguage::Hlsl, &mut rng);
        assert!(source.starts_with(catalog.prelude(ShadingLanguage::Hlsl)));
        assert!(source.contains("cbuffer ConstantBuffer\n{\n    float4 buf;\n};"));
        assert!(source.contains("float4 main(float2 uv : TEXCOORD) : SV_TARGET"));
        assert!(source.contains("f, uv.x, uv.y);"));
        assert!(source.ends_with("    return float4(rgb, 1.0f);\n}\n"));
        assert!(!source.contains("sinTime") && !source.contains("cosTime"));
    }
}
