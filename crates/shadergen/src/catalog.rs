//! Primitive library: the value, function and mask catalogs.
//!
//! Templates use two marks:
//!
//! * `@` is a slot that receives a recursively generated sub-expression.
//! * `#` is a literal slot that receives a random constant in `(0, 1)`.
//!
//! Everything else is copied verbatim. Selection weights are explicit integers
//! that reproduce the duplicate-entry weighting of the classic catalogs.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::prelude;
use crate::rng::ShaderRng;

/// Placeholder for a recursively generated sub-expression.
pub const SLOT_MARK: char = '@';
/// Placeholder for a random numeric literal.
pub const LITERAL_MARK: char = '#';

/// One piece of a parsed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Text(&'static str),
    Slot,
    Literal,
}

/// An immutable template pattern split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: &'static str,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(pattern: &'static str) -> Self {
        let mut segments = Vec::new();
        let mut start = 0;
        for (index, ch) in pattern.char_indices() {
            let mark = match ch {
                SLOT_MARK => Segment::Slot,
                LITERAL_MARK => Segment::Literal,
                _ => continue,
            };
            if start < index {
                segments.push(Segment::Text(&pattern[start..index]));
            }
            segments.push(mark);
            start = index + ch.len_utf8();
        }
        if start < pattern.len() {
            segments.push(Segment::Text(&pattern[start..]));
        }
        Self { pattern, segments }
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of `@` slots.
    pub fn arity(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Slot))
            .count()
    }

    /// Number of `#` literal slots.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Literal))
            .count()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern)
    }
}

/// A catalog entry and its relative selection weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    pub template: Template,
    pub weight: u32,
    /// Arity the author intended; checked against the parsed template in tests.
    pub declared_arity: usize,
}

/// An ordered, weighted list of primitives.
#[derive(Debug, Clone)]
pub struct Table {
    entries: Vec<Primitive>,
    total_weight: u32,
}

impl Table {
    fn from_specs(specs: &[PrimitiveSpec]) -> Self {
        let entries: Vec<Primitive> = specs
            .iter()
            .map(|spec| Primitive {
                template: Template::parse(spec.pattern),
                weight: spec.weight,
                declared_arity: spec.arity,
            })
            .collect();
        let total_weight = entries.iter().map(|entry| entry.weight).sum();
        Self {
            entries,
            total_weight,
        }
    }

    pub fn entries(&self) -> &[Primitive] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Primitive> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    /// Weighted choice; returns an index into [`Table::entries`].
    pub fn pick(&self, rng: &mut ShaderRng) -> usize {
        rng.pick_weighted(
            self.total_weight,
            self.entries.iter().map(|entry| entry.weight),
        )
    }

    /// Selection probability of the entry at `index`.
    pub fn probability(&self, index: usize) -> f64 {
        self.entries
            .get(index)
            .map(|entry| f64::from(entry.weight) / f64::from(self.total_weight.max(1)))
            .unwrap_or(0.0)
    }
}

/// Named catalog variants. Each style owns its tables and its prelude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// Classic catalog: `fSharp`, `fWaveDamp`, `fPow` exponent `exp2(4y - 2)`.
    #[default]
    Pollock,
    /// Alternate catalog: `fBounce`, `fPow` exponent `exp2(6y - 3)`.
    Bounce,
}

impl Style {
    pub const ALL: [Style; 2] = [Style::Pollock, Style::Bounce];

    pub fn name(self) -> &'static str {
        match self {
            Style::Pollock => "pollock",
            Style::Bounce => "bounce",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style '{0}' (expected pollock or bounce)")]
pub struct UnknownStyle(pub String);

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pollock" | "classic" | "default" => Ok(Style::Pollock),
            "bounce" => Ok(Style::Bounce),
            other => Err(UnknownStyle(other.to_string())),
        }
    }
}

/// The three catalogs of one style.
#[derive(Debug)]
pub struct Catalog {
    style: Style,
    animated_values: Table,
    static_values: Table,
    functions: Table,
    masks: Table,
}

impl Catalog {
    /// Returns the process-wide catalog for `style`, building it on first use.
    pub fn get(style: Style) -> &'static Catalog {
        static POLLOCK: OnceLock<Catalog> = OnceLock::new();
        static BOUNCE: OnceLock<Catalog> = OnceLock::new();
        match style {
            Style::Pollock => POLLOCK.get_or_init(|| Catalog::build(style)),
            Style::Bounce => BOUNCE.get_or_init(|| Catalog::build(style)),
        }
    }

    fn build(style: Style) -> Self {
        let functions = match style {
            Style::Pollock => POLLOCK_FUNCTIONS,
            Style::Bounce => BOUNCE_FUNCTIONS,
        };
        Self {
            style,
            animated_values: Table::from_specs(ANIMATED_VALUES),
            static_values: Table::from_specs(STATIC_VALUES),
            functions: Table::from_specs(functions),
            masks: Table::from_specs(MASKS),
        }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Terminal values; the time channels are only present when `animate`.
    pub fn values(&self, animate: bool) -> &Table {
        if animate {
            &self.animated_values
        } else {
            &self.static_values
        }
    }

    pub fn functions(&self) -> &Table {
        &self.functions
    }

    pub fn masks(&self) -> &Table {
        &self.masks
    }

    /// Index of the identity mask (`rgb`) in the mask table.
    pub fn identity_mask(&self) -> Option<usize> {
        self.masks
            .entries()
            .iter()
            .position(|entry| entry.template.pattern() == IDENTITY_MASK)
    }

    /// Names of the helper functions the prelude must define for this style.
    pub fn referenced_functions(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .functions
            .entries()
            .iter()
            .chain(self.masks.entries())
            .flat_map(|entry| function_names(entry.template.pattern()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// The static helper-function definitions for `language`.
    pub fn prelude(&self, language: crate::ShadingLanguage) -> &'static str {
        prelude::source(self.style, language)
    }
}

/// Identifiers that are immediately followed by `(` in a template.
fn function_names(pattern: &'static str) -> impl Iterator<Item = &'static str> {
    pattern.match_indices('(').filter_map(move |(open, _)| {
        let head = &pattern[..open];
        let start = head
            .rfind(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .map(|index| index + 1)
            .unwrap_or(0);
        let name = &head[start..];
        (!name.is_empty()).then_some(name)
    })
}

struct PrimitiveSpec {
    pattern: &'static str,
    arity: usize,
    weight: u32,
}

const fn entry(pattern: &'static str, arity: usize) -> PrimitiveSpec {
    PrimitiveSpec {
        pattern,
        arity,
        weight: 1,
    }
}

const fn weighted(pattern: &'static str, arity: usize, weight: u32) -> PrimitiveSpec {
    PrimitiveSpec {
        pattern,
        arity,
        weight,
    }
}

/// Identity mask pattern: the base colour untouched.
pub const IDENTITY_MASK: &str = "rgb";

/// Name of the animated channel fed from uniform slot `x`.
pub const SIN_TIME: &str = "sinTime";
/// Name of the animated channel fed from uniform slot `y`.
pub const COS_TIME: &str = "cosTime";

const ANIMATED_VALUES: &[PrimitiveSpec] = &[
    entry("uv.x", 0),
    entry("uv.y", 0),
    entry("invX", 0),
    entry("invY", 0),
    entry(SIN_TIME, 0),
    entry(COS_TIME, 0),
    // A literal is twice as likely as any single named channel.
    weighted("#", 0, 2),
];

const STATIC_VALUES: &[PrimitiveSpec] = &[
    entry("uv.x", 0),
    entry("uv.y", 0),
    entry("invX", 0),
    entry("invY", 0),
    weighted("#", 0, 2),
];

const POLLOCK_FUNCTIONS: &[PrimitiveSpec] = &[
    entry("fInv(@)", 1),
    entry("fSqr(@)", 1),
    entry("fSqrt(@)", 1),
    entry("fSmooth(@)", 1),
    entry("fSharp(@)", 1),
    entry("fAdd(@, @)", 2),
    entry("fSub(@, @)", 2),
    entry("fMul(@, @)", 2),
    entry("fInv(fMul(@, @))", 2),
    entry("fDiv(@, @)", 2),
    entry("fAvg(@, @)", 2),
    entry("fGeom(@, @)", 2),
    entry("fHarm(@, @)", 2),
    entry("fHypo(@, @)", 2),
    entry("fMin(@, @)", 2),
    entry("fMax(@, @)", 2),
    entry("fPow(@, @)", 2),
    entry("fBell(@, @)", 2),
    entry("fInv(fBell(@, @))", 2),
    weighted("fWave(@, @)", 2, 2),
    entry("fWaveDamp(@, @)", 2),
    entry("fInv(fWaveDamp(@, @))", 2),
    entry("fLerp(@, @, @)", 3),
    entry("fSmoothLerp(@, @, @)", 3),
    entry("fMlerp(@, @, @)", 3),
    entry("fDist(@, @, @, @)", 4),
    entry("fDist(@, @, #, #)", 2),
    entry("fDist(uv.x, uv.y, @, @)", 2),
    entry("fDist(uv.x, uv.y, #, #)", 0),
    entry("fInv(fDist(@, @, @, @))", 4),
    entry("fInv(fDist(@, @, #, #))", 2),
    entry("fInv(fDist(uv.x, uv.y, @, @))", 2),
    entry("fInv(fDist(uv.x, uv.y, #, #))", 0),
    entry("fDistLine(@, @, @, @)", 4),
    entry("fDistLine(@, @, #, #)", 2),
    entry("fDistLine(uv.x, uv.y, @, @)", 2),
    entry("fDistLine(uv.x, uv.y, #, #)", 0),
    entry("fInv(fDistLine(@, @, @, @))", 4),
    entry("fInv(fDistLine(@, @, #, #))", 2),
    entry("fInv(fDistLine(uv.x, uv.y, @, @))", 2),
    entry("fInv(fDistLine(uv.x, uv.y, #, #))", 0),
];

const BOUNCE_FUNCTIONS: &[PrimitiveSpec] = &[
    entry("fInv(@)", 1),
    entry("fSqr(@)", 1),
    entry("fSqrt(@)", 1),
    entry("fSmooth(@)", 1),
    entry("fAdd(@, @)", 2),
    entry("fSub(@, @)", 2),
    entry("fMul(@, @)", 2),
    entry("fInv(fMul(@, @))", 2),
    entry("fDiv(@, @)", 2),
    entry("fAvg(@, @)", 2),
    entry("fGeom(@, @)", 2),
    entry("fHarm(@, @)", 2),
    entry("fHypo(@, @)", 2),
    entry("fMin(@, @)", 2),
    entry("fMax(@, @)", 2),
    entry("fPow(@, @)", 2),
    entry("fBell(@, @)", 2),
    entry("fInv(fBell(@, @))", 2),
    weighted("fWave(@, @)", 2, 2),
    entry("fBounce(@, @)", 2),
    entry("fInv(fBounce(@, @))", 2),
    entry("fLerp(@, @, @)", 3),
    entry("fSmoothLerp(@, @, @)", 3),
    entry("fMlerp(@, @, @)", 3),
    entry("fDist(@, @, @, @)", 4),
    entry("fDist(@, @, #, #)", 2),
    entry("fDist(uv.x, uv.y, @, @)", 2),
    entry("fDist(uv.x, uv.y, #, #)", 0),
    entry("fInv(fDist(@, @, @, @))", 4),
    entry("fInv(fDist(@, @, #, #))", 2),
    entry("fInv(fDist(uv.x, uv.y, @, @))", 2),
    entry("fInv(fDist(uv.x, uv.y, #, #))", 0),
    entry("fDistLine(@, @, @, @)", 4),
    entry("fDistLine(@, @, #, #)", 2),
    entry("fDistLine(uv.x, uv.y, @, @)", 2),
    entry("fDistLine(uv.x, uv.y, #, #)", 0),
    entry("fInv(fDistLine(@, @, @, @))", 4),
    entry("fInv(fDistLine(@, @, #, #))", 2),
    entry("fInv(fDistLine(uv.x, uv.y, @, @))", 2),
    entry("fInv(fDistLine(uv.x, uv.y, #, #))", 0),
];

const MASKS: &[PrimitiveSpec] = &[
    // No post-processing three times as often as any compound mask.
    weighted(IDENTITY_MASK, 0, 3),
    entry("fAdd3(rgb, @)", 1),
    entry("fSub3(rgb, @)", 1),
    entry("fAdd3(fSub3(rgb, @), @)", 2),
    entry("fSub3(fAdd3(rgb, @), @)", 2),
    entry("fInv3(fAdd3(rgb, @))", 1),
    entry("fInv3(fSub3(rgb, @))", 1),
    entry("fInv3(fAdd3(fSub3(rgb, @), @))", 2),
    entry("fInv3(fSub3(fAdd3(rgb, @), @))", 2),
];
