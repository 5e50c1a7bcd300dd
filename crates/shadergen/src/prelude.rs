//! Static helper-function definitions that every generated shader starts with.
//!
//! All helpers map inputs in `[0, 1]` back into `[0, 1]`, so arbitrary nesting
//! stays in range. The text is assembled once per (style, language) pair and
//! never modified afterwards.

use std::sync::OnceLock;

use crate::catalog::Style;
use crate::ShadingLanguage;

/// Returns the prelude for a style in the requested shading language.
pub fn source(style: Style, language: ShadingLanguage) -> &'static str {
    static POLLOCK_HLSL: OnceLock<String> = OnceLock::new();
    static POLLOCK_GLSL: OnceLock<String> = OnceLock::new();
    static BOUNCE_HLSL: OnceLock<String> = OnceLock::new();
    static BOUNCE_GLSL: OnceLock<String> = OnceLock::new();

    let (cell, parts) = match (style, language) {
        (Style::Pollock, ShadingLanguage::Hlsl) => (&POLLOCK_HLSL, POLLOCK_HLSL_PARTS),
        (Style::Pollock, ShadingLanguage::Glsl) => (&POLLOCK_GLSL, POLLOCK_GLSL_PARTS),
        (Style::Bounce, ShadingLanguage::Hlsl) => (&BOUNCE_HLSL, BOUNCE_HLSL_PARTS),
        (Style::Bounce, ShadingLanguage::Glsl) => (&BOUNCE_GLSL, BOUNCE_GLSL_PARTS),
    };
    cell.get_or_init(|| parts.concat()).as_str()
}

const POLLOCK_HLSL_PARTS: &[&str] = &[
    HLSL_ONE_INPUT,
    HLSL_SHARP,
    HLSL_TWO_INPUT,
    HLSL_POW_POLLOCK,
    HLSL_BELL_WAVE,
    HLSL_WAVE_DAMP,
    HLSL_MANY_INPUT,
    HLSL_MASKS,
];

const POLLOCK_GLSL_PARTS: &[&str] = &[
    GLSL_ONE_INPUT,
    GLSL_SHARP,
    GLSL_TWO_INPUT,
    GLSL_POW_POLLOCK,
    GLSL_BELL_WAVE,
    GLSL_WAVE_DAMP,
    GLSL_MANY_INPUT,
    GLSL_MASKS,
];

const BOUNCE_HLSL_PARTS: &[&str] = &[
    HLSL_ONE_INPUT,
    HLSL_TWO_INPUT,
    HLSL_POW_BOUNCE,
    HLSL_BELL_WAVE,
    HLSL_BOUNCE,
    HLSL_MANY_INPUT,
    HLSL_MASKS,
];

const BOUNCE_GLSL_PARTS: &[&str] = &[
    GLSL_ONE_INPUT,
    GLSL_TWO_INPUT,
    GLSL_POW_BOUNCE,
    GLSL_BELL_WAVE,
    GLSL_BOUNCE,
    GLSL_MANY_INPUT,
    GLSL_MASKS,
];

const HLSL_ONE_INPUT: &str = r"
float fInv(float x)
{
    return 1.0f - x;
}

float fSqr(float x)
{
    return x * x;
}

float fSqrt(float x)
{
    return sqrt(x);
}

float fSmooth(float x)
{
    float x2 = x * x;
    float x3 = x2 * x;
    return x2 + x2 + x2 - x3 - x3;
}
";

const HLSL_SHARP: &str = r"
float fSharp(float x)
{
    return x * (x * (x + x - 3.0f) + 2.0f);
}
";

const HLSL_TWO_INPUT: &str = r"
float fAdd(float x, float y)
{
    float res = x + y;
    if (res > 1.0f)
        return 2.0f - res;
    return res;
}

float fSub(float x, float y)
{
    float res = x - y;
    if (res < 0.0f)
        return -res;
    return res;
}

float fMul(float x, float y)
{
    return x * y;
}

float fDiv(float x, float y)
{
    float lo = x, hi = y;
    if (x > y)
    {
        lo = y;
        hi = x;
    }
    if (hi < 0.0001f)
        hi = 0.0001f;
    return lo / hi;
}

float fAvg(float x, float y)
{
    return (x + y) * 0.5f;
}

float fGeom(float x, float y)
{
    return sqrt(x * y);
}

float fHarm(float x, float y)
{
    float den = x + y;
    if (den < 0.0001f)
        den = 0.0001f;
    return (2.0f * x * y) / den;
}

float fHypo(float x, float y)
{
    return 0.70710678f * sqrt(x * x + y * y);
}

float fMin(float x, float y)
{
    return x < y ? x : y;
}

float fMax(float x, float y)
{
    return x > y ? x : y;
}
";

const HLSL_POW_POLLOCK: &str = r"
float fPow(float x, float y)
{
    float base = clamp(x, 0.01f, 0.99f);
    return pow(base, exp2(4.0f * y - 2.0f));
}
";

const HLSL_POW_BOUNCE: &str = r"
float fPow(float x, float y)
{
    float base = clamp(x, 0.01f, 0.99f);
    return pow(base, exp2(6.0f * y - 3.0f));
}
";

const HLSL_BELL_WAVE: &str = r"
float fBell(float x, float y)
{
    float base = clamp(x, 0.01f, 0.99f);
    float y2 = y * y;
    return pow(4.0f * base * (1.0f - base), 20.0f * y2 * y2 + 0.3f);
}

float fWave(float x, float y)
{
    return 0.5f + 0.5f * cos(6.0f * 3.1415927f * x * y);
}
";

const HLSL_WAVE_DAMP: &str = r"
float fWaveDamp(float x, float y)
{
    float osc = ldexp(cos(3.0f * 3.1415927f * x * (y + 1.0f / 6.0f)), -x * x);
    return osc * osc;
}
";

const HLSL_BOUNCE: &str = r"
float fBounce(float x, float y)
{
    float freq = 3.1415927f * (1.0f + 4.0f * y);
    return abs(cos(freq * x)) * (1.0f - 0.5f * x);
}
";

const HLSL_MANY_INPUT: &str = r"
float fLerp(float x, float y, float z)
{
    return (1.0f - z) * x + z * y;
}

float fSmoothLerp(float x, float y, float z)
{
    float z2 = z * z;
    float z3 = z2 * z;
    float s = z2 + z2 + z2 - z3 - z3;
    return s * (y - x) + x;
}

float fMlerp(float x, float y, float z)
{
    float a = max(x, 0.0001f);
    float b = max(y, 0.0001f);
    return a * pow(b / a, z);
}

float fDist(float x, float y, float z, float w)
{
    float dx = x - z;
    float dy = y - w;
    return 0.70710678f * sqrt(dx * dx + dy * dy);
}

float fDistLine(float x, float y, float z, float w)
{
    if (z < 0.499f)
    {
        float m = tan(z * 3.1415927f);
        float n = (1.0f - w) * (1.0f + m) - m;
        float c = (x + y * m - m * n) / (m * m + 1.0f);
        float dx = c - x;
        float dy = m * c + n - y;
        return 0.70710678f * sqrt(dx * dx + dy * dy);
    }
    if (z > 0.501f)
    {
        float m = tan(z * 3.1415927f);
        float n = w - m * w;
        float c = (x + y * m - m * n) / (m * m + 1.0f);
        float dx = c - x;
        float dy = m * c + n - y;
        return 0.70710678f * sqrt(dx * dx + dy * dy);
    }
    return 0.70710678f * abs(w - x);
}
";

const HLSL_MASKS: &str = r"
float3 fInv3(float3 v)
{
    return float3(1.0f, 1.0f, 1.0f) - v;
}

float3 fAdd3(float3 v, float x)
{
    float3 res = v + float3(x, x, x);
    return lerp(res, 2.0f - res, step(1.0f, res));
}

float3 fSub3(float3 v, float x)
{
    float3 res = v - float3(x, x, x);
    return lerp(-res, res, step(0.0f, res));
}
";

const GLSL_ONE_INPUT: &str = r"
float fInv(float x)
{
    return 1.0 - x;
}

float fSqr(float x)
{
    return x * x;
}

float fSqrt(float x)
{
    return sqrt(x);
}

float fSmooth(float x)
{
    float x2 = x * x;
    float x3 = x2 * x;
    return x2 + x2 + x2 - x3 - x3;
}
";

const GLSL_SHARP: &str = r"
float fSharp(float x)
{
    return x * (x * (x + x - 3.0) + 2.0);
}
";

const GLSL_TWO_INPUT: &str = r"
float fAdd(float x, float y)
{
    float res = x + y;
    return res > 1.0 ? 2.0 - res : res;
}

float fSub(float x, float y)
{
    return abs(x - y);
}

float fMul(float x, float y)
{
    return x * y;
}

float fDiv(float x, float y)
{
    float lo = min(x, y);
    float hi = max(max(x, y), 0.0001);
    return lo / hi;
}

float fAvg(float x, float y)
{
    return (x + y) * 0.5;
}

float fGeom(float x, float y)
{
    return sqrt(x * y);
}

float fHarm(float x, float y)
{
    float den = max(x + y, 0.0001);
    return (2.0 * x * y) / den;
}

float fHypo(float x, float y)
{
    return 0.70710678 * sqrt(x * x + y * y);
}

float fMin(float x, float y)
{
    return min(x, y);
}

float fMax(float x, float y)
{
    return max(x, y);
}
";

const GLSL_POW_POLLOCK: &str = r"
float fPow(float x, float y)
{
    float base = clamp(x, 0.01, 0.99);
    return pow(base, exp2(4.0 * y - 2.0));
}
";

const GLSL_POW_BOUNCE: &str = r"
float fPow(float x, float y)
{
    float base = clamp(x, 0.01, 0.99);
    return pow(base, exp2(6.0 * y - 3.0));
}
";

const GLSL_BELL_WAVE: &str = r"
float fBell(float x, float y)
{
    float base = clamp(x, 0.01, 0.99);
    float y2 = y * y;
    return pow(4.0 * base * (1.0 - base), 20.0 * y2 * y2 + 0.3);
}

float fWave(float x, float y)
{
    return 0.5 + 0.5 * cos(6.0 * 3.1415927 * x * y);
}
";

const GLSL_WAVE_DAMP: &str = r"
float fWaveDamp(float x, float y)
{
    float osc = cos(3.0 * 3.1415927 * x * (y + 1.0 / 6.0)) * exp2(-x * x);
    return osc * osc;
}
";

const GLSL_BOUNCE: &str = r"
float fBounce(float x, float y)
{
    float freq = 3.1415927 * (1.0 + 4.0 * y);
    return abs(cos(freq * x)) * (1.0 - 0.5 * x);
}
";

const GLSL_MANY_INPUT: &str = r"
float fLerp(float x, float y, float z)
{
    return (1.0 - z) * x + z * y;
}

float fSmoothLerp(float x, float y, float z)
{
    float z2 = z * z;
    float z3 = z2 * z;
    float s = z2 + z2 + z2 - z3 - z3;
    return s * (y - x) + x;
}

float fMlerp(float x, float y, float z)
{
    float a = max(x, 0.0001);
    float b = max(y, 0.0001);
    return a * pow(b / a, z);
}

float fDist(float x, float y, float z, float w)
{
    float dx = x - z;
    float dy = y - w;
    return 0.70710678 * sqrt(dx * dx + dy * dy);
}

float fDistLine(float x, float y, float z, float w)
{
    if (z < 0.499)
    {
        float m = tan(z * 3.1415927);
        float n = (1.0 - w) * (1.0 + m) - m;
        float c = (x + y * m - m * n) / (m * m + 1.0);
        float dx = c - x;
        float dy = m * c + n - y;
        return 0.70710678 * sqrt(dx * dx + dy * dy);
    }
    if (z > 0.501)
    {
        float m = tan(z * 3.1415927);
        float n = w - m * w;
        float c = (x + y * m - m * n) / (m * m + 1.0);
        float dx = c - x;
        float dy = m * c + n - y;
        return 0.70710678 * sqrt(dx * dx + dy * dy);
    }
    return 0.70710678 * abs(w - x);
}
";

const GLSL_MASKS: &str = r"
vec3 fInv3(vec3 v)
{
    return vec3(1.0) - v;
}

vec3 fAdd3(vec3 v, float x)
{
    vec3 res = v + vec3(x);
    return mix(res, vec3(2.0) - res, step(vec3(1.0), res));
}

vec3 fSub3(vec3 v, float x)
{
    vec3 res = v - vec3(x);
    return mix(-res, res, step(vec3(0.0), res));
}
";
