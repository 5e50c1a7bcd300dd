use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Largest fixed expansion depth accepted from configuration.
///
/// Tree size grows steeply with depth; past 16 one shader can run to megabytes.
pub const MAX_FIXED_DEPTH: u32 = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleSetting {
    #[default]
    Pollock,
    Bounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageSetting {
    #[default]
    Glsl,
    Hlsl,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArtConfig {
    pub version: u32,
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub window: WindowSection,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            version: 1,
            generator: GeneratorSection::default(),
            window: WindowSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeneratorSection {
    #[serde(default)]
    pub style: StyleSetting,
    #[serde(default = "default_animate")]
    pub animate: bool,
    #[serde(default)]
    pub language: LanguageSetting,
    /// Seed for the first shader; later shaders are seeded from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Pins the maximum expansion depth.
    #[serde(default)]
    pub depth: Option<u32>,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            style: StyleSetting::default(),
            animate: default_animate(),
            language: LanguageSetting::default(),
            seed: None,
            depth: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WindowSection {
    #[serde(default, deserialize_with = "deserialize_size_opt")]
    pub size: Option<WindowSize>,
    /// Frame cap; `0` or absent leaves presentation uncapped.
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub regenerate_every: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for WindowSize {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let (width, height) = normalized
            .split_once('x')
            .ok_or_else(|| format!("invalid window size '{raw}'; expected WIDTHxHEIGHT"))?;
        let width: u32 = width
            .trim()
            .parse()
            .map_err(|_| format!("invalid window width in '{raw}'"))?;
        let height: u32 = height
            .trim()
            .parse()
            .map_err(|_| format!("invalid window height in '{raw}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("window size '{raw}' must be non-zero"));
        }
        Ok(Self { width, height })
    }
}

fn default_animate() -> bool {
    true
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_size_opt<'de, D>(deserializer: D) -> Result<Option<WindowSize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Table { width: u32, height: u32 },
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(raw.parse::<WindowSize>().map_err(de::Error::custom)?),
        Some(Helper::Table { width, height }) => Some(WindowSize { width, height }),
    };
    Ok(result)
}

/// Parses a human-readable duration such as `45s` or `2m 30s`.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim())
        .map_err(|err| ConfigError::Invalid(format!("invalid duration '{raw}': {err}")))
}

impl ArtConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ArtConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn window_size(&self) -> WindowSize {
        self.window.size.unwrap_or_default()
    }

    /// Frame cap, with `0` meaning uncapped.
    pub fn fps_cap(&self) -> Option<f32> {
        self.window.fps.filter(|fps| *fps > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(depth) = self.generator.depth {
            if depth == 0 || depth > MAX_FIXED_DEPTH {
                return Err(ConfigError::Invalid(format!(
                    "generator.depth must be between 1 and {MAX_FIXED_DEPTH}, got {depth}"
                )));
            }
        }

        if let Some(fps) = self.window.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        if let Some(size) = self.window.size {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "window.size '{size}' must be non-zero"
                )));
            }
        }

        if let Some(interval) = self.window.regenerate_every {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "window.regenerate_every must be greater than zero".into(),
                ));
            }
        }

        Ok(())
    }
}
