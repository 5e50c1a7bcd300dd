use artconfig::{ArtConfig, LanguageSetting, StyleSetting};
use shadergen::{DepthPolicy, GeneratorSettings, ShadingLanguage, Style};

use crate::cli::GeneratorArgs;

pub fn style_from(setting: StyleSetting) -> Style {
    match setting {
        StyleSetting::Pollock => Style::Pollock,
        StyleSetting::Bounce => Style::Bounce,
    }
}

pub fn language_from(setting: LanguageSetting) -> ShadingLanguage {
    match setting {
        LanguageSetting::Glsl => ShadingLanguage::Glsl,
        LanguageSetting::Hlsl => ShadingLanguage::Hlsl,
    }
}

/// Merges command-line overrides over the `[generator]` section.
///
/// `--static` can only switch animation off; the config decides otherwise.
pub fn generator_settings(config: &ArtConfig, overrides: &GeneratorArgs) -> GeneratorSettings {
    let section = &config.generator;
    let depth = match overrides.depth.or(section.depth) {
        Some(depth) => DepthPolicy::Fixed(depth),
        None => DepthPolicy::default(),
    };
    GeneratorSettings {
        style: overrides
            .style
            .unwrap_or_else(|| style_from(section.style)),
        animate: section.animate && !overrides.static_mode,
        language: language_from(section.language),
        depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_animated_glsl_with_random_depth() {
        let settings = generator_settings(&ArtConfig::default(), &GeneratorArgs::default());
        assert_eq!(settings, GeneratorSettings::animated());
    }

    #[test]
    fn flags_override_config() {
        let mut config = ArtConfig::default();
        config.generator.style = StyleSetting::Bounce;
        config.generator.depth = Some(9);
        config.generator.language = LanguageSetting::Hlsl;

        let from_config = generator_settings(&config, &GeneratorArgs::default());
        assert_eq!(from_config.style, Style::Bounce);
        assert_eq!(from_config.depth, DepthPolicy::Fixed(9));
        assert_eq!(from_config.language, ShadingLanguage::Hlsl);
        assert!(from_config.animate);

        let overrides = GeneratorArgs {
            style: Some(Style::Pollock),
            static_mode: true,
            depth: Some(4),
            ..GeneratorArgs::default()
        };
        let merged = generator_settings(&config, &overrides);
        assert_eq!(merged.style, Style::Pollock);
        assert_eq!(merged.depth, DepthPolicy::Fixed(4));
        assert!(!merged.animate);
    }

    #[test]
    fn static_config_stays_static() {
        let mut config = ArtConfig::default();
        config.generator.animate = false;
        let settings = generator_settings(&config, &GeneratorArgs::default());
        assert!(!settings.animate);
    }
}
