use std::path::PathBuf;
use std::time::Duration;

use artconfig::{WindowSize, MAX_FIXED_DEPTH};
use clap::{Args, Parser, Subcommand};
use shadergen::{ShadingLanguage, Style};

#[derive(Parser, Debug)]
#[command(
    name = "pollock",
    author,
    version,
    about = "Procedural shader art generator and previewer",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Configuration file; defaults to `config.toml` in the user config directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Seed for the first shader; later shaders are seeded from the clock.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Primitive catalog: `pollock` or `bounce`.
    #[arg(long, value_name = "STYLE", value_parser = parse_style)]
    pub style: Option<Style>,

    /// Leave the time channels out so shaders do not animate.
    #[arg(long = "static")]
    pub static_mode: bool,

    /// Window size in physical pixels (e.g. `1600x900`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<WindowSize>,

    /// Optional FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Regenerate automatically at this interval (e.g. `45s`, `2m`).
    #[arg(long, value_name = "DURATION", value_parser = parse_interval)]
    pub regenerate_every: Option<Duration>,
}

/// Options shared by the offline subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct GeneratorArgs {
    /// Seed to generate; defaults to the configured seed, then the clock.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Primitive catalog: `pollock` or `bounce`.
    #[arg(long, value_name = "STYLE", value_parser = parse_style)]
    pub style: Option<Style>,

    /// Leave the time channels out so the shader does not animate.
    #[arg(long = "static")]
    pub static_mode: bool,

    /// Fixed maximum expansion depth instead of a random one.
    #[arg(long, value_name = "DEPTH", value_parser = parse_depth)]
    pub depth: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print or write the source of one generated shader.
    Generate(GenerateArgs),
    /// Describe the structure of one generated shader.
    Inspect(InspectArgs),
    /// Generate many shaders and report mask and depth statistics.
    Survey(SurveyArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Output dialect: `glsl` or `hlsl`.
    #[arg(long, value_name = "LANGUAGE", value_parser = parse_language)]
    pub language: Option<ShadingLanguage>,

    /// Write the shader to this file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Print a JSON object instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SurveyArgs {
    /// Number of consecutive seeds to generate.
    #[arg(long, value_name = "N", default_value_t = 1000, value_parser = parse_samples)]
    pub samples: u64,

    /// First seed of the run.
    #[arg(long, value_name = "SEED", default_value_t = 0)]
    pub start: u64,

    /// Primitive catalog: `pollock` or `bounce`.
    #[arg(long, value_name = "STYLE", value_parser = parse_style)]
    pub style: Option<Style>,

    /// Fixed maximum expansion depth instead of a random one.
    #[arg(long, value_name = "DEPTH", value_parser = parse_depth)]
    pub depth: Option<u32>,

    /// Print a JSON object instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_style(value: &str) -> Result<Style, String> {
    value.parse::<Style>().map_err(|err| err.to_string())
}

pub fn parse_language(value: &str) -> Result<ShadingLanguage, String> {
    value
        .parse::<ShadingLanguage>()
        .map_err(|err| err.to_string())
}

pub fn parse_size(value: &str) -> Result<WindowSize, String> {
    value.parse::<WindowSize>()
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let trimmed = value.trim();
    let fps: f32 = trimmed
        .parse()
        .map_err(|_| format!("invalid FPS value '{trimmed}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err(format!("FPS must be a non-negative number, got '{trimmed}'"));
    }
    Ok(fps)
}

pub fn parse_interval(value: &str) -> Result<Duration, String> {
    let interval = artconfig::parse_duration(value).map_err(|err| err.to_string())?;
    if interval.is_zero() {
        return Err("regeneration interval must be greater than zero".to_string());
    }
    Ok(interval)
}

pub fn parse_depth(value: &str) -> Result<u32, String> {
    let trimmed = value.trim();
    let depth: u32 = trimmed
        .parse()
        .map_err(|_| format!("invalid depth '{trimmed}'"))?;
    if depth == 0 || depth > MAX_FIXED_DEPTH {
        return Err(format!(
            "depth must be between 1 and {MAX_FIXED_DEPTH}, got {depth}"
        ));
    }
    Ok(depth)
}

pub fn parse_samples(value: &str) -> Result<u64, String> {
    let trimmed = value.trim();
    match trimmed.parse::<u64>() {
        Ok(0) => Err("sample count must be at least 1".to_string()),
        Ok(samples) => Ok(samples),
        Err(_) => Err(format!("invalid sample count '{trimmed}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_styles_case_insensitively() {
        assert_eq!(parse_style("Bounce"), Ok(Style::Bounce));
        assert_eq!(parse_style(" pollock "), Ok(Style::Pollock));
        assert!(parse_style("cubist").is_err());
    }

    #[test]
    fn parses_languages() {
        assert_eq!(parse_language("HLSL"), Ok(ShadingLanguage::Hlsl));
        assert_eq!(parse_language("glsl"), Ok(ShadingLanguage::Glsl));
        assert!(parse_language("wgsl").is_err());
    }

    #[test]
    fn rejects_zero_sizes() {
        assert_eq!(
            parse_size("1600x900"),
            Ok(WindowSize {
                width: 1600,
                height: 900
            })
        );
        assert!(parse_size("0x900").is_err());
        assert!(parse_size("wide").is_err());
    }

    #[test]
    fn fps_allows_zero_but_not_negative() {
        assert_eq!(parse_fps("0"), Ok(0.0));
        assert_eq!(parse_fps("29.97"), Ok(29.97));
        assert!(parse_fps("-1").is_err());
        assert!(parse_fps("inf").is_err());
    }

    #[test]
    fn interval_must_be_positive() {
        assert_eq!(parse_interval("45s"), Ok(Duration::from_secs(45)));
        assert_eq!(parse_interval("2m 30s"), Ok(Duration::from_secs(150)));
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn depth_is_bounded() {
        assert_eq!(parse_depth("1"), Ok(1));
        assert_eq!(parse_depth("16"), Ok(16));
        assert!(parse_depth("0").is_err());
        assert!(parse_depth("17").is_err());
        assert!(parse_depth("32").is_err());
    }

    #[test]
    fn subcommand_flags_parse() {
        let cli = Cli::try_parse_from([
            "pollock",
            "generate",
            "--seed",
            "7",
            "--static",
            "--language",
            "hlsl",
            "--depth",
            "4",
        ])
        .expect("parse generate");
        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.generator.seed, Some(7));
                assert!(args.generator.static_mode);
                assert_eq!(args.generator.depth, Some(4));
                assert_eq!(args.language, Some(ShadingLanguage::Hlsl));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn window_flags_parse_without_subcommand() {
        let cli = Cli::try_parse_from([
            "pollock",
            "--seed",
            "420",
            "--size",
            "800x600",
            "--regenerate-every",
            "30s",
            "--config",
            "art.toml",
        ])
        .expect("parse window flags");
        assert!(cli.command.is_none());
        assert_eq!(cli.run.seed, Some(420));
        assert_eq!(cli.run.regenerate_every, Some(Duration::from_secs(30)));
        assert_eq!(cli.config, Some(PathBuf::from("art.toml")));
    }
}
