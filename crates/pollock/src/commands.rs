use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use shadergen::{DepthPolicy, GeneratedShader, Generator, GeneratorSettings, ShadingLanguage};

use crate::cli::{GenerateArgs, GeneratorArgs, InspectArgs, SurveyArgs};
use crate::paths::load_config;
use crate::settings::{generator_settings, style_from};

/// Resolves the seed for one offline shader: flag, then config, then clock.
fn pick_seed(flag: Option<u64>, configured: Option<u64>) -> u64 {
    flag.or(configured)
        .unwrap_or_else(renderer::runtime::seed_from_clock)
}

fn generate_one(
    args: &GeneratorArgs,
    language: Option<ShadingLanguage>,
    config_path: Option<&Path>,
) -> Result<(GeneratorSettings, GeneratedShader)> {
    let config = load_config(config_path)?;
    let mut settings = generator_settings(&config, args);
    if let Some(language) = language {
        settings.language = language;
    }
    let seed = pick_seed(args.seed, config.generator.seed);
    Ok((settings, Generator::new(settings).generate(seed)))
}

pub fn generate(args: GenerateArgs, config_path: Option<&Path>) -> Result<()> {
    let (settings, shader) = generate_one(&args.generator, args.language, config_path)?;
    tracing::info!(
        seed = shader.seed,
        max_depth = shader.max_depth,
        mask = shader.mask,
        language = %settings.language,
        "generated shader"
    );

    match args.output {
        Some(path) => {
            fs::write(&path, &shader.source)
                .with_context(|| format!("failed to write shader to {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote shader");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(shader.source.as_bytes())
                .context("failed to write shader to stdout")?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Inspection<'a> {
    seed: u64,
    style: &'static str,
    animate: bool,
    max_depth: u32,
    mask: &'a str,
    nodes: usize,
    call_depth: u32,
    source_bytes: usize,
}

pub fn inspect(args: InspectArgs, config_path: Option<&Path>) -> Result<()> {
    let (settings, shader) = generate_one(&args.generator, None, config_path)?;
    let report = Inspection {
        seed: shader.seed,
        style: settings.style.name(),
        animate: settings.animate,
        max_depth: shader.max_depth,
        mask: shader.mask,
        nodes: shader.tree.node_count(),
        call_depth: shader.tree.call_depth(),
        source_bytes: shader.source.len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("seed:         {}", report.seed);
    println!("style:        {}", report.style);
    println!("animate:      {}", report.animate);
    println!("max_depth:    {}", report.max_depth);
    println!("mask:         {}", report.mask);
    println!("nodes:        {}", report.nodes);
    println!("call_depth:   {}", report.call_depth);
    println!("source_bytes: {}", report.source_bytes);
    Ok(())
}

#[derive(Debug, Default, Serialize)]
pub struct SurveyReport {
    pub samples: u64,
    pub start: u64,
    pub style: String,
    /// Mask pattern to number of shaders that used it.
    pub masks: BTreeMap<String, u64>,
    /// Max depth to number of shaders drawn at it.
    pub max_depths: BTreeMap<u32, u64>,
    pub mean_nodes: f64,
}

impl SurveyReport {
    /// Masks ordered from most to least frequent, ties by pattern.
    pub fn masks_by_frequency(&self) -> Vec<(&str, u64)> {
        let mut masks: Vec<(&str, u64)> = self
            .masks
            .iter()
            .map(|(mask, count)| (mask.as_str(), *count))
            .collect();
        masks.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        masks
    }
}

pub fn run_survey(generator: &Generator, start: u64, samples: u64) -> SurveyReport {
    let mut report = SurveyReport {
        samples,
        start,
        style: generator.settings().style.name().to_string(),
        ..SurveyReport::default()
    };
    let mut total_nodes = 0u64;
    for offset in 0..samples {
        let shader = generator.generate(start.wrapping_add(offset));
        *report.masks.entry(shader.mask.to_string()).or_default() += 1;
        *report.max_depths.entry(shader.max_depth).or_default() += 1;
        total_nodes += shader.tree.node_count() as u64;
    }
    if samples > 0 {
        report.mean_nodes = total_nodes as f64 / samples as f64;
    }
    report
}

pub fn survey(args: SurveyArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let depth = match args.depth.or(config.generator.depth) {
        Some(depth) => DepthPolicy::Fixed(depth),
        None => DepthPolicy::default(),
    };
    let settings = GeneratorSettings {
        style: args
            .style
            .unwrap_or_else(|| style_from(config.generator.style)),
        animate: config.generator.animate,
        depth,
        ..GeneratorSettings::default()
    };
    let generator = Generator::new(settings);
    tracing::info!(
        samples = args.samples,
        start = args.start,
        style = %settings.style,
        "surveying shaders"
    );
    let report = run_survey(&generator, args.start, args.samples);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let samples = report.samples.max(1) as f64;
    println!(
        "{} shaders from seed {} ({} style), mean {:.1} nodes",
        report.samples, report.start, report.style, report.mean_nodes
    );
    println!("masks:");
    for (mask, count) in report.masks_by_frequency() {
        println!(
            "  {:>6}  {:>5.1}%  {mask}",
            count,
            100.0 * count as f64 / samples
        );
    }
    println!("max depth:");
    for (depth, count) in &report.max_depths {
        println!(
            "  {depth:>3}  {:>6}  {:>5.1}%",
            count,
            100.0 * *count as f64 / samples
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadergen::catalog::IDENTITY_MASK;

    #[test]
    fn explicit_seed_wins_over_config() {
        assert_eq!(pick_seed(Some(5), Some(9)), 5);
        assert_eq!(pick_seed(None, Some(9)), 9);
    }

    #[test]
    fn survey_counts_every_sample() {
        let report = run_survey(&Generator::default(), 0, 200);
        assert_eq!(report.masks.values().sum::<u64>(), 200);
        assert_eq!(report.max_depths.values().sum::<u64>(), 200);
        assert!(report.max_depths.keys().all(|depth| (6..=14).contains(depth)));
        assert!(report.mean_nodes > 0.0);
    }

    #[test]
    fn identity_mask_leads_the_survey() {
        let report = run_survey(&Generator::default(), 1_000, 400);
        let ranked = report.masks_by_frequency();
        assert_eq!(ranked.first().map(|(mask, _)| *mask), Some(IDENTITY_MASK));
    }

    #[test]
    fn fixed_depth_survey_has_one_bucket() {
        let generator = Generator::new(GeneratorSettings {
            depth: DepthPolicy::Fixed(4),
            ..GeneratorSettings::default()
        });
        let report = run_survey(&generator, 0, 50);
        assert_eq!(report.max_depths.len(), 1);
        assert_eq!(report.max_depths.get(&4), Some(&50));
    }
}
