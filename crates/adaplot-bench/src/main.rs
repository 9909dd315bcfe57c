//! adaplot-bench: CLI tool for sampler parameter experimentation and diagnostics.
//!
//! Samples one of a set of built-in curves with configurable sampler
//! parameters, printing per-stage diagnostics. Useful for:
//!
//! - Seeing how slope tolerance and pixel spacing change the point count
//! - Checking how deep refinement goes near poles and jumps
//! - Measuring evaluation and simplification cost per curve
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin adaplot-bench -- [OPTIONS] <CURVE>
//! ```
//!
//! Set `RUST_LOG=debug` to see evaluator and pipeline log output.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::time::{Duration, Instant};

use adaplot_sampling::diagnostics::{Clock, SamplingDiagnostics, sample_curve_with_diagnostics};
use adaplot_sampling::simplify::DEFAULT_MAX_CONSECUTIVE_ANGLE_DEG;
use adaplot_sampling::{CurveConfig, EllipseArc, NonFiniteSlopePolicy, Point, SamplerConfig};
use clap::{Parser, ValueEnum};

/// Sampler parameter experimentation and diagnostics for adaplot.
///
/// Samples a built-in curve with configurable parameters and prints
/// per-stage timing, refinement and point-count diagnostics.
#[derive(Parser)]
#[command(name = "adaplot-bench", version)]
struct Cli {
    /// Built-in curve to sample.
    #[arg(value_enum)]
    curve: CurveKind,

    /// First curve parameter (defaults to the curve's natural range).
    #[arg(long, allow_hyphen_values = true)]
    t_min: Option<f64>,

    /// Last curve parameter (defaults to the curve's natural range).
    #[arg(long, allow_hyphen_values = true)]
    t_max: Option<f64>,

    /// Graph-to-pixel scale factor applied to both axes.
    #[arg(long, default_value_t = 100.0)]
    scale: f64,

    /// Number of evenly spaced initial intervals.
    #[arg(long, default_value_t = SamplerConfig::DEFAULT_MIN_SAMPLES, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    min_samples: u32,

    /// Maximum bisection depth per initial interval.
    #[arg(long, default_value_t = SamplerConfig::DEFAULT_MAX_REFINEMENT_DEGREE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(0..=u64::from(SamplerConfig::MAX_REFINEMENT_DEGREE_LIMIT)))]
    max_refinement_degree: u32,

    /// Slope-difference tolerance that triggers refinement.
    #[arg(long, default_value_t = SamplerConfig::DEFAULT_SLOPE_TOLERANCE)]
    slope_tolerance: f64,

    /// Maximum pixel distance between adjacent samples.
    #[arg(long, default_value_t = SamplerConfig::DEFAULT_MIN_PIXEL_PER_SAMPLE)]
    min_pixel_per_sample: f64,

    /// Seed for the midpoint jitter.
    #[arg(long, default_value_t = SamplerConfig::DEFAULT_JITTER_SEED)]
    seed: u64,

    /// Do not refine where the slope difference is infinite or NaN.
    #[arg(long)]
    ignore_non_finite_slopes: bool,

    /// Angle tolerance (degrees) for collinear point removal.
    #[arg(long, default_value_t = DEFAULT_MAX_CONSECUTIVE_ANGLE_DEG)]
    simplify_angle: f64,

    /// Skip collinear point removal.
    #[arg(long)]
    no_simplify: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Print the sampled points (tab-separated, one piece per block).
    #[arg(long)]
    points: bool,

    /// Full curve config as a JSON string.
    ///
    /// When provided, all other sampling parameter flags are ignored.
    /// The JSON must be a valid `CurveConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Built-in curve selection.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CurveKind {
    /// `y = sin(x)` over one period.
    Sine,
    /// Lissajous figure with frequency ratio 3:2.
    Lissajous,
    /// Archimedean spiral over three turns.
    Spiral,
    /// Rotated ellipse with semi-axes 2 and 1.
    Ellipse,
    /// `y = tan(x)`, crossing two poles.
    Tangent,
    /// Unit step at `x = 0`.
    Step,
}

impl CurveKind {
    /// Natural parameter range of the curve.
    const fn default_range(self) -> (f64, f64) {
        match self {
            Self::Sine | Self::Lissajous | Self::Ellipse => (0.0, std::f64::consts::TAU),
            Self::Spiral => (0.0, 3.0 * std::f64::consts::TAU),
            Self::Tangent => (-3.0, 3.0),
            Self::Step => (-1.0, 1.0),
        }
    }

    /// The curve in graph coordinates.
    fn function(self) -> Box<dyn Fn(f64) -> Point> {
        match self {
            Self::Sine => Box::new(|t| Point::new(t, t.sin())),
            Self::Lissajous => Box::new(|t| Point::new((3.0 * t).sin(), (2.0 * t).sin())),
            Self::Spiral => Box::new(|t| {
                let r = t / std::f64::consts::TAU;
                Point::new(r * t.cos(), r * t.sin())
            }),
            Self::Ellipse => {
                let arc = EllipseArc {
                    rotation_deg: 30.0,
                    ..EllipseArc::full(Point::ORIGIN, 2.0, 1.0)
                };
                Box::new(move |t| arc.point_at(t))
            }
            Self::Tangent => Box::new(|t| Point::new(t, t.tan())),
            Self::Step => Box::new(|t| Point::new(t, if t < 0.0 { 0.0 } else { 1.0 })),
        }
    }
}

/// Build a [`CurveConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<CurveConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let (default_min, default_max) = cli.curve.default_range();
    Ok(CurveConfig {
        t_min: cli.t_min.unwrap_or(default_min),
        t_max: cli.t_max.unwrap_or(default_max),
        sampler: SamplerConfig {
            min_samples: cli.min_samples,
            max_refinement_degree: cli.max_refinement_degree,
            slope_tolerance: cli.slope_tolerance,
            min_pixel_per_sample: cli.min_pixel_per_sample,
            non_finite_slopes: if cli.ignore_non_finite_slopes {
                NonFiniteSlopePolicy::Ignore
            } else {
                NonFiniteSlopePolicy::Refine
            },
            jitter_seed: cli.seed,
        },
        simplify_max_angle_deg: (!cli.no_simplify).then_some(cli.simplify_angle),
        ..CurveConfig::default()
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let function = cli.curve.function();
    let scale = cli.scale;
    let curve = |t: f64| {
        let p = function(t);
        Point::new(p.x * scale, p.y * scale)
    };

    eprintln!("Curve: {:?} (scale {scale})", cli.curve);
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();
    log::info!("sampling {:?} over [{}, {}]", cli.curve, config.t_min, config.t_max);

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match sample_curve_with_diagnostics(&curve, &config, &StdClock) {
            Ok((pieces, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Print points on the first run only.
                if run == 0 && cli.points {
                    for piece in &pieces {
                        println!();
                        for p in piece.points() {
                            println!("{}\t{}", p.x, p.y);
                        }
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Sampling error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&SamplingDiagnostics) -> Option<Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[SamplingDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<16} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(32));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Evaluate", |d| Some(d.evaluate.duration)),
        ("Simplify", |d| d.simplify.as_ref().map(|s| s.duration)),
        ("Clip", |d| d.clip.as_ref().map(|s| s.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<16} {stage_mean:>10.3}ms");
    }

    let points = all_diagnostics
        .first()
        .map_or(0, |d| d.summary.final_point_count);
    println!();
    println!("Final points per run: {points}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_build_default_sampler() {
        let cli = Cli::try_parse_from(["adaplot-bench", "sine"]).unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.sampler, SamplerConfig::default());
        assert!((config.t_max - std::f64::consts::TAU).abs() < f64::EPSILON);
        assert_eq!(
            config.simplify_max_angle_deg,
            Some(DEFAULT_MAX_CONSECUTIVE_ANGLE_DEG)
        );
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "adaplot-bench",
            "tangent",
            "--t-min",
            "-1.5",
            "--min-samples",
            "20",
            "--ignore-non-finite-slopes",
            "--no-simplify",
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert!((config.t_min + 1.5).abs() < f64::EPSILON);
        assert!((config.t_max - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.sampler.min_samples, 20);
        assert_eq!(config.sampler.non_finite_slopes, NonFiniteSlopePolicy::Ignore);
        assert_eq!(config.simplify_max_angle_deg, None);
    }

    #[test]
    fn cli_rejects_zero_min_samples() {
        assert!(Cli::try_parse_from(["adaplot-bench", "sine", "--min-samples", "0"]).is_err());
    }

    #[test]
    fn config_json_replaces_flags() {
        let cli = Cli::try_parse_from([
            "adaplot-bench",
            "step",
            "--min-samples",
            "50",
            "--config-json",
            r#"{"t_min": 2.0, "t_max": 4.0, "clip": {"left": 0, "top": 0, "right": 10, "bottom": 10}}"#,
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert!((config.t_min - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.sampler.min_samples, SamplerConfig::DEFAULT_MIN_SAMPLES);
        assert!(config.clip.is_some());
    }

    #[test]
    fn bad_config_json_is_reported() {
        let cli =
            Cli::try_parse_from(["adaplot-bench", "sine", "--config-json", "{not json"]).unwrap();
        assert!(config_from_cli(&cli).is_err());
    }

    #[test]
    fn every_builtin_curve_samples() {
        for kind in CurveKind::value_variants() {
            let (t_min, t_max) = kind.default_range();
            let config = CurveConfig {
                t_min,
                t_max,
                ..CurveConfig::default()
            };
            let function = kind.function();
            let curve = |t: f64| {
                let p = function(t);
                Point::new(p.x * 100.0, p.y * 100.0)
            };
            let (pieces, diagnostics) =
                sample_curve_with_diagnostics(&curve, &config, &StdClock).unwrap();
            assert_eq!(pieces.len(), 1, "{kind:?}");
            assert!(diagnostics.summary.final_point_count >= 2, "{kind:?}");
        }
    }
}
