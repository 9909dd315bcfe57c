//! Sampling diagnostics: timing, counts, and refinement metrics per stage.
//!
//! [`sample_curve_with_diagnostics`] runs the same stages as
//! [`sample_curve_pieces`](crate::sample_curve_pieces) and records how
//! long each took and what it did. Useful for tuning sampler parameters
//! against real curves.
//!
//! Time is read through the [`Clock`] trait so the library never touches
//! a platform clock itself; the caller passes one in.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clip::clip_polyline_to_rect;
use crate::evaluate::{AdaptiveEvaluator, ParametricCurve};
use crate::simplify::simplify_polyline;
use crate::types::{CurveConfig, Polyline, Rect, SamplingError};

/// Source of timestamps for stage measurements.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single sampling run.
///
/// Stages that were skipped by the configuration are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingDiagnostics {
    /// Adaptive evaluation.
    pub evaluate: StageDiagnostics,
    /// Collinear point removal (only when `simplify_max_angle_deg` is set).
    pub simplify: Option<StageDiagnostics>,
    /// Rectangle clipping (only when `clip` is set).
    pub clip: Option<StageDiagnostics>,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: SamplingSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Adaptive evaluation metrics.
    Evaluate {
        /// First curve parameter.
        t_min: f64,
        /// Last curve parameter.
        t_max: f64,
        /// Number of evenly spaced initial intervals.
        min_samples: u32,
        /// Curve evaluations, seeds and probes included.
        evaluations: usize,
        /// Probed midpoints that were kept.
        refinements: usize,
        /// Deepest refinement level reached.
        max_depth: u32,
        /// Points returned by the evaluator.
        point_count: usize,
    },
    /// Simplification metrics.
    Simplify {
        /// Angle tolerance in degrees.
        max_angle_deg: f64,
        /// Points before simplification.
        points_before: usize,
        /// Points after simplification.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
    /// Clipping metrics.
    Clip {
        /// Clipping rectangle.
        rect: Rect,
        /// Points before clipping.
        points_before: usize,
        /// Number of visible pieces.
        pieces: usize,
        /// Total points across the visible pieces.
        points_after: usize,
    },
}

/// High-level summary counts for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingSummary {
    /// Curve evaluations.
    pub evaluations: usize,
    /// Number of output polylines.
    pub piece_count: usize,
    /// Total points across the output polylines.
    pub final_point_count: usize,
}

impl SamplingDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Sampling Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages = vec![("Evaluate", &self.evaluate)];
        if let Some(ref s) = self.simplify {
            stages.push(("Simplify", s));
        }
        if let Some(ref c) = self.clip {
            stages.push(("Clip", c));
        }

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Evaluations: {}  |  Pieces: {}  |  Final points: {}",
            self.summary.evaluations, self.summary.piece_count, self.summary.final_point_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Evaluate {
            t_min,
            t_max,
            min_samples,
            evaluations,
            refinements,
            max_depth,
            point_count,
        } => {
            format!(
                "t=[{t_min:.3}, {t_max:.3}] seeds={min_samples} evals={evaluations} refined={refinements} depth={max_depth} -> {point_count} pts",
            )
        }
        StageMetrics::Simplify {
            max_angle_deg,
            points_before,
            points_after,
            reduction_ratio,
        } => {
            format!(
                "angle={max_angle_deg:.2}deg {points_before}->{points_after} pts ({:.1}% reduction)",
                reduction_ratio * 100.0,
            )
        }
        StageMetrics::Clip {
            rect,
            points_before,
            pieces,
            points_after,
        } => {
            format!(
                "rect=[{:.1}, {:.1}]x[{:.1}, {:.1}] {points_before}->{points_after} pts in {pieces} pieces",
                rect.min_x(),
                rect.max_x(),
                rect.min_y(),
                rect.max_y(),
            )
        }
    }
}

/// `1.0 - after / before`, or 0 for empty input.
#[allow(clippy::cast_precision_loss)]
fn reduction_ratio(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        1.0 - after as f64 / before as f64
    }
}

/// Total points across a slice of polylines.
fn total_points(polylines: &[Polyline]) -> usize {
    polylines.iter().map(Polyline::len).sum()
}

/// Run [`sample_curve_pieces`](crate::sample_curve_pieces) and record
/// per-stage diagnostics.
///
/// # Errors
///
/// Same as [`sample_curve_pieces`](crate::sample_curve_pieces).
pub fn sample_curve_with_diagnostics<C, K>(
    curve: C,
    config: &CurveConfig,
    clock: &K,
) -> Result<(Vec<Polyline>, SamplingDiagnostics), SamplingError>
where
    C: ParametricCurve,
    K: Clock,
{
    config.validate()?;
    let total_start = clock.now();

    // 1. Adaptive evaluation.
    let start = clock.now();
    let evaluator = AdaptiveEvaluator::with_config(curve, config.sampler.clone());
    let (samples, stats) = evaluator.evaluate_with_stats(config.t_min, config.t_max);
    let points: Vec<_> = samples.into_iter().map(|s| s.point).collect();
    let evaluate = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Evaluate {
            t_min: config.t_min,
            t_max: config.t_max,
            min_samples: config.sampler.min_samples,
            evaluations: stats.evaluations,
            refinements: stats.refinements,
            max_depth: stats.max_depth,
            point_count: points.len(),
        },
    };
    if points.is_empty() {
        return Err(SamplingError::EmptyResult);
    }

    // 2. Optional simplification.
    let (points, simplify) = match config.simplify_max_angle_deg {
        Some(max_angle_deg) => {
            let start = clock.now();
            let points_before = points.len();
            let simplified = simplify_polyline(&points, max_angle_deg);
            let diag = StageDiagnostics {
                duration: clock.elapsed(&start),
                metrics: StageMetrics::Simplify {
                    max_angle_deg,
                    points_before,
                    points_after: simplified.len(),
                    reduction_ratio: reduction_ratio(points_before, simplified.len()),
                },
            };
            (simplified, Some(diag))
        }
        None => (points, None),
    };

    // 3. Optional clipping.
    let (pieces, clip) = match config.clip {
        Some(rect) => {
            let start = clock.now();
            let pieces = clip_polyline_to_rect(&points, &rect);
            let diag = StageDiagnostics {
                duration: clock.elapsed(&start),
                metrics: StageMetrics::Clip {
                    rect,
                    points_before: points.len(),
                    pieces: pieces.len(),
                    points_after: total_points(&pieces),
                },
            };
            (pieces, Some(diag))
        }
        None => (vec![Polyline::new(points)], None),
    };
    if pieces.is_empty() {
        return Err(SamplingError::EmptyResult);
    }

    let diagnostics = SamplingDiagnostics {
        evaluate,
        simplify,
        clip,
        total_duration: clock.elapsed(&total_start),
        summary: SamplingSummary {
            evaluations: stats.evaluations,
            piece_count: pieces.len(),
            final_point_count: total_points(&pieces),
        },
    };
    Ok((pieces, diagnostics))
}
