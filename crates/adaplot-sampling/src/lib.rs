//! adaplot-sampling: adaptive curve sampling and polyline geometry (sans-IO).
//!
//! Turns a parametric curve `t -> (x, y)` into render-ready polylines:
//! adaptive evaluation -> optional simplification -> optional clipping.
//!
//! Alongside the pipeline the crate provides the geometry helpers a
//! plotting backend needs around it: stitching loose segments into
//! polylines ([`unify`]), collapsing near-duplicate points ([`clean`]),
//! Liang–Barsky clipping ([`clip`]) and splitting ellipses and lines into
//! points ([`split`]).
//!
//! Nothing here draws or touches the filesystem. Coordinates are plain
//! `f64` pairs, usually already in pixel space.

pub mod clean;
pub mod clip;
pub mod diagnostics;
pub mod evaluate;
pub mod simplify;
pub mod split;
pub mod types;
pub mod unify;

pub use clean::clean_polygon;
pub use clip::{clip_line, clip_polyline_to_rect};
pub use evaluate::{AdaptiveEvaluator, Components, ParametricCurve, RefinementStats};
pub use simplify::{simplify_polyline, simplify_polylines};
pub use split::{
    EllipseArc, EllipseSplit, split_ellipse_adaptive, split_ellipse_into_points,
    split_line_adaptive, split_line_into_points, split_polyline_adaptive,
};
pub use types::{
    CurveConfig, Line, NonFiniteSlopePolicy, Point, Polyline, Rect, Sample, SamplerConfig,
    SamplingError,
};
pub use unify::{UnifyOptions, unify_lines_to_polygons};

/// Sample a curve into a single polyline.
///
/// # Pipeline steps
///
/// 1. Validate `config`
/// 2. Adaptive evaluation over `[config.t_min, config.t_max]`
/// 3. Optional simplification (`config.simplify_max_angle_deg`)
///
/// `config.clip` is not applied here; use [`sample_curve_pieces`] for a
/// clipped result.
///
/// # Errors
///
/// Returns [`SamplingError::NonFiniteRange`] or
/// [`SamplingError::InvalidConfig`] if `config` does not validate.
pub fn sample_curve<C: ParametricCurve>(
    curve: C,
    config: &CurveConfig,
) -> Result<Polyline, SamplingError> {
    // 1. Validate.
    config.validate()?;

    // 2. Adaptive evaluation.
    let evaluator = AdaptiveEvaluator::with_config(curve, config.sampler.clone());
    let points = evaluator.evaluate(config.t_min, config.t_max);
    if points.is_empty() {
        return Err(SamplingError::EmptyResult);
    }

    // 3. Optional simplification.
    let points = match config.simplify_max_angle_deg {
        Some(angle) => simplify_polyline(&points, angle),
        None => points,
    };

    log::debug!(
        "sampled curve over [{}, {}] into {} points",
        config.t_min,
        config.t_max,
        points.len(),
    );
    Ok(Polyline::new(points))
}

/// Sample a curve and clip it to `config.clip`.
///
/// Runs [`sample_curve`], then splits the result wherever it leaves the
/// clipping rectangle. Without a clipping rectangle the result is the
/// single sampled polyline.
///
/// # Errors
///
/// Same as [`sample_curve`], plus [`SamplingError::EmptyResult`] if no
/// part of the curve is inside the clipping rectangle.
pub fn sample_curve_pieces<C: ParametricCurve>(
    curve: C,
    config: &CurveConfig,
) -> Result<Vec<Polyline>, SamplingError> {
    let polyline = sample_curve(curve, config)?;
    let Some(rect) = config.clip else {
        return Ok(vec![polyline]);
    };

    let pieces = clip_polyline_to_rect(polyline.points(), &rect);
    if pieces.is_empty() {
        return Err(SamplingError::EmptyResult);
    }
    log::debug!(
        "clipped {} points into {} visible pieces",
        polyline.len(),
        pieces.len(),
    );
    Ok(pieces)
}
