//! Shared types for adaplot: geometry values, sampler configuration and
//! errors.

use serde::{Deserialize, Serialize};

use crate::simplify::DEFAULT_MAX_CONSECUTIVE_ANGLE_DEG;

/// A 2D point, usually in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation: `self` at `t = 0`, `other` at `t = 1`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            t.mul_add(other.x - self.x, self.x),
            t.mul_add(other.y - self.y, self.y),
        )
    }

    /// Arithmetic mean of a set of points, `None` when `points` is empty.
    #[must_use]
    pub fn centroid(points: &[Self]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Self::new(sx / n, sy / n))
    }
}

/// A straight line segment from `p1` to `p2`.
///
/// The default value is the null line (both endpoints at the origin),
/// which is what [`clip_line`](crate::clip::clip_line) leaves behind when
/// a segment is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Start point.
    pub p1: Point,
    /// End point.
    pub p2: Point,
}

impl Line {
    /// The null line.
    pub const NULL: Self = Self::new(Point::ORIGIN, Point::ORIGIN);

    /// Create a new segment.
    #[must_use]
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Create a new segment from raw coordinates.
    #[must_use]
    pub const fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Returns `true` for the null line.
    #[must_use]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Horizontal extent `x2 - x1`.
    #[must_use]
    pub fn dx(&self) -> f64 {
        self.p2.x - self.p1.x
    }

    /// Vertical extent `y2 - y1`.
    #[must_use]
    pub fn dy(&self) -> f64 {
        self.p2.y - self.p1.y
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    /// Direction of the segment in degrees, in `[0, 360)`.
    ///
    /// Zero points to 3 o'clock and positive angles turn counter-clockwise
    /// on screen, i.e. with the y axis pointing down.
    #[must_use]
    pub fn angle(&self) -> f64 {
        let theta = (-self.dy()).atan2(self.dx()).to_degrees();
        let normalized = if theta < 0.0 { theta + 360.0 } else { theta };
        if normalized >= 360.0 { 0.0 } else { normalized }
    }

    /// Point at parameter `t` along the segment (`p1` at 0, `p2` at 1).
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        self.p1.lerp(self.p2, t)
    }
}

/// An axis-aligned rectangle given by its four edges.
///
/// The edges do not need to be ordered: all consumers go through
/// [`min_x`](Self::min_x) and friends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
}

impl Rect {
    /// Create a rectangle from its edges.
    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Smallest x coordinate covered.
    #[must_use]
    pub const fn min_x(&self) -> f64 {
        self.left.min(self.right)
    }

    /// Largest x coordinate covered.
    #[must_use]
    pub const fn max_x(&self) -> f64 {
        self.left.max(self.right)
    }

    /// Smallest y coordinate covered.
    #[must_use]
    pub const fn min_y(&self) -> f64 {
        self.top.min(self.bottom)
    }

    /// Largest y coordinate covered.
    #[must_use]
    pub const fn max_y(&self) -> f64 {
        self.top.max(self.bottom)
    }

    /// Width (always non-negative).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x() - self.min_x()
    }

    /// Height (always non-negative).
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y() - self.min_y()
    }

    /// Returns `true` if `p` lies inside or on the border.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        (self.min_x()..=self.max_x()).contains(&p.x) && (self.min_y()..=self.max_y()).contains(&p.y)
    }
}

/// A sequence of connected points: a sampled curve, a stitched outline
/// or a cleaned polygon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// One evaluated point of a parametric curve together with its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Curve parameter.
    pub t: f64,
    /// Curve value at `t`.
    pub point: Point,
}

/// How a non-finite slope difference compares against
/// [`SamplerConfig::slope_tolerance`].
///
/// Slopes are computed as `dy / dx`, so a vertical piece of the curve
/// yields `±inf` or `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NonFiniteSlopePolicy {
    /// A non-finite difference counts as exceeding the tolerance, so
    /// near-vertical sections are refined down to the maximum degree.
    #[default]
    Refine,
    /// Plain IEEE comparison: a non-finite difference never triggers
    /// refinement on its own; only the pixel-distance criterion applies.
    Ignore,
}

/// Configuration of the adaptive evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of evenly spaced intervals laid out before refinement.
    pub min_samples: u32,

    /// Maximum bisection depth per initial interval.
    ///
    /// Values above [`MAX_REFINEMENT_DEGREE_LIMIT`](Self::MAX_REFINEMENT_DEGREE_LIMIT)
    /// fail [`validate`](Self::validate) and are capped by the evaluator.
    /// Bounds the output to `min_samples * 2^max_refinement_degree + 1`
    /// points (see [`max_points`](Self::max_points)).
    pub max_refinement_degree: u32,

    /// Tolerance for the difference of the slopes left and right of a
    /// candidate midpoint.
    pub slope_tolerance: f64,

    /// Adjacent samples farther apart than this are always refined.
    pub min_pixel_per_sample: f64,

    /// Treatment of non-finite slope differences.
    pub non_finite_slopes: NonFiniteSlopePolicy,

    /// Seed for the midpoint jitter generator.
    pub jitter_seed: u64,
}

impl SamplerConfig {
    /// Default number of initial intervals.
    pub const DEFAULT_MIN_SAMPLES: u32 = 10;
    /// Default maximum bisection depth.
    pub const DEFAULT_MAX_REFINEMENT_DEGREE: u32 = 5;
    /// Default slope tolerance.
    pub const DEFAULT_SLOPE_TOLERANCE: f64 = 0.005;
    /// Default maximum distance between adjacent samples.
    pub const DEFAULT_MIN_PIXEL_PER_SAMPLE: f64 = 32.0;
    /// Default jitter seed.
    pub const DEFAULT_JITTER_SEED: u64 = 0x5EED_CAFE;
    /// Largest accepted [`max_refinement_degree`](Self::max_refinement_degree).
    pub const MAX_REFINEMENT_DEGREE_LIMIT: u32 = 30;

    /// Bisection depth the evaluator actually uses: `max_refinement_degree`
    /// capped at [`MAX_REFINEMENT_DEGREE_LIMIT`](Self::MAX_REFINEMENT_DEGREE_LIMIT).
    #[must_use]
    pub fn effective_refinement_degree(&self) -> u32 {
        self.max_refinement_degree
            .min(Self::MAX_REFINEMENT_DEGREE_LIMIT)
    }

    /// Upper bound on the number of points a single evaluation returns.
    #[must_use]
    pub fn max_points(&self) -> u64 {
        let per_interval = 1_u64 << self.effective_refinement_degree();
        u64::from(self.min_samples)
            .saturating_mul(per_interval)
            .saturating_add(1)
    }

    /// Check that every field is within its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), SamplingError> {
        if self.min_samples == 0 {
            return Err(SamplingError::InvalidConfig(
                "min_samples must be at least 1".to_string(),
            ));
        }
        if self.max_refinement_degree > Self::MAX_REFINEMENT_DEGREE_LIMIT {
            return Err(SamplingError::InvalidConfig(format!(
                "max_refinement_degree must be at most {}, got {}",
                Self::MAX_REFINEMENT_DEGREE_LIMIT,
                self.max_refinement_degree,
            )));
        }
        if self.slope_tolerance.is_nan() || self.slope_tolerance < 0.0 {
            return Err(SamplingError::InvalidConfig(format!(
                "slope_tolerance must be non-negative, got {}",
                self.slope_tolerance,
            )));
        }
        if self.min_pixel_per_sample.is_nan() || self.min_pixel_per_sample < 0.0 {
            return Err(SamplingError::InvalidConfig(format!(
                "min_pixel_per_sample must be non-negative, got {}",
                self.min_pixel_per_sample,
            )));
        }
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_samples: Self::DEFAULT_MIN_SAMPLES,
            max_refinement_degree: Self::DEFAULT_MAX_REFINEMENT_DEGREE,
            slope_tolerance: Self::DEFAULT_SLOPE_TOLERANCE,
            min_pixel_per_sample: Self::DEFAULT_MIN_PIXEL_PER_SAMPLE,
            non_finite_slopes: NonFiniteSlopePolicy::default(),
            jitter_seed: Self::DEFAULT_JITTER_SEED,
        }
    }
}

/// Configuration of the sampling pipeline ([`crate::sample_curve`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// First curve parameter.
    pub t_min: f64,
    /// Last curve parameter.
    pub t_max: f64,
    /// Adaptive evaluator settings.
    pub sampler: SamplerConfig,
    /// Angle tolerance (degrees) for post-sampling simplification;
    /// `None` skips the step.
    pub simplify_max_angle_deg: Option<f64>,
    /// Clipping rectangle applied by [`crate::sample_curve_pieces`].
    pub clip: Option<Rect>,
}

impl CurveConfig {
    /// Check the parameter range, sampler and simplification settings.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::NonFiniteRange`] if either bound is NaN or
    /// infinite, and [`SamplingError::InvalidConfig`] for any other
    /// out-of-range field.
    pub fn validate(&self) -> Result<(), SamplingError> {
        if !self.t_min.is_finite() || !self.t_max.is_finite() {
            return Err(SamplingError::NonFiniteRange {
                t_min: self.t_min,
                t_max: self.t_max,
            });
        }
        self.sampler.validate()?;
        if let Some(angle) = self.simplify_max_angle_deg
            && (angle.is_nan() || angle < 0.0)
        {
            return Err(SamplingError::InvalidConfig(format!(
                "simplify_max_angle_deg must be non-negative, got {angle}",
            )));
        }
        Ok(())
    }
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            t_min: 0.0,
            t_max: 1.0,
            sampler: SamplerConfig::default(),
            simplify_max_angle_deg: Some(DEFAULT_MAX_CONSECUTIVE_ANGLE_DEG),
            clip: None,
        }
    }
}

/// Errors reported by the sampling pipeline and configuration checks.
///
/// The geometry routines themselves never fail: they answer degenerate
/// input with empty output, `false` or a null line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    /// The evaluator has no curve to sample.
    #[error("no curve function is bound to the evaluator")]
    InvalidFunction,

    /// A configuration field is out of range.
    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),

    /// The parameter range is not finite.
    #[error("parameter range [{t_min}, {t_max}] is not finite")]
    NonFiniteRange {
        /// Requested lower bound.
        t_min: f64,
        /// Requested upper bound.
        t_max: f64,
    },

    /// Nothing was left to draw.
    #[error("sampling produced no visible points")]
    EmptyResult,
}
