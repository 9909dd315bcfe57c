//! Adaptive sampling of parametric curves.
//!
//! [`AdaptiveEvaluator`] turns a curve `t -> (x, y)` into a polyline that
//! looks smooth when its points are joined by straight lines, while
//! keeping the point count low.
//!
//! # Algorithm
//!
//! 1. Lay out `min_samples` evenly spaced intervals over `[t_min, t_max]`.
//! 2. For every interval `[a, b]`, evaluate the curve at a jittered
//!    midpoint `m` and compare the slopes of `a -> m` and `m -> b`. If they
//!    differ by more than `slope_tolerance`, or `a` and `b` are more than
//!    `min_pixel_per_sample` apart, keep `m` and recurse into both halves.
//! 3. Stop recursing after `max_refinement_degree` levels (never more
//!    than `SamplerConfig::MAX_REFINEMENT_DEGREE_LIMIT`), so one
//!    evaluation never returns more than
//!    `min_samples * 2^max_refinement_degree + 1` points.
//!
//! The midpoint is jittered by up to 10% of the interval width so that
//! periodic curves are not always probed at the same phase. The jitter
//! comes from an explicit generator seeded by
//! [`SamplerConfig::jitter_seed`], which makes every evaluation
//! reproducible.
//!
//! Refinement is an in-order recursion that appends to a single output
//! vector: the left half is emitted before the midpoint, the midpoint
//! before the right half. The output is therefore ordered by `t` without
//! any list splicing.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::{NonFiniteSlopePolicy, Point, Sample, SamplerConfig, SamplingError};

/// A curve `t -> (x, y)` that can be sampled.
///
/// Implemented for every `Fn(f64) -> Point` closure. Curves given as two
/// scalar functions go through [`Components`].
pub trait ParametricCurve {
    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Point;
}

impl<F> ParametricCurve for F
where
    F: Fn(f64) -> Point,
{
    fn point_at(&self, t: f64) -> Point {
        self(t)
    }
}

/// Combines two scalar functions `x(t)` and `y(t)` into one curve.
///
/// For a plain function graph `y = f(x)` use `Components::new(|t| t, f)`.
#[derive(Debug, Clone, Copy)]
pub struct Components<FX, FY> {
    fx: FX,
    fy: FY,
}

impl<FX, FY> Components<FX, FY>
where
    FX: Fn(f64) -> f64,
    FY: Fn(f64) -> f64,
{
    /// Create a curve from its coordinate functions.
    pub const fn new(fx: FX, fy: FY) -> Self {
        Self { fx, fy }
    }
}

impl<FX, FY> ParametricCurve for Components<FX, FY>
where
    FX: Fn(f64) -> f64,
    FY: Fn(f64) -> f64,
{
    fn point_at(&self, t: f64) -> Point {
        Point::new((self.fx)(t), (self.fy)(t))
    }
}

/// Counters collected during one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefinementStats {
    /// Number of curve evaluations, seeds and probes included.
    pub evaluations: usize,
    /// Number of probed midpoints that were kept.
    pub refinements: usize,
    /// Deepest refinement level that kept a midpoint (0 if none).
    pub max_depth: u32,
}

/// Adaptive sampler for a [`ParametricCurve`].
///
/// The evaluator only borrows its configuration during
/// [`evaluate`](Self::evaluate) and keeps all working state local to the
/// call, so one evaluator can be shared between threads as long as the
/// curve is `Sync`.
#[derive(Debug, Clone)]
pub struct AdaptiveEvaluator<C> {
    curve: Option<C>,
    config: SamplerConfig,
}

impl<C: ParametricCurve> AdaptiveEvaluator<C> {
    /// Create an evaluator with the default [`SamplerConfig`].
    pub fn new(curve: C) -> Self {
        Self::with_config(curve, SamplerConfig::default())
    }

    /// Create an evaluator with an explicit configuration.
    pub const fn with_config(curve: C, config: SamplerConfig) -> Self {
        Self {
            curve: Some(curve),
            config,
        }
    }

    /// Create an evaluator without a curve.
    ///
    /// Such an evaluator is not [valid](Self::is_valid) and every
    /// evaluation returns an empty sequence.
    pub const fn empty(config: SamplerConfig) -> Self {
        Self {
            curve: None,
            config,
        }
    }

    /// The sampler configuration.
    pub const fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Returns `true` if a curve is bound and at least one initial
    /// interval is requested.
    pub const fn is_valid(&self) -> bool {
        self.curve.is_some() && self.config.min_samples > 0
    }

    /// Sample the curve over `[t_min, t_max]` and return the points.
    ///
    /// The points are ordered from `t_min` to `t_max`, also when
    /// `t_min > t_max`. A zero-width range yields the single point
    /// `curve(t_min)`. An invalid evaluator yields nothing.
    #[must_use = "returns the sampled points"]
    pub fn evaluate(&self, t_min: f64, t_max: f64) -> Vec<Point> {
        self.evaluate_samples(t_min, t_max)
            .into_iter()
            .map(|s| s.point)
            .collect()
    }

    /// Checked variant of [`evaluate`](Self::evaluate).
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::InvalidFunction`] if no curve is bound,
    /// [`SamplingError::InvalidConfig`] if the configuration does not
    /// validate and [`SamplingError::NonFiniteRange`] for a NaN or infinite
    /// bound.
    pub fn try_evaluate(&self, t_min: f64, t_max: f64) -> Result<Vec<Point>, SamplingError> {
        if self.curve.is_none() {
            return Err(SamplingError::InvalidFunction);
        }
        self.config.validate()?;
        if !t_min.is_finite() || !t_max.is_finite() {
            return Err(SamplingError::NonFiniteRange { t_min, t_max });
        }
        Ok(self.evaluate(t_min, t_max))
    }

    /// Like [`evaluate`](Self::evaluate), but keeps the parameter of every
    /// point.
    #[must_use = "returns the sampled points"]
    pub fn evaluate_samples(&self, t_min: f64, t_max: f64) -> Vec<Sample> {
        self.evaluate_with_stats(t_min, t_max).0
    }

    /// Like [`evaluate_samples`](Self::evaluate_samples), also returning
    /// refinement counters.
    #[must_use = "returns the sampled points"]
    pub fn evaluate_with_stats(&self, t_min: f64, t_max: f64) -> (Vec<Sample>, RefinementStats) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.jitter_seed);
        self.evaluate_with_rng(t_min, t_max, &mut rng)
    }

    /// Sample the curve drawing the midpoint jitter from `rng`.
    #[must_use = "returns the sampled points"]
    #[allow(clippy::float_cmp)]
    pub fn evaluate_with_rng<R: Rng>(
        &self,
        t_min: f64,
        t_max: f64,
        rng: &mut R,
    ) -> (Vec<Sample>, RefinementStats) {
        let Some(curve) = self.curve.as_ref() else {
            log::debug!("evaluate called without a curve, returning no samples");
            return (Vec::new(), RefinementStats::default());
        };
        if !self.is_valid() {
            log::debug!("evaluate called with min_samples == 0, returning no samples");
            return (Vec::new(), RefinementStats::default());
        }

        let mut refiner = Refiner {
            curve,
            config: &self.config,
            rng,
            samples: Vec::with_capacity(self.config.min_samples as usize + 1),
            stats: RefinementStats::default(),
        };

        let first = refiner.sample(t_min);
        refiner.samples.push(first);

        if t_min == t_max {
            return (refiner.samples, refiner.stats);
        }

        let delta_t0 = (t_max - t_min) / f64::from(self.config.min_samples);
        let mut a = first;
        for i in 1..=self.config.min_samples {
            // The last seed sits exactly on t_max.
            let t = if i == self.config.min_samples {
                t_max
            } else {
                f64::from(i).mul_add(delta_t0, t_min)
            };
            let b = refiner.sample(t);
            refiner.refine(a, b, 0);
            refiner.samples.push(b);
            a = b;
        }

        log::debug!(
            "sampled [{t_min}, {t_max}]: {} points, {} evaluations, {} refinements, depth {}",
            refiner.samples.len(),
            refiner.stats.evaluations,
            refiner.stats.refinements,
            refiner.stats.max_depth,
        );
        (refiner.samples, refiner.stats)
    }
}

/// Working state of one evaluation.
struct Refiner<'a, C: ?Sized, R> {
    curve: &'a C,
    config: &'a SamplerConfig,
    rng: &'a mut R,
    samples: Vec<Sample>,
    stats: RefinementStats,
}

impl<C: ParametricCurve + ?Sized, R: Rng> Refiner<'_, C, R> {
    fn sample(&mut self, t: f64) -> Sample {
        self.stats.evaluations += 1;
        Sample {
            t,
            point: self.curve.point_at(t),
        }
    }

    /// Emit the kept midpoints strictly between `a` and `b`, in order.
    ///
    /// Neither `a` nor `b` is pushed; the caller owns the endpoints.
    fn refine(&mut self, a: Sample, b: Sample, degree: u32) {
        if degree >= self.config.effective_refinement_degree() {
            return;
        }

        let jitter = (self.rng.random::<f64>() - 0.5) / 5.0;
        let t_mid = (b.t - a.t).mul_add(0.5 + jitter, a.t);
        let mid = self.sample(t_mid);

        if !self.needs_refinement(a.point, mid.point, b.point) {
            return;
        }

        self.stats.refinements += 1;
        self.stats.max_depth = self.stats.max_depth.max(degree + 1);
        log::trace!("refine t={t_mid} at degree {degree}");

        self.refine(a, mid, degree + 1);
        self.samples.push(mid);
        self.refine(mid, b, degree + 1);
    }

    fn needs_refinement(&self, pa: Point, pmid: Point, pb: Point) -> bool {
        let delta = pa.distance(pb);
        let slope_a_mid = (pmid.y - pa.y) / (pmid.x - pa.x);
        let slope_mid_b = (pb.y - pmid.y) / (pb.x - pmid.x);
        let slope_change = (slope_mid_b - slope_a_mid).abs();

        let slope_exceeded = if slope_change.is_finite() {
            slope_change > self.config.slope_tolerance
        } else {
            match self.config.non_finite_slopes {
                NonFiniteSlopePolicy::Refine => true,
                NonFiniteSlopePolicy::Ignore => slope_change > self.config.slope_tolerance,
            }
        };

        slope_exceeded || delta > self.config.min_pixel_per_sample
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn linear(t: f64) -> Point {
        Point::new(t, 2.0f64.mul_add(t, 1.0))
    }

    fn parabola(t: f64) -> Point {
        Point::new(t * 10.0, t * t * 10.0)
    }

    #[test]
    fn empty_evaluator_is_invalid_and_returns_nothing() {
        let evaluator: AdaptiveEvaluator<fn(f64) -> Point> =
            AdaptiveEvaluator::empty(SamplerConfig::default());
        assert!(!evaluator.is_valid());
        assert!(evaluator.evaluate(0.0, 1.0).is_empty());
        assert!(evaluator.evaluate(0.0, 0.0).is_empty());
    }

    #[test]
    fn try_evaluate_reports_why_nothing_was_sampled() {
        let empty: AdaptiveEvaluator<fn(f64) -> Point> =
            AdaptiveEvaluator::empty(SamplerConfig::default());
        assert_eq!(empty.try_evaluate(0.0, 1.0), Err(SamplingError::InvalidFunction));

        let zero = AdaptiveEvaluator::with_config(
            linear,
            SamplerConfig {
                min_samples: 0,
                ..SamplerConfig::default()
            },
        );
        assert!(matches!(
            zero.try_evaluate(0.0, 1.0),
            Err(SamplingError::InvalidConfig(_))
        ));

        let evaluator = AdaptiveEvaluator::new(linear);
        assert!(matches!(
            evaluator.try_evaluate(0.0, f64::NAN),
            Err(SamplingError::NonFiniteRange { .. })
        ));
        assert_eq!(evaluator.try_evaluate(0.0, 1.0).unwrap().len(), 11);
    }

    #[test]
    fn zero_min_samples_is_invalid() {
        let evaluator = AdaptiveEvaluator::with_config(
            linear,
            SamplerConfig {
                min_samples: 0,
                ..SamplerConfig::default()
            },
        );
        assert!(!evaluator.is_valid());
        assert!(evaluator.evaluate(0.0, 1.0).is_empty());
    }

    #[test]
    fn degenerate_range_returns_single_point() {
        let evaluator = AdaptiveEvaluator::new(parabola);
        let points = evaluator.evaluate(0.7, 0.7);
        assert_eq!(points, vec![parabola(0.7)]);
    }

    #[test]
    fn endpoints_are_exact() {
        let evaluator = AdaptiveEvaluator::new(parabola);
        let samples = evaluator.evaluate_samples(-1.0, 2.0);
        assert!((samples[0].t - -1.0).abs() < f64::EPSILON);
        assert!((samples.last().unwrap().t - 2.0).abs() < f64::EPSILON);
        assert_eq!(samples[0].point, parabola(-1.0));
        assert_eq!(samples.last().unwrap().point, parabola(2.0));
    }

    #[test]
    fn linear_curve_keeps_only_seeds() {
        let evaluator = AdaptiveEvaluator::new(linear);
        let (samples, stats) = evaluator.evaluate_with_stats(0.0, 10.0);
        assert_eq!(samples.len(), 11);
        assert_eq!(stats.refinements, 0);
        assert_eq!(stats.max_depth, 0);
        // 11 seeds plus one probe per seed interval.
        assert_eq!(stats.evaluations, 21);
    }

    #[test]
    fn curved_function_is_refined() {
        let evaluator = AdaptiveEvaluator::new(parabola);
        let (samples, stats) = evaluator.evaluate_with_stats(0.0, 1.0);
        assert!(stats.refinements > 0);
        assert!(samples.len() > 11);
        assert_eq!(samples.len(), 11 + stats.refinements);
    }

    #[test]
    fn samples_are_ordered_by_t() {
        let evaluator = AdaptiveEvaluator::new(|t: f64| Point::new(t.cos() * 100.0, t.sin() * 100.0));
        let samples = evaluator.evaluate_samples(0.0, std::f64::consts::TAU);
        assert!(samples.windows(2).all(|w| w[0].t < w[1].t));
    }

    #[test]
    fn reversed_range_is_traversed_backwards() {
        let evaluator = AdaptiveEvaluator::new(parabola);
        let samples = evaluator.evaluate_samples(1.0, -1.0);
        assert!((samples[0].t - 1.0).abs() < f64::EPSILON);
        assert!((samples.last().unwrap().t - -1.0).abs() < f64::EPSILON);
        assert!(samples.windows(2).all(|w| w[0].t > w[1].t));
    }

    #[test]
    fn point_count_is_bounded() {
        // A wildly oscillating curve refines everywhere.
        let config = SamplerConfig {
            min_samples: 4,
            max_refinement_degree: 3,
            ..SamplerConfig::default()
        };
        let evaluator =
            AdaptiveEvaluator::with_config(|t: f64| Point::new(t, (t * 1000.0).sin() * 500.0), config);
        let points = evaluator.evaluate(0.0, 10.0);
        assert!(points.len() as u64 <= evaluator.config().max_points());
        assert!(points.len() > 5);
    }

    #[test]
    fn refinement_depth_is_capped_without_validation() {
        // Only the interval holding the jump keeps refining, so the depth
        // reaches the cap after a few evaluations per level.
        let jump = |t: f64| Point::new(t, if t < 0.35 { 0.0 } else { 100.0 });
        let config = SamplerConfig {
            max_refinement_degree: 60,
            ..SamplerConfig::default()
        };
        assert!(config.validate().is_err());

        let evaluator = AdaptiveEvaluator::with_config(jump, config);
        let (samples, stats) = evaluator.evaluate_with_stats(0.0, 1.0);
        assert_eq!(stats.max_depth, SamplerConfig::MAX_REFINEMENT_DEGREE_LIMIT);
        assert!(samples.len() as u64 <= evaluator.config().max_points());
        assert!(stats.evaluations < 200, "{} evaluations", stats.evaluations);
    }

    #[test]
    fn same_seed_gives_same_samples() {
        let evaluator = AdaptiveEvaluator::new(parabola);
        assert_eq!(
            evaluator.evaluate_samples(0.0, 3.0),
            evaluator.evaluate_samples(0.0, 3.0),
        );
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let config = SamplerConfig {
            min_samples: 1,
            max_refinement_degree: 1,
            slope_tolerance: 0.0,
            min_pixel_per_sample: 0.0,
            ..SamplerConfig::default()
        };
        for seed in 0..50 {
            let evaluator = AdaptiveEvaluator::with_config(
                parabola,
                SamplerConfig {
                    jitter_seed: seed,
                    ..config.clone()
                },
            );
            let samples = evaluator.evaluate_samples(0.0, 1.0);
            assert_eq!(samples.len(), 3, "seed {seed}");
            let t_mid = samples[1].t;
            assert!((0.4..=0.6).contains(&t_mid), "seed {seed}: t_mid={t_mid}");
        }
    }

    #[test]
    fn injected_rng_drives_the_jitter() {
        let evaluator = AdaptiveEvaluator::new(parabola);
        let mut rng_a = ChaCha8Rng::seed_from_u64(7);
        let mut rng_b = ChaCha8Rng::seed_from_u64(7);
        let (a, _) = evaluator.evaluate_with_rng(0.0, 1.0, &mut rng_a);
        let (b, _) = evaluator.evaluate_with_rng(0.0, 1.0, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn large_jump_is_refined_even_when_linear() {
        // Straight line, but seeds 100 px apart.
        let evaluator = AdaptiveEvaluator::new(|t: f64| Point::new(t * 1000.0, 0.0));
        let (samples, stats) = evaluator.evaluate_with_stats(0.0, 1.0);
        assert!(stats.refinements > 0);
        let max_gap = samples
            .windows(2)
            .map(|w| w[0].point.distance(w[1].point))
            .fold(0.0, f64::max);
        assert!(max_gap <= 32.0, "max gap {max_gap}");
    }

    #[test]
    fn vertical_section_refines_with_default_policy() {
        // x is constant, so every slope is infinite or NaN.
        let curve = |t: f64| Point::new(5.0, t);
        let refine = AdaptiveEvaluator::new(curve);
        let ignore = AdaptiveEvaluator::with_config(
            curve,
            SamplerConfig {
                non_finite_slopes: NonFiniteSlopePolicy::Ignore,
                ..SamplerConfig::default()
            },
        );
        let refined = refine.evaluate(0.0, 10.0);
        let ignored = ignore.evaluate(0.0, 10.0);
        assert_eq!(refined.len() as u64, refine.config().max_points());
        assert_eq!(ignored.len(), 11);
    }

    #[test]
    fn components_adapter_combines_scalar_functions() {
        let curve = Components::new(|t: f64| t, |t: f64| t * t);
        assert_eq!(curve.point_at(3.0), Point::new(3.0, 9.0));
        let evaluator = AdaptiveEvaluator::new(curve);
        assert!(evaluator.is_valid());
        assert_eq!(evaluator.evaluate(2.0, 2.0), vec![Point::new(2.0, 4.0)]);
    }
}
