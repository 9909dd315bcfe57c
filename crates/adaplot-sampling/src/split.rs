//! Turn ellipses, lines, and polylines into point sequences for drawing.
//!
//! The fixed-step functions ([`split_ellipse_into_points`],
//! [`split_line_into_points`]) produce a known number of points in the
//! shape's own coordinates. The adaptive ones map the shape through a
//! caller-supplied transform (typically graph to pixel coordinates, which
//! may be logarithmic or otherwise non-linear) and let
//! [`AdaptiveEvaluator`] decide where points are needed.

use serde::{Deserialize, Serialize};

use crate::evaluate::AdaptiveEvaluator;
use crate::types::{Line, Point};

/// Default number of control points for the fixed-step splitters.
pub const DEFAULT_CONTROL_POINTS: u32 = 180;

/// Fewest steps [`split_ellipse_into_points`] uses for any arc.
const MIN_ELLIPSE_STEPS: u32 = 10;

/// An elliptical arc, optionally rotated about its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseArc {
    pub center: Point,
    /// Semi-axis along the (unrotated) x direction.
    pub radius_x: f64,
    /// Semi-axis along the (unrotated) y direction.
    pub radius_y: f64,
    /// Start of the arc, in degrees.
    pub angle_start_deg: f64,
    /// End of the arc, in degrees. May be smaller than the start.
    pub angle_end_deg: f64,
    /// Rotation of the whole ellipse about `center`, in degrees.
    pub rotation_deg: f64,
}

impl Default for EllipseArc {
    fn default() -> Self {
        Self {
            center: Point::ORIGIN,
            radius_x: 1.0,
            radius_y: 1.0,
            angle_start_deg: 0.0,
            angle_end_deg: 360.0,
            rotation_deg: 0.0,
        }
    }
}

impl EllipseArc {
    /// A full, unrotated ellipse.
    #[must_use]
    pub fn full(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
            ..Self::default()
        }
    }

    /// Point on the ellipse at parameter angle `theta` (radians).
    #[must_use]
    pub fn point_at(&self, theta: f64) -> Point {
        let (sin_a, cos_a) = self.rotation_deg.to_radians().sin_cos();
        let (sin_t, cos_t) = theta.sin_cos();
        let ex = self.radius_x * cos_t;
        let ey = self.radius_y * sin_t;
        Point::new(
            ex.mul_add(cos_a, -(ey * sin_a)) + self.center.x,
            ex.mul_add(sin_a, ey * cos_a) + self.center.y,
        )
    }

    /// Start of the arc in radians.
    #[must_use]
    pub fn start_rad(&self) -> f64 {
        self.angle_start_deg.to_radians()
    }

    /// End of the arc in radians.
    #[must_use]
    pub fn end_rad(&self) -> f64 {
        self.angle_end_deg.to_radians()
    }
}

/// Result of [`split_ellipse_adaptive`].
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseSplit {
    /// Transformed points along the arc, from start to end.
    pub points: Vec<Point>,
    /// Arc start before the transform.
    pub start: Point,
    /// Arc end before the transform.
    pub end: Point,
}

/// Sample an elliptical arc at evenly spaced angles.
///
/// Uses `control_points` steps, doubled until there are at least ten, and
/// returns one point per step boundary, so the result always starts at the
/// arc start and ends at the arc end.
#[must_use = "returns the arc points"]
pub fn split_ellipse_into_points(arc: &EllipseArc, control_points: u32) -> Vec<Point> {
    let mut steps = control_points.max(1);
    while steps < MIN_ELLIPSE_STEPS {
        steps *= 2;
    }

    let start = arc.start_rad();
    let end = arc.end_rad();
    let step = (end - start) / f64::from(steps);
    let mut points: Vec<Point> = (0..steps)
        .map(|i| arc.point_at(f64::from(i).mul_add(step, start)))
        .collect();
    points.push(arc.point_at(end));
    points
}

/// Sample an elliptical arc adaptively after mapping it through
/// `transform`.
#[must_use = "returns the arc points"]
pub fn split_ellipse_adaptive<T>(arc: &EllipseArc, transform: T) -> EllipseSplit
where
    T: Fn(Point) -> Point,
{
    let evaluator = AdaptiveEvaluator::new(|theta: f64| transform(arc.point_at(theta)));
    EllipseSplit {
        points: evaluator.evaluate(arc.start_rad(), arc.end_rad()),
        start: arc.point_at(arc.start_rad()),
        end: arc.point_at(arc.end_rad()),
    }
}

/// Split a line into `control_points` equal pieces.
///
/// Returns `control_points + 1` points from `line.p1` to `line.p2`
/// (at least both endpoints).
#[must_use = "returns the line points"]
pub fn split_line_into_points(line: &Line, control_points: u32) -> Vec<Point> {
    let n = control_points.max(1);
    let mut points = Vec::with_capacity(n as usize + 1);
    points.push(line.p1);
    for i in 1..n {
        points.push(line.point_at(f64::from(i) / f64::from(n)));
    }
    points.push(line.p2);
    points
}

/// Sample a line adaptively after mapping it through `transform`.
///
/// A straight line stays straight under affine transforms and comes back
/// with the evaluator's minimum sample count; curved images (log axes,
/// polar plots) are refined where they bend.
#[must_use = "returns the line points"]
pub fn split_line_adaptive<T>(line: &Line, transform: T) -> Vec<Point>
where
    T: Fn(Point) -> Point,
{
    AdaptiveEvaluator::new(|t: f64| transform(line.point_at(t))).evaluate(0.0, 1.0)
}

/// Sample every segment of a polyline adaptively through `transform`.
///
/// Consecutive duplicate points in the output are removed, so segment
/// joints appear once. Inputs with fewer than two points give an empty
/// result.
#[must_use = "returns the polyline points"]
pub fn split_polyline_adaptive<T>(points: &[Point], transform: T) -> Vec<Point>
where
    T: Fn(Point) -> Point,
{
    match points {
        [] | [_] => Vec::new(),
        [a, b] => split_line_adaptive(&Line::new(*a, *b), &transform),
        _ => {
            let mut result: Vec<Point> = Vec::new();
            for window in points.windows(2) {
                let segment = split_line_adaptive(&Line::new(window[0], window[1]), &transform);
                for p in segment {
                    if result.last() != Some(&p) {
                        result.push(p);
                    }
                }
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn assert_point_near(actual: Point, expected: Point) {
        assert!(
            actual.distance(expected) < 1e-9,
            "expected ({}, {}), got ({}, {})",
            expected.x,
            expected.y,
            actual.x,
            actual.y,
        );
    }

    #[test]
    fn point_at_unrotated() {
        let arc = EllipseArc::full(Point::new(1.0, 2.0), 3.0, 2.0);
        assert_point_near(arc.point_at(0.0), Point::new(4.0, 2.0));
        assert_point_near(arc.point_at(FRAC_PI_2), Point::new(1.0, 4.0));
    }

    #[test]
    fn point_at_rotated_quarter_turn() {
        let arc = EllipseArc {
            rotation_deg: 90.0,
            ..EllipseArc::full(Point::ORIGIN, 3.0, 2.0)
        };
        // The x semi-axis now points along +y.
        assert_point_near(arc.point_at(0.0), Point::new(0.0, 3.0));
        assert_point_near(arc.point_at(FRAC_PI_2), Point::new(-2.0, 0.0));
    }

    #[test]
    fn fixed_ellipse_covers_whole_arc() {
        let arc = EllipseArc {
            angle_start_deg: 0.0,
            angle_end_deg: 90.0,
            ..EllipseArc::full(Point::ORIGIN, 1.0, 1.0)
        };
        let points = split_ellipse_into_points(&arc, DEFAULT_CONTROL_POINTS);
        assert_eq!(points.len(), 181);
        assert_point_near(points[0], Point::new(1.0, 0.0));
        assert_point_near(points[180], Point::new(0.0, 1.0));
        for p in &points {
            assert!((p.distance(Point::ORIGIN) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn fixed_ellipse_enforces_minimum_steps() {
        let arc = EllipseArc::default();
        assert_eq!(split_ellipse_into_points(&arc, 3).len(), 13);
        assert_eq!(split_ellipse_into_points(&arc, 0).len(), 17);
    }

    #[test]
    fn fixed_ellipse_runs_backwards() {
        let arc = EllipseArc {
            angle_start_deg: 90.0,
            angle_end_deg: 0.0,
            ..EllipseArc::default()
        };
        let points = split_ellipse_into_points(&arc, 10);
        assert_point_near(points[0], Point::new(0.0, 1.0));
        assert_point_near(points[10], Point::new(1.0, 0.0));
    }

    #[test]
    fn adaptive_ellipse_reports_untransformed_ends() {
        let arc = EllipseArc {
            angle_end_deg: 180.0,
            ..EllipseArc::full(Point::ORIGIN, 2.0, 1.0)
        };
        let split = split_ellipse_adaptive(&arc, |p| Point::new(p.x * 100.0, p.y * 100.0));
        assert_point_near(split.start, Point::new(2.0, 0.0));
        assert_point_near(split.end, Point::new(-2.0, 0.0));
        assert_point_near(split.points[0], Point::new(200.0, 0.0));
        assert_point_near(split.points[split.points.len() - 1], Point::new(-200.0, 0.0));
        assert!(split.points.len() > 11);
    }

    #[test]
    fn line_split_evenly() {
        let line = Line::from_coords(0.0, 0.0, 4.0, 8.0);
        let points = split_line_into_points(&line, 4);
        assert_eq!(points.len(), 5);
        assert_point_near(points[1], Point::new(1.0, 2.0));
        assert_point_near(points[3], Point::new(3.0, 6.0));
        assert_eq!(points[4], Point::new(4.0, 8.0));
    }

    #[test]
    fn line_split_zero_control_points_keeps_endpoints() {
        let line = Line::from_coords(0.0, 0.0, 1.0, 1.0);
        assert_eq!(split_line_into_points(&line, 0), vec![line.p1, line.p2]);
    }

    #[test]
    fn adaptive_line_identity_uses_minimum_samples() {
        let line = Line::from_coords(0.0, 0.0, 10.0, 5.0);
        let points = split_line_adaptive(&line, |p| p);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0], line.p1);
        assert_eq!(points[10], line.p2);
    }

    #[test]
    fn adaptive_line_bends_under_nonlinear_transform() {
        let line = Line::from_coords(0.0, 0.0, 10.0, 10.0);
        // Square the y coordinate: the image is a parabola.
        let points = split_line_adaptive(&line, |p| Point::new(p.x * 10.0, p.y * p.y));
        assert!(points.len() > 11);
    }

    #[test]
    fn adaptive_polyline_short_inputs() {
        assert!(split_polyline_adaptive(&[], |p| p).is_empty());
        assert!(split_polyline_adaptive(&[Point::new(1.0, 1.0)], |p| p).is_empty());
        let two = [Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert_eq!(split_polyline_adaptive(&two, |p| p).len(), 11);
    }

    #[test]
    fn adaptive_polyline_shares_joints() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 1.0),
        ];
        let result = split_polyline_adaptive(&points, |p| p);
        // Two segments of 11 points each, joint counted once.
        assert_eq!(result.len(), 21);
        assert!(result.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(result[10], Point::new(1.0, 0.0));
    }
}
