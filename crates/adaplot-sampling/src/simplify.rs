//! Greedy removal of nearly collinear points from a sampled polyline.
//!
//! A single pass walks the polyline and keeps a point only if the
//! direction from the last kept point to it differs from the direction of
//! the following segment by more than a given angle. This costs O(n) and
//! removes most redundant samples of flat curve sections, but it is not
//! optimal: it never revisits a decision and does not guarantee the
//! minimum number of points.

use crate::types::{Line, Point, Polyline};

/// Default angle tolerance in degrees.
pub const DEFAULT_MAX_CONSECUTIVE_ANGLE_DEG: f64 = 1.0;

/// Drop interior points where the polyline continues (almost) straight on.
///
/// The first and last point are always kept. Inputs with two points or
/// fewer are returned unchanged.
#[must_use = "returns the simplified points"]
pub fn simplify_polyline(points: &[Point], max_consecutive_angle_deg: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut kept = Vec::with_capacity(points.len());
    let mut last_kept = points[0];
    kept.push(last_kept);

    for window in points.windows(2).skip(1) {
        let (p, next) = (window[0], window[1]);
        let incoming = Line::new(last_kept, p);
        let outgoing = Line::new(p, next);
        if incoming.length() > 0.0
            && angle_between(incoming.angle(), outgoing.angle()) > max_consecutive_angle_deg
        {
            kept.push(p);
            last_kept = p;
        }
    }

    if let Some(&last) = points.last()
        && last_kept != last
    {
        kept.push(last);
    }
    kept
}

/// Simplify several polylines independently.
#[must_use = "returns the simplified polylines"]
pub fn simplify_polylines(polylines: &[Polyline], max_consecutive_angle_deg: f64) -> Vec<Polyline> {
    polylines
        .iter()
        .map(|pl| Polyline::new(simplify_polyline(pl.points(), max_consecutive_angle_deg)))
        .collect()
}

/// Smallest difference between two directions, in `[0, 180]` degrees.
fn angle_between(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}
