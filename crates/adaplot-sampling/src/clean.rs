//! Collapse runs of near-duplicate consecutive points.
//!
//! Stitching segments end-to-end leaves clusters of points that are
//! almost on top of each other at every joint. [`clean_polygon`] merges
//! each such cluster into one point.
//!
//! A run starts at an anchor point and extends over every following point
//! within `distance_threshold` of that anchor. The first point that is
//! farther away starts the next run. Runs are then reduced as follows:
//!
//! - the first run is represented by the first input point, unchanged;
//!   unlike the other runs it is not replaced by its centroid, and the
//!   near points that follow the first point are dropped;
//! - every interior run is replaced by its centroid;
//! - the last run is replaced by the last input point, preceded by the
//!   run's centroid only if that centroid is farther than the threshold
//!   from the last point.
//!
//! Both endpoints of the input therefore survive exactly, which keeps
//! cleaned polylines connectable to their neighbours.

use crate::types::Point;

/// Default merge distance.
pub const DEFAULT_CLEAN_DISTANCE: f64 = 0.3;

/// Merge consecutive points that lie within `distance_threshold` of each
/// other.
///
/// Inputs with two points or fewer are returned unchanged.
#[must_use = "returns the cleaned points"]
pub fn clean_polygon(points: &[Point], distance_threshold: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut cleaned = Vec::with_capacity(points.len());
    cleaned.push(first);

    let mut run: Vec<Point> = vec![first];
    let mut in_first_run = true;
    for &p in &points[1..] {
        if p.distance(run[0]) <= distance_threshold {
            run.push(p);
            continue;
        }
        if !in_first_run && let Some(c) = Point::centroid(&run) {
            cleaned.push(c);
        }
        in_first_run = false;
        run.clear();
        run.push(p);
    }

    if in_first_run {
        // Everything stayed within reach of the first point.
        if last != first {
            cleaned.push(last);
        }
        return cleaned;
    }

    if let Some(c) = Point::centroid(&run)
        && c.distance(last) > distance_threshold
    {
        cleaned.push(c);
    }
    cleaned.push(last);
    cleaned
}
