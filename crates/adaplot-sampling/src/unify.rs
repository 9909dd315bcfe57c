//! Stitch unordered line segments into polylines.
//!
//! Contouring and similar algorithms emit many short segments in no
//! particular order. [`unify_lines_to_polygons`] joins segments whose
//! endpoints (nearly) coincide into longer polylines, reversing segments
//! where needed, and cleans every joint with [`clean_polygon`].
//!
//! The search is local: each polyline only looks at the next
//! `search_max_surrounding_elements` entries of the working list, so
//! stitching is fast but may leave joinable pieces apart if their
//! segments were far from each other in the input.

use serde::{Deserialize, Serialize};

use crate::clean::{DEFAULT_CLEAN_DISTANCE, clean_polygon};
use crate::types::{Line, Point, Polyline};

/// Tuning knobs for [`unify_lines_to_polygons`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifyOptions {
    /// Endpoints closer than this are considered identical.
    pub distance_threshold: f64,
    /// Size of the look-ahead window when searching for a partner.
    pub search_max_surrounding_elements: usize,
    /// Upper bound on full passes over the working list.
    pub max_iterations: u32,
}

impl UnifyOptions {
    /// Default look-ahead window.
    pub const DEFAULT_SEARCH_MAX_SURROUNDING_ELEMENTS: usize = 10;
    /// Default pass limit.
    pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
}

impl Default for UnifyOptions {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_CLEAN_DISTANCE,
            search_max_surrounding_elements: Self::DEFAULT_SEARCH_MAX_SURROUNDING_ELEMENTS,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Which endpoints of two polylines touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joint {
    FirstFirst,
    FirstLast,
    LastFirst,
    LastLast,
}

/// Join segments with shared endpoints into polylines.
///
/// Passes over the working list repeat until a pass makes no merge or
/// `options.max_iterations` passes have run. The output order follows the
/// order of the first segment of each polyline in `lines`.
#[must_use = "returns the stitched polylines"]
pub fn unify_lines_to_polygons(lines: &[Line], options: &UnifyOptions) -> Vec<Polyline> {
    let threshold = options.distance_threshold;
    let window = options.search_max_surrounding_elements;

    let mut res: Vec<Vec<Point>> = lines
        .iter()
        .map(|l| clean_polygon(&[l.p1, l.p2], threshold))
        .collect();

    let mut iteration = 0;
    let mut found = true;
    while found && iteration < options.max_iterations {
        found = false;
        let mut i = 0;
        while i + 1 < res.len() {
            let mut j = i + 1;
            while j < res.len() && j < i.saturating_add(window) {
                match find_joint(&res[i], &res[j], threshold) {
                    Some(joint) => {
                        let other = res.remove(j);
                        merge(&mut res[i], &other, joint);
                        found = true;
                    }
                    None => j += 1,
                }
            }
            res[i] = clean_polygon(&res[i], threshold);
            i += 1;
        }
        iteration += 1;
        log::debug!(
            "unify pass {iteration}: {} polylines from {} segments",
            res.len(),
            lines.len(),
        );
    }

    res.into_iter().map(Polyline::new).collect()
}

/// First matching joint between `a` and `b`, checked in a fixed order.
fn find_joint(a: &[Point], b: &[Point], threshold: f64) -> Option<Joint> {
    let (a_first, a_last) = (a.first()?, a.last()?);
    let (b_first, b_last) = (b.first()?, b.last()?);
    if a_first.distance(*b_first) <= threshold {
        Some(Joint::FirstFirst)
    } else if a_first.distance(*b_last) <= threshold {
        Some(Joint::FirstLast)
    } else if a_last.distance(*b_first) <= threshold {
        Some(Joint::LastFirst)
    } else if a_last.distance(*b_last) <= threshold {
        Some(Joint::LastLast)
    } else {
        None
    }
}

/// Attach `other` to `target` at `joint`, dropping `other`'s touching
/// endpoint.
fn merge(target: &mut Vec<Point>, other: &[Point], joint: Joint) {
    let n = other.len();
    match joint {
        Joint::FirstFirst => {
            let mut joined: Vec<Point> = other[1..].iter().rev().copied().collect();
            joined.append(target);
            *target = joined;
        }
        Joint::FirstLast => {
            let mut joined = other[..n - 1].to_vec();
            joined.append(target);
            *target = joined;
        }
        Joint::LastFirst => target.extend_from_slice(&other[1..]),
        Joint::LastLast => target.extend(other[..n - 1].iter().rev()),
    }
}
