//! Rectangle clipping for lines and polylines.
//!
//! [`clip_line`] implements the Liang–Barsky algorithm: the segment is
//! written as `P(u) = p1 + u * (p2 - p1)` and each rectangle edge
//! restricts `u` to a half-line. The intersection of these constraints
//! with `[0, 1]` is the visible part of the segment.
//!
//! [`clip_polyline_to_rect`] applies it segment by segment and splits the
//! polyline wherever it leaves the rectangle, so renderers never receive
//! coordinates far outside the visible area.

use crate::types::{Line, Point, Polyline, Rect};

/// Clip `line` in place to `rect`.
///
/// Returns `true` if some part of the segment lies inside the rectangle
/// (border included); `line` then holds that part, oriented like the
/// input. Otherwise returns `false` and sets `line` to [`Line::NULL`].
pub fn clip_line(line: &mut Line, rect: &Rect) -> bool {
    let p1 = -line.dx();
    let p2 = -p1;
    let p3 = -line.dy();
    let p4 = -p3;

    let q1 = line.p1.x - rect.min_x();
    let q2 = rect.max_x() - line.p1.x;
    let q3 = line.p1.y - rect.min_y();
    let q4 = rect.max_y() - line.p1.y;

    // Parallel to an edge and on its outer side.
    if (p1 == 0.0 && q1 < 0.0)
        || (p2 == 0.0 && q2 < 0.0)
        || (p3 == 0.0 && q3 < 0.0)
        || (p4 == 0.0 && q4 < 0.0)
    {
        *line = Line::NULL;
        return false;
    }

    // u_enter is the largest entering parameter, u_exit the smallest
    // leaving one.
    let mut u_enter: f64 = 0.0;
    let mut u_exit: f64 = 1.0;

    if p1 != 0.0 {
        let r1 = q1 / p1;
        let r2 = q2 / p2;
        if p1 < 0.0 {
            u_enter = u_enter.max(r1);
            u_exit = u_exit.min(r2);
        } else {
            u_enter = u_enter.max(r2);
            u_exit = u_exit.min(r1);
        }
    }
    if p3 != 0.0 {
        let r3 = q3 / p3;
        let r4 = q4 / p4;
        if p3 < 0.0 {
            u_enter = u_enter.max(r3);
            u_exit = u_exit.min(r4);
        } else {
            u_enter = u_enter.max(r4);
            u_exit = u_exit.min(r3);
        }
    }

    if u_enter > u_exit {
        *line = Line::NULL;
        return false;
    }

    // Endpoints inside the rectangle are kept bit-exact.
    let start = if u_enter > 0.0 {
        Point::new(
            p2.mul_add(u_enter, line.p1.x),
            p4.mul_add(u_enter, line.p1.y),
        )
    } else {
        line.p1
    };
    let end = if u_exit < 1.0 {
        Point::new(p2.mul_add(u_exit, line.p1.x), p4.mul_add(u_exit, line.p1.y))
    } else {
        line.p2
    };
    *line = Line::new(start, end);
    true
}

/// Clip a polyline to `rect`, splitting it where it leaves the rectangle.
///
/// Each returned polyline has at least two points. Consecutive visible
/// segments that share an endpoint are kept in one piece.
#[must_use = "returns the clipped polyline pieces"]
pub fn clip_polyline_to_rect(points: &[Point], rect: &Rect) -> Vec<Polyline> {
    let mut result = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for window in points.windows(2) {
        let original = Line::new(window[0], window[1]);
        let mut segment = original;
        if !clip_line(&mut segment, rect) {
            flush(&mut current, &mut result);
            continue;
        }

        let continues = current.last() == Some(&segment.p1);
        if !continues {
            flush(&mut current, &mut result);
            current.push(segment.p1);
        }
        current.push(segment.p2);

        // The segment left the rectangle: the piece ends here.
        if segment.p2 != original.p2 {
            flush(&mut current, &mut result);
        }
    }

    flush(&mut current, &mut result);
    result
}

/// Move `current` into `result` if it forms a drawable piece.
fn flush(current: &mut Vec<Point>, result: &mut Vec<Polyline>) {
    if current.len() >= 2 {
        result.push(Polyline::new(std::mem::take(current)));
    } else {
        current.clear();
    }
}
