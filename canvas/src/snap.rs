//! Endpoint snapping for new strokes.
//!
//! A stroke that starts or ends near an existing stroke's endpoint is pulled
//! onto it so measurements connect cleanly. Only two-point (straight) strokes
//! offer endpoints; freeform and unparsed paths are skipped.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::camera::Point;
use crate::consts::SNAP_RADIUS;
use crate::doc::PathSegment;

/// Find the committed endpoint closest to `query`, strictly within
/// [`SNAP_RADIUS`].
///
/// Paths are scanned most recent first and a candidate replaces the current
/// best only when strictly closer, so ties go to the newest path (and, within
/// one path, to its start).
#[must_use]
pub fn find_closest_endpoint(paths: &[PathSegment], query: Point) -> Option<Point> {
    let mut best_dist = SNAP_RADIUS;
    let mut best = None;
    for segment in paths.iter().rev() {
        let Some((start, end)) = segment.path.endpoints() else {
            continue;
        };
        for candidate in [start, end] {
            let d = query.distance(candidate);
            if d < best_dist {
                best_dist = d;
                best = Some(candidate);
            }
        }
    }
    best
}

/// `query` snapped to a nearby endpoint, or `query` itself.
#[must_use]
pub fn snap_or_raw(paths: &[PathSegment], query: Point) -> Point {
    match find_closest_endpoint(paths, query) {
        Some(snapped) => {
            tracing::debug!(x = query.x, y = query.y, snap_x = snapped.x, snap_y = snapped.y, "snapped to endpoint");
            snapped
        }
        None => query,
    }
}
