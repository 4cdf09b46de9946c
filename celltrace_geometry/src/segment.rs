// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point and segment primitives.

use kurbo::{Point, Vec2};

/// Unit vector in the direction of `v`, or zero for a zero vector.
pub fn normalize(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len == 0.0 {
        return Vec2::ZERO;
    }
    // Per component: `Vec2 / f64` multiplies by the reciprocal.
    Vec2::new(v.x / len, v.y / len)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Squared Euclidean distance between two points.
pub fn distance_squared(a: Point, b: Point) -> f64 {
    a.distance_squared(b)
}

/// The point of segment `ab` closest to `p`.
///
/// The projection parameter is clamped to `[0, 1]`. A zero-length segment returns `a`.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to the segment `ab`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    distance(p, closest_point_on_segment(p, a, b))
}

/// Intersection of segments `p1p2` and `p3p4`.
///
/// Returns `None` when either segment has zero length, when the segments are
/// parallel or coincident, or when the crossing lies outside either segment.
/// Endpoints count as on the segment.
///
/// ```
/// use celltrace_geometry::segment_intersection;
/// use kurbo::Point;
///
/// let hit = segment_intersection(
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
///     Point::new(1.0, 0.0),
/// );
/// assert_eq!(hit, Some(Point::new(0.5, 0.5)));
/// ```
pub fn segment_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    if p1 == p2 || p3 == p4 {
        return None;
    }
    let d12 = p2 - p1;
    let d34 = p4 - p3;
    let denom = d34.y * d12.x - d34.x * d12.y;
    if denom == 0.0 {
        return None;
    }
    let d31 = p1 - p3;
    let ua = (d34.x * d31.y - d34.y * d31.x) / denom;
    let ub = (d12.x * d31.y - d12.y * d31.x) / denom;
    if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
        return None;
    }
    Some(Point::new(p1.x + ua * d12.x, p1.y + ua * d12.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(normalize(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(normalize(Vec2::new(3.0, 4.0)), Vec2::new(0.6, 0.8));
        assert_eq!(normalize(Vec2::new(0.0, -2.5)), Vec2::new(0.0, -1.0));
        assert!((normalize(Vec2::new(1e-9, 7e-9)).hypot() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(closest_point_on_segment(Point::new(0.5, 2.0), a, b), Point::new(0.5, 0.0));
        assert_eq!(closest_point_on_segment(Point::new(-3.0, 1.0), a, b), a);
        assert_eq!(closest_point_on_segment(Point::new(4.0, -1.0), a, b), b);
        assert_eq!(closest_point_on_segment(Point::new(4.0, -1.0), a, a), a);
        assert_eq!(point_segment_distance(Point::new(0.5, 2.0), a, b), 2.0);
        assert_eq!(point_segment_distance(Point::new(4.0, 4.0), a, b), 5.0);
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn degenerate_and_disjoint_segments() {
        let o = Point::new(0.0, 0.0);
        assert_eq!(segment_intersection(o, o, o, Point::new(1.0, 1.0)), None);
        // Collinear overlap is reported as no intersection.
        assert_eq!(
            segment_intersection(o, Point::new(2.0, 0.0), Point::new(1.0, 0.0), Point::new(3.0, 0.0)),
            None
        );
        // Lines cross, but beyond the end of the second segment.
        assert_eq!(
            segment_intersection(
                o,
                Point::new(1.0, 1.0),
                Point::new(0.0, 3.0),
                Point::new(1.0, 2.0)
            ),
            None
        );
    }

    #[test]
    fn shared_endpoint_counts() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        );
        assert_eq!(hit, Some(Point::new(1.0, 0.0)));
    }
}
