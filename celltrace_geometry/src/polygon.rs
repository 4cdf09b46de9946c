// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygons as implicitly closed vertex rings.
//!
//! A ring `[v0, v1, .., vn-1]` has edges `vi -> v(i+1) mod n`; edge `i` starts at vertex `i`.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::segment::{distance, distance_squared, point_segment_distance, segment_intersection};

/// Even-odd test of `p` against the ring, casting a horizontal ray toward `+x`.
///
/// Rings with two or fewer vertices always report `true`. They are not polygons,
/// and callers historically treat them as a hit rather than an error.
///
/// When `bbox` is provided, points outside it are rejected without walking the
/// ring. The box must be the ring's bounding box (see [`bounding_box`]).
pub fn point_in_polygon(p: Point, ring: &[Point], bbox: Option<Rect>) -> bool {
    if ring.len() <= 2 {
        return true;
    }
    if let Some(b) = bbox
        && (p.x < b.x0 || p.x > b.x1 || p.y < b.y0 || p.y > b.y1)
    {
        return false;
    }
    let mut inside = false;
    let mut p0 = ring[ring.len() - 1];
    for &p1 in ring {
        if p.y > p0.y.min(p1.y)
            && p.y <= p0.y.max(p1.y)
            && p.x <= p0.x.max(p1.x)
            && p0.y != p1.y
        {
            let x_int = (p.y - p0.y) * (p1.x - p0.x) / (p1.y - p0.y) + p0.x;
            if p0.x == p1.x || p.x <= x_int {
                inside = !inside;
            }
        }
        p0 = p1;
    }
    inside
}

/// Axis-aligned bounds of the ring, or `None` when it is empty.
pub fn bounding_box(ring: &[Point]) -> Option<Rect> {
    let (first, rest) = ring.split_first()?;
    Some(rest.iter().fold(Rect::from_points(*first, *first), |r, p| {
        r.union_pt(*p)
    }))
}

/// Translate every vertex by `delta`.
pub fn translate(ring: &[Point], delta: Vec2) -> Vec<Point> {
    ring.iter().map(|p| *p + delta).collect()
}

/// Rotate every vertex by `theta` radians about `center`.
pub fn rotate_about(ring: &[Point], center: Point, theta: f64) -> Vec<Point> {
    let xf = Affine::rotate_about(theta, center);
    ring.iter().map(|p| xf * *p).collect()
}

/// Length of the closed boundary.
pub fn perimeter(ring: &[Point]) -> f64 {
    edges(ring).map(|(a, b)| distance(a, b)).sum()
}

/// Length of an open path through the points, without the closing edge.
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Iterate the ring's edges, including the closing one.
pub fn edges(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// Distance within which a ring vertex counts as lying on a cut line.
const ON_LINE: f64 = 1e-12;

/// Where segment `ab` crosses the ring, as `(edge index, point)` in edge order.
///
/// Each edge is crossed at most once; edges collinear with `ab` report nothing.
/// A cut through a vertex is reported once, on the edge ending there, with the vertex
/// itself as the point, and only when the neighbouring vertices lie on opposite
/// sides of the line. A line that grazes a vertex does not cross the ring there.
pub fn edge_crossings(ring: &[Point], a: Point, b: Point) -> Vec<(usize, Point)> {
    let n = ring.len();
    let ab = b - a;
    let len = ab.hypot();
    if n < 2 || len == 0.0 {
        return Vec::new();
    }
    let side = |p: Point| ab.cross(p - a) / len;
    let on_cut = |p: Point| {
        let t = (p - a).dot(ab) / (len * len);
        side(p).abs() <= ON_LINE && (0.0..=1.0).contains(&t)
    };
    let mut out = Vec::new();
    for (i, (p0, p1)) in edges(ring).enumerate() {
        if on_cut(p1) {
            let (before, after) = (side(p0), side(ring[(i + 2) % n]));
            if before.abs() > ON_LINE && after.abs() > ON_LINE && (before < 0.0) != (after < 0.0) {
                out.push((i, p1));
            }
        } else if !on_cut(p0)
            && let Some(x) = segment_intersection(p0, p1, a, b)
        {
            out.push((i, x));
        }
    }
    out
}

/// Unsigned area enclosed by the ring (shoelace formula).
pub fn area(ring: &[Point]) -> f64 {
    let twice: f64 = edges(ring).map(|(p, q)| p.to_vec2().cross(q.to_vec2())).sum();
    twice.abs() / 2.0
}

/// The edge closest to `p`. Ties go to the lowest edge index.
pub fn nearest_edge(ring: &[Point], p: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, (a, b)) in edges(ring).enumerate() {
        let d = point_segment_distance(p, a, b);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// The vertex closest to `p` with its distance. Ties go to the lowest index.
pub fn nearest_vertex(ring: &[Point], p: Point) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in ring.iter().enumerate() {
        let d2 = distance_squared(p, *v);
        if best.is_none_or(|(_, bd)| d2 < bd) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, d2)| (i, d2.sqrt()))
}
