// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned boxes and the metrics the backends need.

use core::cmp::Ordering;

/// Axis-aligned bounding box in 2D, in frame-normalized coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D {
    /// Minimum x (left)
    pub min_x: f64,
    /// Minimum y (top)
    pub min_y: f64,
    /// Maximum x (right)
    pub max_x: f64,
    /// Maximum y (bottom)
    pub max_y: f64,
}

impl Aabb2D {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an AABB from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// The smallest AABB containing both corner points, in any order.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// The intersection of two AABBs. May be empty; see [`Aabb2D::is_empty`].
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Whether the two AABBs share at least one point (touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// The smallest AABB containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Return true if the AABB is inverted. Zero-area boxes are not empty.
    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Center of the box.
    pub fn center(&self) -> (f64, f64) {
        (
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
        )
    }

    /// Area of the box; inverted boxes have zero area.
    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x).max(0.0) * (self.max_y - self.min_y).max(0.0)
    }

    /// Squared distance from a point to the nearest point of the box.
    ///
    /// Zero when the point lies inside or on the boundary.
    pub fn distance_squared_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = axis_gap(x, self.min_x, self.max_x);
        let dy = axis_gap(y, self.min_y, self.max_y);
        dx * dx + dy * dy
    }
}

fn axis_gap(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        lo - v
    } else if v > hi {
        v - hi
    } else {
        0.0
    }
}

/// Order two distances, treating NaN as equal. Inputs are assumed finite.
pub(crate) fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb2D::new(0.0, 0.0, 1.0, 1.0);
        let b = Aabb2D::new(1.0, 0.0, 2.0, 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&Aabb2D::new(1.5, 0.0, 2.0, 1.0)));
    }

    #[test]
    fn point_distance_is_zero_inside() {
        let a = Aabb2D::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(a.distance_squared_to_point(0.5, 0.5), 0.0);
        assert_eq!(a.distance_squared_to_point(2.0, 0.5), 1.0);
        assert_eq!(a.distance_squared_to_point(4.0, 5.0), 25.0);
    }

    #[test]
    fn corners_in_any_order() {
        let a = Aabb2D::from_corners(1.0, 0.0, 0.0, 2.0);
        assert_eq!(a, Aabb2D::new(0.0, 0.0, 1.0, 2.0));
        assert_eq!(a.center(), (0.5, 1.0));
        assert_eq!(a.area(), 2.0);
    }
}
