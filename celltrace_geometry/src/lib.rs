// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Celltrace Geometry: the point, segment, and polygon math behind outline editing.
//!
//! Every function is pure and works on [`kurbo`] types in frame-normalized coordinates.
//! Polygons are plain vertex rings (`&[Point]`), implicitly closed.
//!
//! - Segments: [`normalize`], [`distance`], [`closest_point_on_segment`],
//!   [`point_segment_distance`], [`segment_intersection`].
//! - Rings: [`point_in_polygon`], [`area`], [`bounding_box`], [`translate`], [`rotate_about`],
//!   [`perimeter`], [`edge_crossings`], [`nearest_edge`], [`nearest_vertex`].
//!
//! Degenerate input never panics. Zero-length segments do not intersect anything and
//! rings of two or fewer vertices contain every point.
//!
//! ```
//! use celltrace_geometry::{bounding_box, point_in_polygon};
//! use kurbo::Point;
//!
//! let tri = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.5, 1.0)];
//! let bbox = bounding_box(&tri);
//! assert!(point_in_polygon(Point::new(0.5, 0.3), &tri, bbox));
//! assert!(!point_in_polygon(Point::new(0.9, 0.9), &tri, bbox));
//! ```

mod polygon;
mod segment;

pub use polygon::{
    area, bounding_box, edge_crossings, edges, nearest_edge, nearest_vertex, path_length, perimeter,
    point_in_polygon, rotate_about, translate,
};
pub use segment::{
    closest_point_on_segment, distance, distance_squared, normalize, point_segment_distance,
    segment_intersection,
};
