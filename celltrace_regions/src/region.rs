// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The region record: one closed outline plus its tracking and annotation state.

use celltrace_geometry::{bounding_box, point_in_polygon};
use celltrace_index::Aabb2D;
use kurbo::{Point, Rect};

use crate::error::RegionError;
use crate::types::{RegionFlags, RegionId};

/// A closed outline of one tracked object in one frame.
///
/// The vertex ring always holds at least three points. `bounds` and `center` are
/// derived from the ring and recomputed on every change; there is no way to set
/// them independently.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    id: RegionId,
    vertices: Vec<Point>,
    bounds: Rect,
    center: Point,
    trajectory_id: Option<String>,
    link_id: Option<RegionId>,
    labels: Vec<String>,
    flags: RegionFlags,
}

impl Region {
    /// Create a region from a vertex ring.
    pub fn new(id: RegionId, vertices: Vec<Point>) -> Result<Self, RegionError> {
        if vertices.len() < 3 {
            return Err(RegionError::TooFewVertices {
                count: vertices.len(),
                id,
            });
        }
        let mut region = Self {
            id,
            vertices: Vec::new(),
            bounds: Rect::ZERO,
            center: Point::ZERO,
            trajectory_id: None,
            link_id: None,
            labels: Vec::new(),
            flags: RegionFlags::empty(),
        };
        region.set_vertices(vertices);
        Ok(region)
    }

    /// Persistent id.
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    /// The vertex ring, implicitly closed.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Axis-aligned bounds of the ring.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Center of [`Region::bounds`].
    pub fn center(&self) -> Point {
        self.center
    }

    /// Trajectory this region belongs to, once assigned.
    pub fn trajectory_id(&self) -> Option<&str> {
        self.trajectory_id.as_deref()
    }

    /// Id of the matching region in the next frame.
    pub fn link_id(&self) -> Option<&RegionId> {
        self.link_id.as_ref()
    }

    /// Labels attached to the region, in the order they were added.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether the region carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// State flags.
    pub fn flags(&self) -> RegionFlags {
        self.flags
    }

    /// Shorthand for the [`RegionFlags::DONE`] flag.
    pub fn is_done(&self) -> bool {
        self.flags.contains(RegionFlags::DONE)
    }

    /// Exact containment test, with the bounds as a fast reject.
    pub fn contains(&self, p: Point) -> bool {
        point_in_polygon(p, &self.vertices, Some(self.bounds))
    }

    /// Bounds in the index's box type.
    pub fn aabb(&self) -> Aabb2D {
        let b = self.bounds;
        Aabb2D::new(b.x0, b.y0, b.x1, b.y1)
    }

    /// Replace the ring and recompute derived geometry.
    ///
    /// Callers guarantee at least three vertices.
    pub(crate) fn set_vertices(&mut self, vertices: Vec<Point>) {
        debug_assert!(vertices.len() >= 3, "ring below 3 vertices");
        self.vertices = vertices;
        self.refresh_geometry();
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut Vec<Point> {
        &mut self.vertices
    }

    pub(crate) fn refresh_geometry(&mut self) {
        self.bounds = bounding_box(&self.vertices).unwrap_or(Rect::ZERO);
        self.center = self.bounds.center();
    }

    pub(crate) fn set_trajectory_id(&mut self, trajectory: Option<String>) {
        self.trajectory_id = trajectory;
    }

    pub(crate) fn set_link_id(&mut self, link: Option<RegionId>) {
        self.link_id = link;
    }

    pub(crate) fn set_flag(&mut self, flag: RegionFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Add `label` if absent, remove it if present. Returns whether it is now present.
    pub(crate) fn toggle_label(&mut self, label: &str) -> bool {
        if let Some(i) = self.labels.iter().position(|l| l == label) {
            self.labels.remove(i);
            false
        } else {
            self.labels.push(label.to_owned());
            true
        }
    }
}
