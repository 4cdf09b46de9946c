// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hit testing against a frame's regions and their vertex handles.

use celltrace_geometry::distance;
use celltrace_regions::{FrameSegmentation, RegionKey, VertexIndex};
use kurbo::Point;

use crate::mode::EditMode;
use crate::viewport::Viewport;

/// What lies under the pointer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Hit {
    /// Region the pointer acts on.
    pub region: Option<RegionKey>,
    /// Vertex handle of `region` within pick radius (vertex mode only).
    pub handle: Option<VertexIndex>,
}

/// Resolves pointer positions to regions and handles.
///
/// Regions are found with the frame's index: candidates are visited by bounds
/// distance and the first whose outline contains the point wins. Handles are
/// picked among the current region's vertices only, comparing distances in frame
/// pixels against `handle_radius_px / zoom`, so the pick radius stays constant on
/// screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitTester {
    handle_radius_px: f64,
}

impl HitTester {
    /// Create a hit tester with the given handle radius in screen pixels.
    pub fn new(handle_radius_px: f64) -> Self {
        Self { handle_radius_px }
    }

    /// The region containing normalized point `p`.
    pub fn region_at(&self, frame: &FrameSegmentation, p: Point) -> Option<RegionKey> {
        frame.hit_test(p)
    }

    /// The vertex of `key` closest to `p`, if it lies within the pick radius.
    pub fn handle_at(
        &self,
        frame: &FrameSegmentation,
        viewport: &Viewport,
        key: RegionKey,
        p: Point,
    ) -> Option<VertexIndex> {
        let region = frame.get(key)?;
        let radius = self.handle_radius_px / viewport.zoom();
        let m = viewport.to_frame_pixels(p);
        let mut best: Option<(usize, f64)> = None;
        for (i, v) in region.vertices().iter().enumerate() {
            let d = distance(m, viewport.to_frame_pixels(*v));
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.filter(|&(_, d)| d < radius).map(|(i, _)| VertexIndex(i))
    }

    /// Hit test for `mode` at normalized point `p`.
    ///
    /// In vertex mode `current` stays the target when the pointer is over no region,
    /// so a vertex can be added just outside an outline. Paste and trim target no
    /// single region.
    pub fn hit(
        &self,
        frame: &FrameSegmentation,
        viewport: &Viewport,
        mode: EditMode,
        p: Point,
        current: Option<RegionKey>,
    ) -> Hit {
        if !mode.highlights_regions() {
            return Hit::default();
        }
        let found = self.region_at(frame, p);
        if mode != EditMode::Vertex {
            return Hit {
                region: found,
                handle: None,
            };
        }
        let region = found.or(current.filter(|k| frame.is_alive(*k)));
        let handle = region.and_then(|k| self.handle_at(frame, viewport, k, p));
        Hit { region, handle }
    }
}
