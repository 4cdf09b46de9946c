// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Working state of one press-drag-release gesture.
//!
//! Drags edit the frame live so the outline follows the pointer. The gesture keeps
//! a snapshot of the region and the frame's edited flag as they were at press
//! time; cancelling puts the snapshot back, leaving the frame as if the gesture
//! never happened.

use celltrace_regions::{EditError, FrameSegmentation, RegionKey, RegionSnapshot, VertexIndex};
use kurbo::{Line, Point, Vec2};

use crate::hit::Hit;
use crate::viewport::Viewport;

/// What the gesture is doing.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureKind {
    /// A press that acts on release.
    Click,
    /// Dragging one vertex handle.
    Handle {
        /// Region being edited.
        key: RegionKey,
        /// Dragged vertex.
        vertex: VertexIndex,
        /// The region at press time.
        snapshot: RegionSnapshot,
    },
    /// Moving or rotating a whole region.
    Region {
        /// Region being edited.
        key: RegionKey,
        /// The region at press time.
        snapshot: RegionSnapshot,
    },
    /// Drawing a split or trim line from the press point.
    Cut {
        /// Current line, from press to pointer.
        line: Line,
    },
    /// Panning the viewport.
    Pan {
        /// View center at press time.
        origin: Point,
    },
}

/// A gesture from pointer down to pointer up.
#[derive(Clone, Debug, PartialEq)]
pub struct Gesture {
    /// Press position in canvas pixels.
    pub start_px: Point,
    /// Press position in normalized frame coordinates.
    pub start: Point,
    /// What was under the pointer at press time.
    pub hit: Hit,
    /// Whether the pointer moved while pressed.
    pub moved: bool,
    /// Mode-specific state.
    pub kind: GestureKind,
}

impl Gesture {
    /// Start a gesture.
    pub fn new(start_px: Point, start: Point, hit: Hit, kind: GestureKind) -> Self {
        Self {
            start_px,
            start,
            hit,
            moved: false,
            kind,
        }
    }

    /// Pointer offset from the press position, in canvas pixels.
    pub fn drag_px(&self, px: Point) -> Vec2 {
        px - self.start_px
    }

    /// The cut line, for cut gestures.
    pub fn cut_line(&self) -> Option<Line> {
        match self.kind {
            GestureKind::Cut { line } => Some(line),
            _ => None,
        }
    }

    /// Region snapshot taken at press time, for drag gestures.
    pub fn snapshot(&self) -> Option<(RegionKey, &RegionSnapshot)> {
        match &self.kind {
            GestureKind::Handle { key, snapshot, .. } | GestureKind::Region { key, snapshot } => {
                Some((*key, snapshot))
            }
            _ => None,
        }
    }

    /// Abandon the gesture, undoing any live edits and pans.
    pub fn cancel(
        self,
        frame: &mut FrameSegmentation,
        viewport: &mut Viewport,
    ) -> Result<(), EditError> {
        match self.kind {
            GestureKind::Handle { key, snapshot, .. } | GestureKind::Region { key, snapshot } => {
                if self.moved {
                    frame.restore(key, snapshot)?;
                }
            }
            GestureKind::Pan { origin } => viewport.set_center(origin),
            GestureKind::Click | GestureKind::Cut { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celltrace_regions::{Region, RegionId};
    use kurbo::Size;

    #[test]
    fn cancel_restores_dragged_vertex() {
        let mut frame = FrameSegmentation::new();
        let tri = Region::new(
            RegionId::from("object1"),
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.5, 0.0),
                Point::new(0.0, 0.5),
            ],
        )
        .unwrap();
        let key = frame.insert(tri.clone()).unwrap();
        frame.mark_saved();
        let mut vp = Viewport::new(Size::new(100.0, 100.0));

        let mut g = Gesture::new(
            Point::ZERO,
            Point::ZERO,
            Hit::default(),
            GestureKind::Handle {
                key,
                vertex: VertexIndex(1),
                snapshot: frame.snapshot(key).unwrap(),
            },
        );
        frame
            .move_vertex(key, VertexIndex(1), Point::new(0.75, 0.25))
            .unwrap();
        assert!(frame.is_edited());
        g.moved = true;
        g.cancel(&mut frame, &mut vp).unwrap();
        assert_eq!(frame.get(key).unwrap().vertices(), tri.vertices());
        assert_eq!(frame.hit_test(Point::new(0.6, 0.1)), None);
        assert!(!frame.is_edited());
    }

    #[test]
    fn cancel_restores_pan() {
        let mut frame = FrameSegmentation::new();
        let mut vp = Viewport::new(Size::new(100.0, 100.0));
        let g = Gesture::new(
            Point::ZERO,
            Point::ZERO,
            Hit::default(),
            GestureKind::Pan {
                origin: vp.center(),
            },
        );
        vp.pan_from(vp.center(), Vec2::new(10.0, 0.0));
        g.cancel(&mut frame, &mut vp).unwrap();
        assert_eq!(vp.center(), Point::new(0.5, 0.5));
    }
}
