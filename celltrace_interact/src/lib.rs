// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Celltrace Interact: pointer-driven editing of cell segmentations.
//!
//! ## Overview
//!
//! This crate sits between a canvas and [`celltrace_regions`]. It turns pointer
//! events into editing operations and reports what changed. It does not draw.
//!
//! - [`EditMode`] selects what a gesture does.
//! - [`Viewport`] maps canvas pixels to frame-normalized coordinates and owns zoom.
//! - [`HitTester`] finds the region under the pointer (nearest bounds first,
//!   confirmed by point-in-polygon) and, in vertex mode, the vertex handle within a
//!   fixed on-screen radius.
//! - [`HighlightState`] reports highlight transitions only when they happen.
//! - [`Gesture`] holds press-to-release working state; cancelling it restores the
//!   region snapshot so an abandoned drag leaves nothing behind.
//! - [`Clipboard`] and [`EditHistory`] back copy/paste and undo/redo.
//! - [`EditSession`] ties these together and notifies an [`EditObserver`].
//!
//! ## Example
//!
//! ```
//! use celltrace_interact::{EditEvent, EditMode, EditSession};
//! use celltrace_regions::{EditConfig, FrameSegmentation, Segmentation};
//! use kurbo::{Point, Size};
//!
//! let frames = Segmentation::new(vec![FrameSegmentation::new()]);
//! let mut session = EditSession::new(frames, EditConfig::default(), Size::new(256.0, 256.0), 256.0);
//! let mut events: Vec<EditEvent> = Vec::new();
//!
//! // Seed a region by clicking empty space.
//! session.set_mode(EditMode::RegionEdit);
//! session.pointer_down(Point::new(128.0, 128.0), &mut events);
//! session.pointer_up(Point::new(128.0, 128.0), &mut events).unwrap();
//!
//! assert_eq!(session.frame().unwrap().len(), 1);
//! assert_eq!(session.mode(), EditMode::Vertex);
//! assert!(events.iter().any(|e| matches!(e, EditEvent::Edited { frame: 0, .. })));
//!
//! assert!(session.undo(&mut events));
//! assert!(session.frame().unwrap().is_empty());
//! ```

mod clipboard;
mod gesture;
mod highlight;
mod history;
mod hit;
mod mode;
mod observer;
mod session;
mod viewport;

pub use clipboard::Clipboard;
pub use gesture::{Gesture, GestureKind};
pub use highlight::{HighlightChange, HighlightState};
pub use history::EditHistory;
pub use hit::{Hit, HitTester};
pub use mode::EditMode;
pub use observer::{EditEvent, EditObserver};
pub use session::EditSession;
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Viewport, ZOOM_STEP};
