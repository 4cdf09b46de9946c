// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Celltrace Regions: spatially indexed cell outlines and the edits that reshape them.
//!
//! A [`Region`] is a closed polygon outlining one tracked cell in one frame of a
//! time-lapse. Each frame's regions live in a [`FrameSegmentation`], which keeps an
//! R-tree over their bounds ([`celltrace_index`]) in lockstep with every edit; the
//! frames of an experiment form a [`Segmentation`], where links between consecutive
//! frames define trajectories.
//!
//! ## API overview
//!
//! - [`FrameSegmentation`]: store plus index for one frame. Regions are addressed by
//!   generational [`RegionKey`]s and vertices by [`VertexIndex`].
//! - Editing: [`add_vertex`](FrameSegmentation::add_vertex),
//!   [`remove_vertex`](FrameSegmentation::remove_vertex),
//!   [`move_vertex`](FrameSegmentation::move_vertex),
//!   [`move_region`](FrameSegmentation::move_region),
//!   [`rotate_region`](FrameSegmentation::rotate_region),
//!   [`merge_regions`](FrameSegmentation::merge_regions),
//!   [`split_region`](FrameSegmentation::split_region),
//!   [`trim_region`](FrameSegmentation::trim_region),
//!   [`add_region`](FrameSegmentation::add_region),
//!   [`remove_region`](FrameSegmentation::remove_region),
//!   [`copy_region`](FrameSegmentation::copy_region) and
//!   [`paste_region`](FrameSegmentation::paste_region).
//! - Queries: [`hit_test`](FrameSegmentation::hit_test) (bounds-nearest candidates
//!   refined by an exact point-in-polygon test),
//!   [`visible_regions`](FrameSegmentation::visible_regions) and
//!   [`regions_crossing`](FrameSegmentation::regions_crossing).
//! - [`Segmentation`]: links, trajectory ids, and JSON load/save via [`RegionRecord`].
//! - [`EditConfig`]: the tunable constants.
//!
//! ## Failure model
//!
//! Edits that cannot be applied (removing a vertex from a triangle, cutting along a
//! line that crosses the outline an odd number of times, merging outlines with no
//! seam) return an [`EditError`] and leave the frame untouched. Nothing panics on
//! degenerate geometry.
//!
//! ## Example
//!
//! ```
//! use celltrace_regions::{EditConfig, FrameSegmentation};
//! use kurbo::{Line, Point};
//!
//! let cfg = EditConfig::default();
//! let mut frame = FrameSegmentation::with_id_prefix(&cfg.id_prefix);
//!
//! // Seed a region and find it again by pointing inside it.
//! let key = frame.add_region(Point::new(0.5, 0.5), 0.1).unwrap();
//! assert_eq!(frame.hit_test(Point::new(0.5, 0.5)), Some(key));
//!
//! // Cut it in two along a vertical line.
//! let offset = cfg.split_offset(512.0);
//! let left = frame
//!     .split_region(key, Line::new((0.48, 0.0), (0.48, 1.0)), offset)
//!     .unwrap();
//! assert_eq!(frame.len(), 2);
//! assert_eq!(frame.get(left).unwrap().id().as_str(), "object2");
//!
//! // A line ending inside the outline crosses it once; the cut is rejected.
//! let stub = Line::new((0.52, 0.0), (0.52, 0.5));
//! assert!(frame.split_region(key, stub, offset).is_err());
//! assert_eq!(frame.len(), 2);
//! ```

mod config;
mod edit;
mod error;
mod frame;
mod ids;
mod record;
mod region;
mod segmentation;
mod types;

pub use config::EditConfig;
pub use error::{EditError, RegionError};
pub use frame::{FrameSegmentation, RegionSnapshot};
pub use ids::next_region_id;
pub use record::RegionRecord;
pub use region::Region;
pub use segmentation::{COLLISION, DanglingLink, Segmentation};
pub use types::{RegionFlags, RegionId, RegionKey, VertexIndex};
