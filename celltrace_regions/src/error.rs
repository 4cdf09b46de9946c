// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for loading regions and for rejected edits.

use crate::types::{RegionId, RegionKey};

/// Failures while constructing or loading regions.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// An outline with fewer than three vertices.
    #[error("region {id} has {count} vertices; at least 3 are required")]
    TooFewVertices {
        /// Offending region.
        id: RegionId,
        /// Number of vertices it had.
        count: usize,
    },
    /// Two regions of one frame share an id.
    #[error("duplicate region id {0} in frame")]
    DuplicateId(RegionId),
    /// A lookup by id found nothing.
    #[error("no region with id {0}")]
    UnknownRegion(RegionId),
    /// The serialized form could not be parsed.
    #[error("invalid segmentation json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rejected edit. The store is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Removing a vertex from a triangle.
    #[error("region would drop below 3 vertices")]
    MinimumVertices,
    /// A cut line must enter and leave the outline.
    #[error("line crosses the outline {count} times; an even count is required")]
    OddIntersections {
        /// Number of crossings found.
        count: usize,
    },
    /// A cut line that misses the outline.
    #[error("line does not cross the outline")]
    NotCrossed,
    /// Merge found no pair of seam vertices.
    #[error("no seam found between the two outlines")]
    NoSeam,
    /// A cut or merge result would not be a polygon.
    #[error("edit would produce an outline with fewer than 3 vertices")]
    DegenerateSection,
    /// The key is stale or belongs to another frame.
    #[error("unknown or stale region key {0:?}")]
    UnknownRegion(RegionKey),
    /// Vertex index past the end of the ring.
    #[error("vertex {index} out of range for a ring of {len}")]
    UnknownVertex {
        /// Requested index.
        index: usize,
        /// Ring length.
        len: usize,
    },
    /// Merge was asked to merge a region into itself.
    #[error("cannot merge a region with itself")]
    SameRegion,
    /// Links always point into the following frame.
    #[error("frame {0} has no next frame to link into")]
    NoNextFrame(usize),
    /// Frame index out of range.
    #[error("no frame {0}")]
    UnknownFrame(usize),
    /// Paste without a prior copy.
    #[error("nothing has been copied")]
    EmptyClipboard,
}
