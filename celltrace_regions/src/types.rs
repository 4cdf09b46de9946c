// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public handle and flag types: region identifiers, store keys, vertex indices.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Persistent identifier of a region within one frame, for example `object12`.
///
/// Ids come from the segmentation data and are what links between frames refer to.
/// They are unique within a frame but not across frames.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Handle of a region inside a [`FrameSegmentation`](crate::FrameSegmentation).
///
/// A slot index plus a generation counter. Removing a region frees its slot; a later
/// insert may reuse the slot with a higher generation, so a stale `RegionKey` never
/// aliases a different live region.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RegionKey(pub(crate) u32, pub(crate) u32);

impl RegionKey {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Position of a vertex in a region's ring.
///
/// Gestures carry a `VertexIndex` instead of a reference to the vertex; it stays valid
/// until the ring is next mutated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VertexIndex(pub usize);

bitflags::bitflags! {
    /// Per-region state flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RegionFlags: u8 {
        /// Annotator marked the region as finished. Persisted.
        const DONE      = 0b0000_0001;
        /// Region is under the pointer (transient).
        const HIGHLIGHT = 0b0000_0010;
        /// Region is the selected/centered one (transient).
        const SELECTED  = 0b0000_0100;
        /// Changed since the last save.
        const UNSAVED   = 0b0000_1000;
        /// Changed in some saved session. Persisted.
        const EDITED    = 0b0001_0000;
    }
}
