// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edit modes.

use serde::{Deserialize, Serialize};

/// What a pointer gesture on the canvas does.
///
/// Serialized names are camel case (`"vertex"`, `"regionSplit"`, ...), the names a
/// toolbar would send.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditMode {
    /// Click on an edge to add a vertex, click a handle to remove it, drag a handle to move it.
    #[default]
    Vertex,
    /// Click a region to remove it, click empty space to seed a new one.
    RegionEdit,
    /// Drag a region.
    RegionMove,
    /// Drag around a region's center to rotate it.
    RegionRotate,
    /// Click two regions to merge the second into the first.
    RegionMerge,
    /// Drag a line across a region to split it in two.
    RegionSplit,
    /// Drag a line to trim every region it cuts.
    RegionTrim,
    /// Click a region to copy its outline.
    RegionCopy,
    /// Click to paste the copied outline.
    RegionPaste,
    /// Click a region, then a region in the next frame, to link them.
    RegionLink,
    /// Click a region to toggle the current label.
    RegionLabel,
    /// Click to select and zoom, drag to pan.
    RegionSelect,
}

impl EditMode {
    /// Whether hovering highlights the region under the pointer.
    pub fn highlights_regions(self) -> bool {
        !matches!(self, Self::RegionPaste | Self::RegionTrim)
    }

    /// The mode to switch to after this mode commits an edit.
    pub fn after_commit(self) -> Self {
        match self {
            Self::RegionCopy | Self::RegionPaste => Self::RegionPaste,
            Self::RegionLink | Self::RegionLabel | Self::RegionSelect => self,
            _ => Self::Vertex,
        }
    }
}
