// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serialized shape of a region, as exchanged with the persistence layer.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::error::RegionError;
use crate::region::Region;
use crate::types::{RegionFlags, RegionId};

/// One region as stored on disk or sent over the wire.
///
/// `min`, `max`, and `center` are written for consumers that want them but ignored
/// on load; they are always recomputed from `vertices`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Region id, unique within its frame.
    pub id: RegionId,
    /// Outline as `[x, y]` pairs in frame-normalized coordinates.
    pub vertices: Vec<[f64; 2]>,
    /// Trajectory id, if one has been generated.
    #[serde(default)]
    pub trajectory_id: Option<String>,
    /// Id of the linked region in the next frame.
    #[serde(default)]
    pub link_id: Option<RegionId>,
    /// Finished by the annotator.
    #[serde(default)]
    pub done: bool,
    /// Attached labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Changed in a saved editing session.
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub edited: bool,
    /// Bounds minimum.
    #[serde(default)]
    pub min: [f64; 2],
    /// Bounds maximum.
    #[serde(default)]
    pub max: [f64; 2],
    /// Bounds center.
    #[serde(default)]
    pub center: [f64; 2],
}

impl From<&Region> for RegionRecord {
    fn from(r: &Region) -> Self {
        let b = r.bounds();
        Self {
            id: r.id().clone(),
            vertices: r.vertices().iter().map(|p| [p.x, p.y]).collect(),
            trajectory_id: r.trajectory_id().map(str::to_owned),
            link_id: r.link_id().cloned(),
            done: r.is_done(),
            labels: r.labels().to_vec(),
            edited: r.flags().intersects(RegionFlags::EDITED | RegionFlags::UNSAVED),
            min: [b.x0, b.y0],
            max: [b.x1, b.y1],
            center: [r.center().x, r.center().y],
        }
    }
}

impl TryFrom<RegionRecord> for Region {
    type Error = RegionError;

    fn try_from(rec: RegionRecord) -> Result<Self, Self::Error> {
        let vertices = rec.vertices.iter().map(|&[x, y]| Point::new(x, y)).collect();
        let mut region = Self::new(rec.id, vertices)?;
        region.set_trajectory_id(rec.trajectory_id);
        region.set_link_id(rec.link_id);
        region.set_flag(RegionFlags::DONE, rec.done);
        region.set_flag(RegionFlags::EDITED, rec.edited);
        for label in &rec.labels {
            if !region.has_label(label) {
                region.toggle_label(label);
            }
        }
        Ok(region)
    }
}
