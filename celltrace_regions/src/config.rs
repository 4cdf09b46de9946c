// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunable editing parameters.

use serde::{Deserialize, Serialize};

/// Editing parameters. Every field has a default, so a partial JSON object is enough.
///
/// ```
/// use celltrace_regions::EditConfig;
///
/// let cfg = EditConfig::from_json_str(r#"{ "history_depth": 25 }"#).unwrap();
/// assert_eq!(cfg.history_depth, 25);
/// assert_eq!(cfg.merge_threshold_factor, 1.25);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Merge seam candidates are vertex pairs closer than this factor times the
    /// second-smallest pair distance.
    pub merge_threshold_factor: f64,
    /// Half-width of the gap a split leaves, in image pixels.
    pub split_offset_px: f64,
    /// Pick radius of vertex handles, in canvas pixels at zoom 1.
    pub handle_radius_px: f64,
    /// Seed radius for new regions in a frame with no regions.
    pub default_region_radius: f64,
    /// Number of undo steps kept.
    pub history_depth: usize,
    /// Prefix of generated region ids.
    pub id_prefix: String,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            merge_threshold_factor: 1.25,
            split_offset_px: 1.5,
            handle_radius_px: 5.0,
            default_region_radius: 0.01,
            history_depth: 10,
            id_prefix: String::from("object"),
        }
    }
}

impl EditConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Normalized split offset for a frame `image_width` pixels wide.
    pub fn split_offset(&self, image_width: f64) -> f64 {
        if image_width > 0.0 {
            self.split_offset_px / image_width
        } else {
            0.0
        }
    }

    /// Handle pick radius in canvas pixels at the given zoom.
    pub fn handle_radius(&self, zoom: f64) -> f64 {
        self.handle_radius_px / zoom
    }
}
