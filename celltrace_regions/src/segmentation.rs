// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! All frames of an experiment, the links between them, and trajectory ids.

use tracing::{debug, warn};

use crate::error::{EditError, RegionError};
use crate::frame::FrameSegmentation;
use crate::record::RegionRecord;
use crate::region::Region;
use crate::types::{RegionId, RegionKey};

/// Trajectory marker for a region reached by more than one link.
pub const COLLISION: &str = "collision";

/// A link whose target id is missing from the next frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DanglingLink {
    /// Frame holding the linking region.
    pub frame: usize,
    /// The linking region.
    pub region: RegionId,
    /// The id it points at.
    pub link: RegionId,
}

/// One [`FrameSegmentation`] per frame, in frame order.
#[derive(Clone, Debug, Default)]
pub struct Segmentation {
    frames: Vec<FrameSegmentation>,
}

impl Segmentation {
    /// Wrap already-built frames.
    pub fn new(frames: Vec<FrameSegmentation>) -> Self {
        Self { frames }
    }

    /// Build every frame from its records.
    pub fn from_records(
        prefix: &str,
        frames: impl IntoIterator<Item = Vec<RegionRecord>>,
    ) -> Result<Self, RegionError> {
        let frames = frames
            .into_iter()
            .map(|records| FrameSegmentation::from_records(prefix, records))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { frames })
    }

    /// Parse a JSON array of frames, each an array of region records.
    pub fn from_json_str(json: &str, prefix: &str) -> Result<Self, RegionError> {
        let frames: Vec<Vec<RegionRecord>> = serde_json::from_str(json)?;
        Self::from_records(prefix, frames)
    }

    /// Records of every frame.
    pub fn to_records(&self) -> Vec<Vec<RegionRecord>> {
        self.frames.iter().map(FrameSegmentation::to_records).collect()
    }

    /// Serialize as a JSON array of frames.
    pub fn to_json_string(&self) -> Result<String, RegionError> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// One frame.
    pub fn frame(&self, index: usize) -> Option<&FrameSegmentation> {
        self.frames.get(index)
    }

    /// One frame, mutably.
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut FrameSegmentation> {
        self.frames.get_mut(index)
    }

    /// One frame, or [`EditError::UnknownFrame`].
    pub fn try_frame_mut(&mut self, index: usize) -> Result<&mut FrameSegmentation, EditError> {
        self.frames.get_mut(index).ok_or(EditError::UnknownFrame(index))
    }

    /// All frames in order.
    pub fn frames(&self) -> impl Iterator<Item = &FrameSegmentation> + '_ {
        self.frames.iter()
    }

    /// Whether any frame has unsaved changes.
    pub fn is_edited(&self) -> bool {
        self.frames.iter().any(FrameSegmentation::is_edited)
    }

    /// Mark every frame saved.
    pub fn mark_saved(&mut self) {
        self.frames.iter_mut().for_each(FrameSegmentation::mark_saved);
    }

    /// Mean bounds width and height over every region of every frame.
    pub fn mean_region_size(&self) -> Option<(f64, f64)> {
        let (mut w, mut h, mut n) = (0.0, 0.0, 0_u32);
        for (_, r) in self.frames.iter().flat_map(FrameSegmentation::regions) {
            w += r.bounds().width();
            h += r.bounds().height();
            n += 1;
        }
        (n > 0).then(|| (w / f64::from(n), h / f64::from(n)))
    }

    // --- links ---

    /// Link `from` in `frame` to `to` in `frame + 1`, replacing any previous link.
    pub fn link(&mut self, frame: usize, from: RegionKey, to: RegionKey) -> Result<(), EditError> {
        if frame >= self.frames.len() {
            return Err(EditError::UnknownFrame(frame));
        }
        let next = self
            .frames
            .get(frame + 1)
            .ok_or(EditError::NoNextFrame(frame))?;
        let target = next.get(to).ok_or(EditError::UnknownRegion(to))?.id().clone();
        debug!(frame, ?from, %target, "linked region");
        self.frames[frame].set_link(from, Some(target))
    }

    /// Remove the link of `key` in `frame`.
    pub fn unlink(&mut self, frame: usize, key: RegionKey) -> Result<(), EditError> {
        self.try_frame_mut(frame)?.set_link(key, None)
    }

    /// The region in `frame + 1` that `key` links to, if any.
    pub fn linked(&self, frame: usize, key: RegionKey) -> Option<RegionKey> {
        let link = self.frames.get(frame)?.get(key)?.link_id()?;
        self.frames.get(frame + 1)?.key_of(link)
    }

    /// Links whose target is missing from the next frame.
    pub fn dangling_links(&self) -> Vec<DanglingLink> {
        let mut out = Vec::new();
        for (i, frame) in self.frames.iter().enumerate() {
            let next = self.frames.get(i + 1);
            for (_, r) in frame.regions() {
                let Some(link) = r.link_id() else { continue };
                if next.and_then(|n| n.key_of(link)).is_none() {
                    out.push(DanglingLink {
                        frame: i,
                        region: r.id().clone(),
                        link: link.clone(),
                    });
                }
            }
        }
        out
    }

    /// Assign `trajectory_NNNN` ids by following links forward from the first frame.
    ///
    /// A region without an incoming link starts a new trajectory. A region reached by
    /// two links is a collision: it also starts a new trajectory, and so does
    /// everything downstream of it. Links to missing regions are logged and skipped.
    pub fn generate_trajectory_ids(&mut self) {
        for frame in &mut self.frames {
            let keys: Vec<_> = frame.keys().collect();
            for key in keys {
                frame.set_trajectory(key, None);
            }
        }
        let mut counter = 0_u32;
        for i in 0..self.frames.len() {
            let mut propagate: Vec<(RegionId, String)> = Vec::new();
            let keys: Vec<_> = self.frames[i].keys().collect();
            for key in keys {
                let frame = &mut self.frames[i];
                let Some(region) = frame.get(key) else { continue };
                let trajectory = match region.trajectory_id() {
                    Some(t) if t != COLLISION => t.to_owned(),
                    _ => {
                        let t = format!("trajectory_{counter:04}");
                        counter += 1;
                        frame.set_trajectory(key, Some(t.clone()));
                        t
                    }
                };
                if let Some(link) = frame.get(key).and_then(Region::link_id) {
                    propagate.push((link.clone(), trajectory));
                }
            }
            let Some(next) = self.frames.get_mut(i + 1) else {
                continue;
            };
            for (link, trajectory) in propagate {
                let Some(target) = next.key_of(&link) else {
                    warn!(frame = i, %link, "invalid link id");
                    continue;
                };
                let assigned = next.get(target).and_then(Region::trajectory_id).is_some();
                let value = if assigned { COLLISION.to_owned() } else { trajectory };
                next.set_trajectory(target, Some(value));
            }
        }
    }

    // --- edits that must keep links consistent ---

    /// Merge `b` into `a` within `frame`; links into `b` from the previous frame are
    /// redirected to `a`.
    pub fn merge_regions(
        &mut self,
        frame: usize,
        a: RegionKey,
        b: RegionKey,
        threshold_factor: f64,
    ) -> Result<(), EditError> {
        let f = self.try_frame_mut(frame)?;
        let a_id = f.region(a)?.id().clone();
        let b_id = f.region(b)?.id().clone();
        f.merge_regions(a, b, threshold_factor)?;
        self.retarget_incoming(frame, &b_id, Some(a_id));
        Ok(())
    }

    /// Remove a region from `frame`; links into it from the previous frame are cleared.
    pub fn remove_region(&mut self, frame: usize, key: RegionKey) -> Result<Region, EditError> {
        let removed = self.try_frame_mut(frame)?.remove_region(key)?;
        self.retarget_incoming(frame, removed.id(), None);
        Ok(removed)
    }

    fn retarget_incoming(&mut self, frame: usize, old: &RegionId, new: Option<RegionId>) {
        let Some(prev) = frame.checked_sub(1).and_then(|p| self.frames.get_mut(p)) else {
            return;
        };
        let sources: Vec<RegionKey> = prev
            .regions()
            .filter(|(_, r)| r.link_id() == Some(old))
            .map(|(k, _)| k)
            .collect();
        for k in sources {
            // Keys come from the frame itself, so this cannot fail.
            let _ = prev.set_link(k, new.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"[
        [
            { "id": "object1", "vertices": [[0.1, 0.1], [0.2, 0.1], [0.1, 0.2]], "link_id": "object1" },
            { "id": "object2", "vertices": [[0.5, 0.5], [0.6, 0.5], [0.5, 0.6]], "link_id": "object2" },
            { "id": "object3", "vertices": [[0.8, 0.8], [0.9, 0.8], [0.8, 0.9]], "link_id": "object2" }
        ],
        [
            { "id": "object1", "vertices": [[0.1, 0.1], [0.2, 0.1], [0.1, 0.2]], "link_id": "object7" },
            { "id": "object2", "vertices": [[0.5, 0.5], [0.6, 0.5], [0.5, 0.6]], "link_id": "object1" }
        ],
        [
            { "id": "object1", "vertices": [[0.1, 0.1], [0.2, 0.1], [0.1, 0.2]] }
        ]
    ]"#;

    fn trajectories(seg: &Segmentation, frame: usize) -> Vec<String> {
        seg.frame(frame)
            .unwrap()
            .regions()
            .map(|(_, r)| r.trajectory_id().unwrap_or("-").to_owned())
            .collect()
    }

    #[test]
    fn trajectories_follow_links_and_split_on_collision() {
        let mut seg = Segmentation::from_json_str(JSON, "object").unwrap();
        seg.generate_trajectory_ids();
        assert_eq!(trajectories(&seg, 0), ["trajectory_0000", "trajectory_0001", "trajectory_0002"]);
        // object2 in frame 1 is reached twice and restarts; its successor inherits.
        assert_eq!(trajectories(&seg, 1), ["trajectory_0000", "trajectory_0003"]);
        assert_eq!(trajectories(&seg, 2), ["trajectory_0003"]);
    }

    #[test]
    fn dangling_links_are_listed() {
        let seg = Segmentation::from_json_str(JSON, "object").unwrap();
        assert_eq!(
            seg.dangling_links(),
            vec![DanglingLink {
                frame: 1,
                region: RegionId::new("object1"),
                link: RegionId::new("object7"),
            }]
        );
    }

    #[test]
    fn link_and_unlink() {
        let mut seg = Segmentation::from_json_str(JSON, "object").unwrap();
        let f0: Vec<_> = seg.frame(0).unwrap().keys().collect();
        let f1: Vec<_> = seg.frame(1).unwrap().keys().collect();
        seg.link(0, f0[2], f1[0]).unwrap();
        assert_eq!(seg.linked(0, f0[2]), Some(f1[0]));
        seg.unlink(0, f0[2]).unwrap();
        assert_eq!(seg.linked(0, f0[2]), None);
        let f2: Vec<_> = seg.frame(2).unwrap().keys().collect();
        assert_eq!(seg.link(2, f2[0], f1[0]), Err(EditError::NoNextFrame(2)));
        assert_eq!(seg.link(9, f2[0], f1[0]), Err(EditError::UnknownFrame(9)));
    }

    #[test]
    fn removing_a_region_clears_incoming_links() {
        let mut seg = Segmentation::from_json_str(JSON, "object").unwrap();
        let f0: Vec<_> = seg.frame(0).unwrap().keys().collect();
        let f1: Vec<_> = seg.frame(1).unwrap().keys().collect();
        seg.remove_region(1, f1[1]).unwrap();
        assert_eq!(seg.frame(0).unwrap().get(f0[1]).unwrap().link_id(), None);
        assert_eq!(seg.frame(0).unwrap().get(f0[2]).unwrap().link_id(), None);
        assert!(seg.frame(0).unwrap().get(f0[0]).unwrap().link_id().is_some());
        assert!(seg.is_edited());
    }

    #[test]
    fn json_round_trip_keeps_links() {
        let seg = Segmentation::from_json_str(JSON, "object").unwrap();
        let text = seg.to_json_string().unwrap();
        let back = Segmentation::from_json_str(&text, "object").unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.dangling_links(), seg.dangling_links());
        assert!(Segmentation::from_json_str("{", "object").is_err());
    }
}
