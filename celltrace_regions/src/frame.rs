// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame region store: slots, id lookup, and index synchronization.

use std::collections::HashMap;

use celltrace_geometry::edge_crossings;
use celltrace_index::{Aabb2D, Damage, Index, Key as AabbKey, RTreeIndex};
use kurbo::{Line, Point, Rect};

use crate::error::{EditError, RegionError};
use crate::ids::next_region_id;
use crate::record::RegionRecord;
use crate::region::Region;
use crate::types::{RegionFlags, RegionId, RegionKey};

/// The regions of one frame and the spatial index over their bounds.
///
/// Every mutating method leaves the index consistent with the regions before it
/// returns, so queries never observe stale bounds. Clones keep their keys, which
/// lets a snapshot be swapped back in without invalidating handles.
#[derive(Clone)]
pub struct FrameSegmentation {
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    order: Vec<RegionKey>, // load/insert order, used for iteration and serialization
    next_seq: u64,
    ids: HashMap<RegionId, RegionKey>,
    index: RTreeIndex<RegionKey>,
    damage: Damage,
    id_prefix: String,
    edited: bool,
}

#[derive(Clone, Debug)]
struct Slot {
    region: Region,
    index_key: AabbKey,
    seq: u64, // position in store order
}

/// A region as it was at one moment, together with its frame's edited flag.
///
/// Taken with [`FrameSegmentation::snapshot`]; [`FrameSegmentation::restore`] puts
/// both back.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionSnapshot {
    region: Region,
    frame_edited: bool,
}

impl RegionSnapshot {
    /// The captured region.
    pub fn region(&self) -> &Region {
        &self.region
    }
}

impl core::fmt::Debug for FrameSegmentation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameSegmentation")
            .field("regions", &self.order.len())
            .field("free_list", &self.free_list.len())
            .field("id_prefix", &self.id_prefix)
            .field("edited", &self.edited)
            .finish_non_exhaustive()
    }
}

impl Default for FrameSegmentation {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSegmentation {
    /// Create an empty frame generating ids with the `object` prefix.
    pub fn new() -> Self {
        Self::with_id_prefix("object")
    }

    /// Create an empty frame generating ids with `prefix`.
    pub fn with_id_prefix(prefix: &str) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            next_seq: 0,
            ids: HashMap::new(),
            index: Index::with_rtree(),
            damage: Damage::default(),
            id_prefix: prefix.to_owned(),
            edited: false,
        }
    }

    /// Build a frame from loaded regions and bulk-load its index.
    ///
    /// Fails on the first duplicate id.
    pub fn from_regions(
        prefix: &str,
        regions: impl IntoIterator<Item = Region>,
    ) -> Result<Self, RegionError> {
        let mut frame = Self::with_id_prefix(prefix);
        for region in regions {
            if frame.key_of(region.id()).is_some() {
                return Err(RegionError::DuplicateId(region.id().clone()));
            }
            frame.push_slot(region);
        }
        frame.rebuild();
        Ok(frame)
    }

    /// Build a frame from serialized records.
    pub fn from_records(
        prefix: &str,
        records: impl IntoIterator<Item = RegionRecord>,
    ) -> Result<Self, RegionError> {
        let regions = records
            .into_iter()
            .map(Region::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_regions(prefix, regions)
    }

    /// Serialize every region in store order.
    pub fn to_records(&self) -> Vec<RegionRecord> {
        self.regions().map(|(_, r)| RegionRecord::from(r)).collect()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the frame has no regions.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `key` refers to a live region of this frame.
    pub fn is_alive(&self, key: RegionKey) -> bool {
        self.slot(key).is_some()
    }

    /// The region behind `key`, if it is live.
    pub fn get(&self, key: RegionKey) -> Option<&Region> {
        self.slot(key).map(|s| &s.region)
    }

    /// Keys of all regions in store order.
    pub fn keys(&self) -> impl Iterator<Item = RegionKey> + '_ {
        self.order.iter().copied()
    }

    /// All regions in store order.
    pub fn regions(&self) -> impl Iterator<Item = (RegionKey, &Region)> + '_ {
        self.order
            .iter()
            .filter_map(|k| self.get(*k).map(|r| (*k, r)))
    }

    /// Find a region by id.
    pub fn key_of(&self, id: &RegionId) -> Option<RegionKey> {
        self.ids.get(id).copied()
    }

    /// Prefix used for generated ids.
    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    /// A fresh id, one past the largest numbered id in the frame.
    pub fn next_region_id(&self) -> RegionId {
        next_region_id(&self.id_prefix, self.regions().map(|(_, r)| r.id()))
    }

    /// Whether anything in the frame changed since [`FrameSegmentation::mark_saved`].
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    // --- index maintenance ---

    /// Bulk-load the index from the current regions.
    pub fn rebuild(&mut self) {
        let entries: Vec<(Aabb2D, RegionKey)> = self
            .regions()
            .map(|(k, r)| (r.aabb(), k))
            .collect();
        self.index = Index::with_rtree_bulk(&entries);
        let keys: Vec<(AabbKey, RegionKey)> = self.index.iter().map(|(ak, _, k)| (ak, k)).collect();
        for (ak, k) in keys {
            if let Some(slot) = self.slot_mut(k) {
                slot.index_key = ak;
            }
        }
    }

    /// Refresh the index entry of one region after its geometry changed.
    pub fn invalidate(&mut self, key: RegionKey) {
        let Some(slot) = self.slot(key) else {
            return;
        };
        let (ak, aabb) = (slot.index_key, slot.region.aabb());
        self.index.update(ak, aabb);
        self.damage.extend(self.index.commit());
    }

    /// Boxes touched by edits since the last call; empty after a call.
    pub fn take_damage(&mut self) -> Damage {
        core::mem::take(&mut self.damage)
    }

    // --- queries ---

    /// The region containing `p`, searching candidates in order of bounds distance.
    pub fn hit_test(&self, p: Point) -> Option<RegionKey> {
        self.index
            .query_nearest(p.x, p.y, 1, |k| self.get(*k).is_some_and(|r| r.contains(p)))
            .first()
            .map(|(_, k)| *k)
    }

    /// Regions whose bounds intersect `rect`, in store order.
    pub fn visible_regions(&self, rect: Rect) -> Vec<RegionKey> {
        let q = Aabb2D::from_corners(rect.x0, rect.y0, rect.x1, rect.y1);
        let mut hits: Vec<RegionKey> = self.index.query_rect(q).map(|(_, k)| k).collect();
        self.sort_by_store_order(&mut hits);
        hits
    }

    /// Regions the segment crosses an even, non-zero number of times: the regions a
    /// trim along `line` would cut.
    pub fn regions_crossing(&self, line: Line) -> Vec<RegionKey> {
        let q = Aabb2D::from_corners(line.p0.x, line.p0.y, line.p1.x, line.p1.y);
        let mut hits: Vec<RegionKey> = self
            .index
            .query_rect(q)
            .map(|(_, k)| k)
            .filter(|k| {
                self.get(*k).is_some_and(|r| {
                    let n = edge_crossings(r.vertices(), line.p0, line.p1).len();
                    n > 0 && n % 2 == 0
                })
            })
            .collect();
        self.sort_by_store_order(&mut hits);
        hits
    }

    /// Seed radius for a new region: half the mean bounds width, or `fallback` when
    /// the frame is empty.
    pub fn default_seed_radius(&self, fallback: f64) -> f64 {
        if self.is_empty() {
            return fallback;
        }
        let total: f64 = self.regions().map(|(_, r)| r.bounds().width()).sum();
        #[allow(
            clippy::cast_precision_loss,
            reason = "Region counts are far below 2^52."
        )]
        let n = self.len() as f64;
        total / n / 2.0
    }

    /// Mean bounds width and height over the frame.
    pub fn mean_region_size(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let (w, h) = self
            .regions()
            .fold((0.0, 0.0), |(w, h), (_, r)| (w + r.bounds().width(), h + r.bounds().height()));
        #[allow(
            clippy::cast_precision_loss,
            reason = "Region counts are far below 2^52."
        )]
        let n = self.len() as f64;
        Some((w / n, h / n))
    }

    // --- annotation state ---

    /// Set or clear the done flag.
    pub fn set_done(&mut self, key: RegionKey, done: bool) -> Result<(), EditError> {
        self.region_mut(key)?.set_flag(RegionFlags::DONE, done);
        self.touch(key);
        Ok(())
    }

    /// Toggle `label` on a region. Returns whether the label is now present.
    pub fn toggle_label(&mut self, key: RegionKey, label: &str) -> Result<bool, EditError> {
        let present = self.region_mut(key)?.toggle_label(label);
        self.touch(key);
        Ok(present)
    }

    /// Move the highlight to `key`, clearing it everywhere else.
    pub fn set_highlight(&mut self, key: Option<RegionKey>) {
        self.set_exclusive(RegionFlags::HIGHLIGHT, key);
    }

    /// Move the selection to `key`, clearing it everywhere else.
    pub fn set_selected(&mut self, key: Option<RegionKey>) {
        self.set_exclusive(RegionFlags::SELECTED, key);
    }

    /// Turn unsaved changes into saved ones and clear the frame's edited flag.
    pub fn mark_saved(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            if slot.region.flags().contains(RegionFlags::UNSAVED) {
                slot.region.set_flag(RegionFlags::UNSAVED, false);
                slot.region.set_flag(RegionFlags::EDITED, true);
            }
        }
        self.edited = false;
    }

    pub(crate) fn set_link(&mut self, key: RegionKey, link: Option<RegionId>) -> Result<(), EditError> {
        self.region_mut(key)?.set_link_id(link);
        self.touch(key);
        Ok(())
    }

    pub(crate) fn set_trajectory(&mut self, key: RegionKey, trajectory: Option<String>) {
        if let Some(slot) = self.slot_mut(key) {
            slot.region.set_trajectory_id(trajectory);
        }
    }

    fn set_exclusive(&mut self, flag: RegionFlags, key: Option<RegionKey>) {
        for slot in self.slots.iter_mut().flatten() {
            slot.region.set_flag(flag, false);
        }
        if let Some(slot) = key.and_then(|k| self.slot_mut(k)) {
            slot.region.set_flag(flag, true);
        }
    }

    // --- slot management ---

    /// Insert a region, rejecting a duplicate id.
    pub fn insert(&mut self, region: Region) -> Result<RegionKey, RegionError> {
        if self.key_of(region.id()).is_some() {
            return Err(RegionError::DuplicateId(region.id().clone()));
        }
        let key = self.insert_indexed(region);
        self.touch(key);
        Ok(key)
    }

    /// Capture a region and the frame's edited flag, for example at the start of a drag.
    pub fn snapshot(&self, key: RegionKey) -> Option<RegionSnapshot> {
        Some(RegionSnapshot {
            region: self.get(key)?.clone(),
            frame_edited: self.edited,
        })
    }

    /// Put back a region and the frame's edited flag exactly as captured, for
    /// example to abandon a drag.
    pub fn restore(&mut self, key: RegionKey, snapshot: RegionSnapshot) -> Result<(), EditError> {
        let RegionSnapshot {
            region,
            frame_edited,
        } = snapshot;
        let previous = core::mem::replace(self.region_mut(key)?, region);
        let current = self.region(key)?.id().clone();
        if previous.id() != &current {
            self.ids.remove(previous.id());
            self.ids.insert(current, key);
        }
        self.invalidate(key);
        self.edited = frame_edited;
        Ok(())
    }

    pub(crate) fn insert_indexed(&mut self, region: Region) -> RegionKey {
        let aabb = region.aabb();
        let key = self.push_slot(region);
        let ak = self.index.insert(aabb, key);
        if let Some(slot) = self.slot_mut(key) {
            slot.index_key = ak;
        }
        self.damage.extend(self.index.commit());
        key
    }

    pub(crate) fn take(&mut self, key: RegionKey) -> Option<Region> {
        let slot = self.slots.get_mut(key.idx())?;
        if self.generations[key.idx()] != key.1 {
            return None;
        }
        let slot = slot.take()?;
        self.free_list.push(key.idx());
        self.order.retain(|k| *k != key);
        self.ids.remove(slot.region.id());
        self.index.remove(slot.index_key);
        self.damage.extend(self.index.commit());
        self.edited = true;
        Some(slot.region)
    }

    /// Mark a region changed and resync its index entry.
    pub(crate) fn touch(&mut self, key: RegionKey) {
        if let Some(slot) = self.slot_mut(key) {
            slot.region.set_flag(RegionFlags::UNSAVED, true);
            self.edited = true;
        }
        self.invalidate(key);
    }

    pub(crate) fn region_mut(&mut self, key: RegionKey) -> Result<&mut Region, EditError> {
        self.slot_mut(key)
            .map(|s| &mut s.region)
            .ok_or(EditError::UnknownRegion(key))
    }

    pub(crate) fn region(&self, key: RegionKey) -> Result<&Region, EditError> {
        self.get(key).ok_or(EditError::UnknownRegion(key))
    }

    // Adds the slot without touching the index; callers insert or rebuild.
    fn push_slot(&mut self, region: Region) -> RegionKey {
        let id = region.id().clone();
        let slot = Some(Slot {
            region,
            index_key: AabbKey::default(),
            seq: self.next_seq,
        });
        self.next_seq += 1;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "RegionKey uses 32-bit indices."
        )]
        let key = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = slot;
            RegionKey::new(idx as u32, generation)
        } else {
            self.slots.push(slot);
            self.generations.push(1);
            RegionKey::new((self.slots.len() - 1) as u32, 1)
        };
        self.order.push(key);
        self.ids.insert(id, key);
        key
    }

    fn sort_by_store_order(&self, keys: &mut [RegionKey]) {
        keys.sort_by_key(|k| self.slot(*k).map_or(u64::MAX, |s| s.seq));
    }

    fn slot(&self, key: RegionKey) -> Option<&Slot> {
        if self.generations.get(key.idx()) != Some(&key.1) {
            return None;
        }
        self.slots.get(key.idx())?.as_ref()
    }

    fn slot_mut(&mut self, key: RegionKey) -> Option<&mut Slot> {
        if self.generations.get(key.idx()) != Some(&key.1) {
            return None;
        }
        self.slots.get_mut(key.idx())?.as_mut()
    }
}
