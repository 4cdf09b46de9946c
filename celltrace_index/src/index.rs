// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flatvec::FlatVec;
use crate::backends::rtree::RTree;
use crate::damage::Damage;
use crate::types::Aabb2D;

/// Generational handle for entries.
///
/// The default key has generation `0` and never refers to a live entry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are 32-bit; a frame never holds 2^32 regions."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Updated,
    Removed,
}

#[derive(Clone, Debug)]
struct Entry<P> {
    aabb: Aabb2D,
    payload: P,
    mark: Option<Mark>,
    prev_aabb: Option<Aabb2D>, // for moved damage
}

/// An AABB index parameterized by a spatial backend.
///
/// Mutations are staged and become visible to queries at the next [`IndexGeneric::commit`].
#[derive(Clone, Debug)]
pub struct IndexGeneric<P: Copy + Debug, B: Backend> {
    entries: Vec<Option<Entry<P>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    backend: B,
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }
}

impl<P, B> Default for IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend,
{
    /// Create an empty index over an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            backend,
        }
    }

    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
    }

    /// Number of live entries, including uncommitted ones.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D, payload: P) -> Key {
        let entry = Some(Entry {
            aabb,
            payload,
            mark: Some(Mark::Added),
            prev_aabb: None,
        });
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = entry;
            Key::new(idx, generation)
        } else {
            self.entries.push(entry);
            self.generations.push(1);
            Key::new(self.entries.len() - 1, 1)
        }
    }

    /// Update an existing AABB. Stale keys are ignored.
    pub fn update(&mut self, key: Key, aabb: Aabb2D) {
        if let Some(e) = self.entry_mut(key) {
            if e.mark.is_none() {
                e.prev_aabb = Some(e.aabb);
            }
            e.aabb = aabb;
            e.mark = Some(match e.mark {
                Some(Mark::Added) => Mark::Added,
                _ => Mark::Updated,
            });
        }
    }

    /// Remove an existing AABB. Stale keys are ignored.
    pub fn remove(&mut self, key: Key) {
        if let Some(e) = self.entry_mut(key) {
            if matches!(e.mark, Some(Mark::Added)) {
                // Never reached the backend.
                self.drop_slot(key.idx());
            } else {
                e.mark = Some(Mark::Removed);
            }
        }
    }

    /// Clear the index (without reporting damage).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generations.clear();
        self.free_list.clear();
        self.backend.clear();
    }

    /// Apply pending changes and compute batched damage. Also synchronizes backend state.
    pub fn commit(&mut self) -> Damage {
        let mut dmg = Damage::default();
        for i in 0..self.entries.len() {
            let Some(entry) = self.entries[i].as_mut() else {
                continue;
            };
            match entry.mark.take() {
                Some(Mark::Added) => {
                    self.backend.insert(i, entry.aabb);
                    dmg.added.push(entry.aabb);
                }
                Some(Mark::Removed) => {
                    self.backend.remove(i);
                    dmg.removed.push(entry.aabb);
                    self.drop_slot(i);
                }
                Some(Mark::Updated) => {
                    self.backend.update(i, entry.aabb);
                    if let Some(prev) = entry.prev_aabb.take()
                        && prev != entry.aabb
                    {
                        dmg.moved.push((prev, entry.aabb));
                    }
                }
                None => {}
            }
        }
        dmg
    }

    /// The current AABB and payload behind a key, if it is live.
    pub fn get(&self, key: Key) -> Option<(Aabb2D, P)> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (self.generations[key.idx()] == key.1).then_some((e.aabb, e.payload))
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = (Key, P)> + '_ {
        self.backend
            .query_point(x, y)
            .filter_map(|i| self.resolve(i))
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb2D) -> impl Iterator<Item = (Key, P)> + '_ {
        self.backend.query_rect(rect).filter_map(|i| self.resolve(i))
    }

    /// The `k` entries nearest to the point (by AABB distance) whose payload passes `accept`.
    ///
    /// Candidates are visited in ascending distance and `accept` is called lazily, so
    /// an expensive exact test only runs until `k` candidates have been accepted.
    pub fn query_nearest<F>(&self, x: f64, y: f64, k: usize, mut accept: F) -> Vec<(Key, P)>
    where
        F: FnMut(&P) -> bool,
    {
        if k == 0 {
            return Vec::new();
        }
        self.backend
            .nearest(x, y)
            .filter_map(|(i, _)| self.resolve(i))
            .filter(|(_, p)| accept(p))
            .take(k)
            .collect()
    }

    /// Iterate live entries in slot order, including uncommitted ones.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Aabb2D, P)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            let e = e.as_ref()?;
            Some((Key::new(i, self.generations[i]), e.aabb, e.payload))
        })
    }

    fn resolve(&self, slot: usize) -> Option<(Key, P)> {
        let e = self.entries.get(slot)?.as_ref()?;
        Some((Key::new(slot, self.generations[slot]), e.payload))
    }

    fn drop_slot(&mut self, idx: usize) {
        self.entries[idx] = None;
        self.free_list.push(idx);
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<P>> {
        if self.generations.get(key.idx()) != Some(&key.1) {
            return None;
        }
        self.entries.get_mut(key.idx())?.as_mut()
    }
}

/// Default index using a flat vector backend.
pub type Index<P> = IndexGeneric<P, FlatVec>;

/// Index backed by an R-tree.
pub type RTreeIndex<P> = IndexGeneric<P, RTree>;

impl<P: Copy + Debug> Index<P> {
    /// Create an R-tree-backed index.
    pub fn with_rtree() -> RTreeIndex<P> {
        IndexGeneric::with_backend(RTree::default())
    }

    /// Bulk-load an R-tree-backed index; the result is already committed.
    pub fn with_rtree_bulk(entries: &[(Aabb2D, P)]) -> RTreeIndex<P> {
        let mut idx = IndexGeneric::with_backend(RTree::default());
        idx.entries.reserve(entries.len());
        let mut pairs = Vec::with_capacity(entries.len());
        for (i, &(aabb, payload)) in entries.iter().enumerate() {
            idx.entries.push(Some(Entry {
                aabb,
                payload,
                mark: None,
                prev_aabb: None,
            }));
            idx.generations.push(1);
            pairs.push((i, aabb));
        }
        idx.backend = RTree::bulk_build(&pairs);
        idx
    }
}
