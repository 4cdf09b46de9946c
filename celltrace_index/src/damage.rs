// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched damage structures returned by [`Index::commit`](crate::Index::commit).

use alloc::vec::Vec;

use crate::types::Aabb2D;

/// Batched damage summary returned by [`Index::commit`](crate::Index::commit).
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Newly added boxes since last commit.
    pub added: Vec<Aabb2D>,
    /// Removed boxes since last commit.
    pub removed: Vec<Aabb2D>,
    /// Moved boxes since last commit: (old, new).
    pub moved: Vec<(Aabb2D, Aabb2D)>,
}

impl Damage {
    /// True if no damage entries recorded.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    /// Union of all boxes affected. Returns `None` if empty.
    pub fn union(&self) -> Option<Aabb2D> {
        let mut it = self
            .added
            .iter()
            .copied()
            .chain(self.removed.iter().copied())
            .chain(self.moved.iter().flat_map(|(a, b)| [*a, *b]));
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(&r)))
    }

    /// Fold another damage set into this one.
    pub fn extend(&mut self, other: Self) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.moved.extend(other.moved);
    }
}
