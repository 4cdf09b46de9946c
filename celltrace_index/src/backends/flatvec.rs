// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for sparse frames.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, cmp_f64};

/// Flat vector backend with linear scans.
#[derive(Clone, Default)]
pub struct FlatVec {
    entries: Vec<Option<Aabb2D>>,
}

impl Debug for FlatVec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl FlatVec {
    fn live(&self) -> impl Iterator<Item = (usize, &Aabb2D)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|a| (i, a)))
    }
}

impl Backend for FlatVec {
    fn insert(&mut self, slot: usize, aabb: Aabb2D) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(aabb);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = Some(aabb);
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.live()
                .filter(move |(_, a)| a.contains_point(x, y))
                .map(|(i, _)| i),
        )
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.live()
                .filter(move |(_, a)| a.intersects(&rect))
                .map(|(i, _)| i),
        )
    }

    fn nearest<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = (usize, f64)> + 'a> {
        let mut out: Vec<(usize, f64)> = self
            .live()
            .map(|(i, a)| (i, a.distance_squared_to_point(x, y)))
            .collect();
        // Stable: equal distances keep slot order.
        out.sort_by(|a, b| cmp_f64(a.1, b.1));
        Box::new(out.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn nearest_orders_by_box_distance() {
        let mut b = FlatVec::default();
        b.insert(0, Aabb2D::new(5.0, 0.0, 6.0, 1.0));
        b.insert(1, Aabb2D::new(0.0, 0.0, 1.0, 1.0));
        b.insert(2, Aabb2D::new(2.0, 0.0, 3.0, 1.0));
        let order: Vec<_> = b.nearest(0.5, 0.5).map(|(s, _)| s).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn removed_slots_are_skipped() {
        let mut b = FlatVec::default();
        b.insert(0, Aabb2D::new(0.0, 0.0, 1.0, 1.0));
        b.insert(3, Aabb2D::new(0.0, 0.0, 1.0, 1.0));
        b.remove(0);
        assert_eq!(b.query_point(0.5, 0.5).collect::<Vec<_>>(), vec![3]);
        assert_eq!(b.nearest(0.5, 0.5).count(), 1);
    }
}
