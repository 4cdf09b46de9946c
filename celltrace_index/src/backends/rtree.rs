// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend with STR bulk loading, SAH-like splits, and best-first nearest search.

use alloc::boxed::Box;
use alloc::collections::BinaryHeap;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, cmp_f64};

const DEFAULT_MAX_CHILDREN: usize = 8;
const DEFAULT_MIN_CHILDREN: usize = 4;

/// R-tree backend.
#[derive(Clone)]
pub struct RTree {
    max_children: usize,
    min_children: usize,
    root: Option<NodeIdx>,
    arena: Vec<RNode>,
    free_nodes: Vec<NodeIdx>, // pruned arena entries, reused by `push_node`
    slots: Vec<Option<Aabb2D>>,
}

#[derive(Clone)]
struct RNode {
    bbox: Aabb2D,
    leaf: bool,
    children: Vec<RChild>,
}

#[derive(Copy, Clone)]
enum RChild {
    Node(NodeIdx),
    Item { slot: usize, bbox: Aabb2D },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl Default for RTree {
    fn default() -> Self {
        Self {
            max_children: DEFAULT_MAX_CHILDREN,
            min_children: DEFAULT_MIN_CHILDREN,
            root: None,
            arena: Vec::new(),
            free_nodes: Vec::new(),
            slots: Vec::new(),
        }
    }
}

fn child_bbox(arena: &[RNode], c: &RChild) -> Aabb2D {
    match c {
        RChild::Node(i) => arena[i.0].bbox,
        RChild::Item { bbox, .. } => *bbox,
    }
}

fn node_bbox(arena: &[RNode], children: &[RChild]) -> Aabb2D {
    let mut it = children.iter().map(|c| child_bbox(arena, c));
    let first = it.next().unwrap_or(Aabb2D::new(0.0, 0.0, 0.0, 0.0));
    it.fold(first, |acc, b| acc.union(&b))
}

fn by_center_x(a: &Aabb2D, b: &Aabb2D) -> Ordering {
    cmp_f64(a.center().0, b.center().0)
}

fn by_center_y(a: &Aabb2D, b: &Aabb2D) -> Ordering {
    cmp_f64(a.center().1, b.center().1)
}

impl RTree {
    /// Build a packed tree from `(slot, bbox)` pairs using sort-tile-recursive grouping.
    pub fn bulk_build(pairs: &[(usize, Aabb2D)]) -> Self {
        let mut tree = Self::default();
        for &(slot, bbox) in pairs {
            tree.ensure_slot(slot, bbox);
        }
        let mut items: Vec<RChild> = pairs
            .iter()
            .map(|&(slot, bbox)| RChild::Item { slot, bbox })
            .collect();
        if items.is_empty() {
            return tree;
        }

        let mut leaf_level = true;
        loop {
            let parents = tree.pack_level(&mut items, leaf_level);
            leaf_level = false;
            if parents.len() == 1 {
                tree.root = Some(parents[0]);
                return tree;
            }
            items = parents.into_iter().map(RChild::Node).collect();
        }
    }

    /// Group one level of children into parents of at most `max_children`.
    fn pack_level(&mut self, items: &mut [RChild], leaf: bool) -> Vec<NodeIdx> {
        let max = self.max_children;
        let n = items.len();
        let num_parents = n.div_ceil(max);
        let mut columns = 1_usize;
        while columns * columns < num_parents {
            columns += 1;
        }
        let arena = &self.arena;
        items.sort_by(|a, b| by_center_x(&child_bbox(arena, a), &child_bbox(arena, b)));
        let column_len = n.div_ceil(columns);
        let mut out = Vec::with_capacity(num_parents);
        for column in items.chunks_mut(column_len) {
            let arena = &self.arena;
            column.sort_by(|a, b| by_center_y(&child_bbox(arena, a), &child_bbox(arena, b)));
            for chunk in column.chunks(max) {
                let children = chunk.to_vec();
                let bbox = node_bbox(&self.arena, &children);
                out.push(self.push_node(RNode {
                    bbox,
                    leaf,
                    children,
                }));
            }
        }
        out
    }

    fn push_node(&mut self, node: RNode) -> NodeIdx {
        if let Some(idx) = self.free_nodes.pop() {
            self.arena[idx.0] = node;
            return idx;
        }
        self.arena.push(node);
        NodeIdx(self.arena.len() - 1)
    }

    fn ensure_slot(&mut self, slot: usize, bbox: Aabb2D) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(bbox);
    }

    /// Choose the child whose box grows least when enlarged by `bbox`.
    fn choose_child(arena: &[RNode], children: &[RChild], bbox: &Aabb2D) -> usize {
        let mut best = (0_usize, f64::INFINITY);
        for (i, c) in children.iter().enumerate() {
            let cb = child_bbox(arena, c);
            let cost = cb.union(bbox).area() - cb.area();
            if cost < best.1 {
                best = (i, cost);
            }
        }
        best.0
    }

    /// SAH-like split: sort along each axis and pick the `k` minimizing
    /// `area(first k) * k + area(rest) * (n - k)`.
    fn split_children(
        arena: &[RNode],
        children: Vec<RChild>,
        min_children: usize,
    ) -> (Vec<RChild>, Vec<RChild>) {
        let n = children.len();
        let lo = min_children.min(n / 2).max(1);
        let hi = n - lo;
        let mut best: Option<(f64, Vec<RChild>, usize)> = None;
        for axis in 0..2 {
            let mut v = children.clone();
            v.sort_by(|a, b| {
                let (ba, bb) = (child_bbox(arena, a), child_bbox(arena, b));
                if axis == 0 {
                    by_center_x(&ba, &bb)
                } else {
                    by_center_y(&ba, &bb)
                }
            });
            let boxes: Vec<Aabb2D> = v.iter().map(|c| child_bbox(arena, c)).collect();
            let mut prefix = Vec::with_capacity(n);
            let mut acc = boxes[0];
            for b in &boxes {
                acc = acc.union(b);
                prefix.push(acc);
            }
            let mut suffix = vec![boxes[n - 1]; n];
            for i in (0..n - 1).rev() {
                suffix[i] = suffix[i + 1].union(&boxes[i]);
            }
            for k in lo..=hi {
                #[allow(
                    clippy::cast_precision_loss,
                    reason = "Child counts are tiny; the cost is only compared."
                )]
                let cost = prefix[k - 1].area() * k as f64 + suffix[k].area() * (n - k) as f64;
                if best.as_ref().is_none_or(|(c, _, _)| cost < *c) {
                    best = Some((cost, v.clone(), k));
                }
            }
        }
        match best {
            Some((_, mut v, k)) => {
                let right = v.split_off(k);
                (v, right)
            }
            None => {
                let mut v = children;
                let right = v.split_off(n / 2);
                (v, right)
            }
        }
    }

    /// Insert below `node`; returns a new right sibling if `node` overflowed.
    fn insert_into(&mut self, node: NodeIdx, slot: usize, bbox: Aabb2D) -> Option<NodeIdx> {
        if self.arena[node.0].leaf {
            let n = &mut self.arena[node.0];
            n.children.push(RChild::Item { slot, bbox });
            n.bbox = n.bbox.union(&bbox);
        } else {
            let idx = Self::choose_child(&self.arena, &self.arena[node.0].children, &bbox);
            let chosen = self.arena[node.0].children[idx];
            let split = match chosen {
                RChild::Node(child) => self.insert_into(child, slot, bbox),
                RChild::Item { .. } => None,
            };
            let n = &mut self.arena[node.0];
            n.bbox = n.bbox.union(&bbox);
            if let Some(right) = split {
                n.children.insert(idx + 1, RChild::Node(right));
            }
        }
        if self.arena[node.0].children.len() <= self.max_children {
            return None;
        }
        let leaf = self.arena[node.0].leaf;
        let children = core::mem::take(&mut self.arena[node.0].children);
        let (left, right) = Self::split_children(&self.arena, children, self.min_children);
        let l_bbox = node_bbox(&self.arena, &left);
        let r_bbox = node_bbox(&self.arena, &right);
        let n = &mut self.arena[node.0];
        n.children = left;
        n.bbox = l_bbox;
        Some(self.push_node(RNode {
            bbox: r_bbox,
            leaf,
            children: right,
        }))
    }

    /// Remove `slot` from the subtree; prunes emptied child nodes on the way up.
    fn remove_from(&mut self, node: NodeIdx, slot: usize, old: &Aabb2D) -> bool {
        if !self.arena[node.0].bbox.intersects(old) {
            return false;
        }
        let removed = if self.arena[node.0].leaf {
            let before = self.arena[node.0].children.len();
            self.arena[node.0]
                .children
                .retain(|c| !matches!(c, RChild::Item { slot: s, .. } if *s == slot));
            self.arena[node.0].children.len() != before
        } else {
            let kids: Vec<NodeIdx> = self.child_nodes(node).collect();
            let mut found = false;
            for k in kids {
                if self.remove_from(k, slot, old) {
                    found = true;
                    break;
                }
            }
            if found {
                let arena = &self.arena;
                let (kept, pruned): (Vec<RChild>, Vec<RChild>) = arena[node.0]
                    .children
                    .iter()
                    .copied()
                    .partition(|c| match c {
                        RChild::Node(i) => !arena[i.0].children.is_empty(),
                        RChild::Item { .. } => true,
                    });
                self.arena[node.0].children = kept;
                self.free_nodes.extend(pruned.into_iter().filter_map(|c| match c {
                    RChild::Node(i) => Some(i),
                    RChild::Item { .. } => None,
                }));
            }
            found
        };
        if removed && !self.arena[node.0].children.is_empty() {
            let bb = node_bbox(&self.arena, &self.arena[node.0].children);
            self.arena[node.0].bbox = bb;
        }
        removed
    }

    /// Update an item's box without restructuring; refits ancestors on the path.
    fn update_in_place(&mut self, node: NodeIdx, slot: usize, old: &Aabb2D, new: Aabb2D) -> bool {
        if !self.arena[node.0].bbox.intersects(old) {
            return false;
        }
        let found = if self.arena[node.0].leaf {
            let mut hit = false;
            for c in &mut self.arena[node.0].children {
                if let RChild::Item { slot: s, bbox } = c
                    && *s == slot
                {
                    *bbox = new;
                    hit = true;
                    break;
                }
            }
            hit
        } else {
            let kids: Vec<NodeIdx> = self.child_nodes(node).collect();
            kids.into_iter()
                .any(|k| self.update_in_place(k, slot, old, new))
        };
        if found {
            let bb = node_bbox(&self.arena, &self.arena[node.0].children);
            self.arena[node.0].bbox = bb;
        }
        found
    }

    fn child_nodes(&self, node: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.arena[node.0].children.iter().filter_map(|c| match c {
            RChild::Node(i) => Some(*i),
            RChild::Item { .. } => None,
        })
    }

    fn collect_matching(&self, query: Aabb2D) -> Vec<usize> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = &self.arena[i.0];
            if !n.bbox.intersects(&query) {
                continue;
            }
            for c in &n.children {
                match c {
                    RChild::Item { slot, bbox } if bbox.intersects(&query) => out.push(*slot),
                    RChild::Item { .. } => {}
                    RChild::Node(ci) => stack.push(*ci),
                }
            }
        }
        out
    }
}

/// Entry in the best-first queue; ordered so the heap pops the smallest distance.
#[derive(Copy, Clone)]
struct Queued {
    dist: f64,
    child: RChild,
}

impl Queued {
    fn rank(&self) -> (f64, u8, usize) {
        match self.child {
            // Items before nodes at equal distance, then by slot for stable output.
            RChild::Item { slot, .. } => (self.dist, 0, slot),
            RChild::Node(i) => (self.dist, 1, i.0),
        }
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        let (da, ka, ia) = self.rank();
        let (db, kb, ib) = other.rank();
        cmp_f64(db, da).then(kb.cmp(&ka)).then(ib.cmp(&ia))
    }
}

/// Lazy best-first traversal yielding items by ascending box distance.
struct NearestIter<'a> {
    tree: &'a RTree,
    x: f64,
    y: f64,
    heap: BinaryHeap<Queued>,
}

impl Iterator for NearestIter<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(q) = self.heap.pop() {
            match q.child {
                RChild::Item { slot, .. } => return Some((slot, q.dist)),
                RChild::Node(i) => {
                    for c in &self.tree.arena[i.0].children {
                        let dist = child_bbox(&self.tree.arena, c)
                            .distance_squared_to_point(self.x, self.y);
                        self.heap.push(Queued { dist, child: *c });
                    }
                }
            }
        }
        None
    }
}

impl Backend for RTree {
    fn insert(&mut self, slot: usize, aabb: Aabb2D) {
        self.ensure_slot(slot, aabb);
        let Some(root) = self.root else {
            let idx = self.push_node(RNode {
                bbox: aabb,
                leaf: true,
                children: vec![RChild::Item { slot, bbox: aabb }],
            });
            self.root = Some(idx);
            return;
        };
        if let Some(right) = self.insert_into(root, slot, aabb) {
            let bbox = self.arena[root.0].bbox.union(&self.arena[right.0].bbox);
            let idx = self.push_node(RNode {
                bbox,
                leaf: false,
                children: vec![RChild::Node(root), RChild::Node(right)],
            });
            self.root = Some(idx);
        }
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D) {
        if let Some(old) = self.slots.get(slot).copied().flatten()
            && let Some(root) = self.root
        {
            if self.update_in_place(root, slot, &old, aabb) {
                self.slots[slot] = Some(aabb);
                return;
            }
            self.remove_from(root, slot, &old);
        }
        self.insert(slot, aabb);
    }

    fn remove(&mut self, slot: usize) {
        let Some(old) = self.slots.get(slot).copied().flatten() else {
            return;
        };
        if let Some(root) = self.root {
            self.remove_from(root, slot, &old);
            if self.arena[root.0].children.is_empty() {
                self.root = None;
                self.arena.clear();
                self.free_nodes.clear();
            }
        }
        self.slots[slot] = None;
    }

    fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.free_nodes.clear();
        self.slots.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(self.collect_matching(Aabb2D::new(x, y, x, y)).into_iter())
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(self.collect_matching(rect).into_iter())
    }

    fn nearest<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = (usize, f64)> + 'a> {
        let mut heap = BinaryHeap::new();
        if let Some(root) = self.root {
            heap.push(Queued {
                dist: self.arena[root.0].bbox.distance_squared_to_point(x, y),
                child: RChild::Node(root),
            });
        }
        Box::new(NearestIter {
            tree: self,
            x,
            y,
            heap,
        })
    }
}

impl Debug for RTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|e| e.is_some()).count();
        f.debug_struct("RTree")
            .field("max_children", &self.max_children)
            .field("min_children", &self.min_children)
            .field("arena_nodes", &self.arena.len())
            .field("free_nodes", &self.free_nodes.len())
            .field("total_slots", &total)
            .field("alive", &alive)
            .field("has_root", &self.root.is_some())
            .finish_non_exhaustive()
    }
}
