// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Editing operations on a frame's regions.
//!
//! Each operation either commits completely (region geometry, derived bounds, and
//! the spatial index all updated) or returns an [`EditError`] and changes nothing.

use core::f64::consts::FRAC_PI_6;

use celltrace_geometry::{
    area, distance, distance_squared, edge_crossings, nearest_edge, normalize, perimeter,
    rotate_about, translate,
};
use kurbo::{Line, Point, Vec2};
use tracing::{debug, warn};

use crate::error::EditError;
use crate::frame::FrameSegmentation;
use crate::region::Region;
use crate::types::{RegionKey, VertexIndex};

impl FrameSegmentation {
    /// Insert `point` into the ring after the start of the edge closest to it.
    ///
    /// Returns the index of the new vertex.
    pub fn add_vertex(&mut self, key: RegionKey, point: Point) -> Result<VertexIndex, EditError> {
        let region = self.region_mut(key)?;
        let edge = nearest_edge(region.vertices(), point).ok_or(EditError::UnknownRegion(key))?;
        let at = edge + 1;
        region.vertices_mut().insert(at, point);
        region.refresh_geometry();
        self.touch(key);
        debug!(?key, vertex = at, "added vertex");
        Ok(VertexIndex(at))
    }

    /// Remove a vertex, refusing to go below three. Returns the removed point.
    pub fn remove_vertex(&mut self, key: RegionKey, vertex: VertexIndex) -> Result<Point, EditError> {
        let region = self.region_mut(key)?;
        let len = region.vertices().len();
        if vertex.0 >= len {
            return Err(EditError::UnknownVertex { index: vertex.0, len });
        }
        if len <= 3 {
            return Err(EditError::MinimumVertices);
        }
        let removed = region.vertices_mut().remove(vertex.0);
        region.refresh_geometry();
        self.touch(key);
        debug!(?key, vertex = vertex.0, "removed vertex");
        Ok(removed)
    }

    /// Move one vertex. Self-intersections are not checked.
    pub fn move_vertex(
        &mut self,
        key: RegionKey,
        vertex: VertexIndex,
        to: Point,
    ) -> Result<(), EditError> {
        let region = self.region_mut(key)?;
        let len = region.vertices().len();
        let slot = region
            .vertices_mut()
            .get_mut(vertex.0)
            .ok_or(EditError::UnknownVertex { index: vertex.0, len })?;
        *slot = to;
        region.refresh_geometry();
        self.touch(key);
        Ok(())
    }

    /// Set the ring to `original` translated by `delta`.
    ///
    /// `original` is the ring captured when the drag started, so repeated calls during
    /// one drag do not accumulate rounding drift.
    pub fn move_region(
        &mut self,
        key: RegionKey,
        original: &[Point],
        delta: Vec2,
    ) -> Result<(), EditError> {
        self.replace_ring(key, translate(original, delta))
    }

    /// Set the ring to `original` rotated by `theta` radians about the center of
    /// `original`'s bounds.
    pub fn rotate_region(
        &mut self,
        key: RegionKey,
        original: &[Point],
        theta: f64,
    ) -> Result<(), EditError> {
        let pivot = celltrace_geometry::bounding_box(original)
            .ok_or(EditError::DegenerateSection)?
            .center();
        self.replace_ring(key, rotate_about(original, pivot, theta))
    }

    /// Merge region `b` into region `a` and remove `b`.
    ///
    /// Seam candidates are the vertex pairs closer than `threshold_factor` times the
    /// second-smallest pair distance, extended so that both outlines contribute at
    /// least two vertices. The two candidates with the farthest-apart midpoints
    /// (using distinct vertices on both sides) become the seams; `a`'s ring is walked
    /// to the first seam, `b`'s ring is spliced in up to the second, and `a`'s ring
    /// resumes from there.
    pub fn merge_regions(
        &mut self,
        a: RegionKey,
        b: RegionKey,
        threshold_factor: f64,
    ) -> Result<(), EditError> {
        if a == b {
            return Err(EditError::SameRegion);
        }
        let ring_b = self.region(b)?.vertices();
        let ring_a = self.region(a)?.vertices();
        let Some(merged) = merge_rings(ring_a, ring_b, threshold_factor) else {
            warn!(?a, ?b, "merge found no seam; regions left unchanged");
            return Err(EditError::NoSeam);
        };
        if merged.len() < 3 {
            return Err(EditError::DegenerateSection);
        }
        self.region_mut(a)?.set_vertices(merged);
        self.take(b);
        self.touch(a);
        debug!(?a, ?b, "merged regions");
        Ok(())
    }

    /// Cut a region along `line`, keeping the even sections in place and moving the
    /// odd sections into a new region with a fresh id.
    ///
    /// Each cut point is replaced by two points `offset` apart along the cut edge so
    /// the two outlines do not share a zero-width seam.
    pub fn split_region(
        &mut self,
        key: RegionKey,
        line: Line,
        offset: f64,
    ) -> Result<RegionKey, EditError> {
        let [keep, split] = cut_groups(self.region(key)?.vertices(), line, offset)?;
        if is_degenerate(&keep) || is_degenerate(&split) {
            return Err(EditError::DegenerateSection);
        }
        let id = self.next_region_id();
        let new_region = Region::new(id, split).map_err(|_| EditError::DegenerateSection)?;
        self.region_mut(key)?.set_vertices(keep);
        self.touch(key);
        let new_key = self.insert_indexed(new_region);
        self.touch(new_key);
        debug!(?key, ?new_key, "split region");
        Ok(new_key)
    }

    /// Cut a region along `line` and keep whichever alternating group of sections
    /// has the longer outline. Ties keep the group containing the first vertex.
    pub fn trim_region(&mut self, key: RegionKey, line: Line) -> Result<(), EditError> {
        let [g0, g1] = cut_groups(self.region(key)?.vertices(), line, 0.0)?;
        let kept = if perimeter(&g1) > perimeter(&g0) { g1 } else { g0 };
        if is_degenerate(&kept) {
            return Err(EditError::DegenerateSection);
        }
        self.region_mut(key)?.set_vertices(kept);
        self.touch(key);
        debug!(?key, "trimmed region");
        Ok(())
    }

    /// Seed a new triangular region centered on `point` with circumradius `radius`.
    pub fn add_region(&mut self, point: Point, radius: f64) -> Result<RegionKey, EditError> {
        let (x, y) = (FRAC_PI_6.cos() * radius, FRAC_PI_6.sin() * radius);
        let ring = vec![
            Point::new(point.x + x, point.y + y),
            Point::new(point.x - x, point.y + y),
            Point::new(point.x, point.y - radius),
        ];
        let id = self.next_region_id();
        let region = Region::new(id, ring).map_err(|_| EditError::DegenerateSection)?;
        let key = self.insert_indexed(region);
        self.touch(key);
        debug!(?key, radius, "added region");
        Ok(key)
    }

    /// Remove a region, returning it.
    pub fn remove_region(&mut self, key: RegionKey) -> Result<Region, EditError> {
        let region = self.take(key).ok_or(EditError::UnknownRegion(key))?;
        debug!(?key, id = %region.id(), "removed region");
        Ok(region)
    }

    /// Snapshot a region's ring for a later paste.
    pub fn copy_region(&self, key: RegionKey) -> Result<Vec<Point>, EditError> {
        Ok(self.region(key)?.vertices().to_vec())
    }

    /// Insert a copy of `ring` with its bounds centered on `at`, under a fresh id.
    pub fn paste_region(&mut self, ring: &[Point], at: Point) -> Result<RegionKey, EditError> {
        let center = celltrace_geometry::bounding_box(ring)
            .ok_or(EditError::EmptyClipboard)?
            .center();
        let id = self.next_region_id();
        let region =
            Region::new(id, translate(ring, at - center)).map_err(|_| EditError::DegenerateSection)?;
        let key = self.insert_indexed(region);
        self.touch(key);
        debug!(?key, "pasted region");
        Ok(key)
    }

    fn replace_ring(&mut self, key: RegionKey, ring: Vec<Point>) -> Result<(), EditError> {
        if ring.len() < 3 {
            return Err(EditError::DegenerateSection);
        }
        self.region_mut(key)?.set_vertices(ring);
        self.touch(key);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct VertexPair {
    i: usize,
    j: usize,
    dist: f64,
}

/// The merged ring of `a` and `b`, or `None` when no seam pair exists.
fn merge_rings(a: &[Point], b: &[Point], threshold_factor: f64) -> Option<Vec<Point>> {
    let mut pairs: Vec<VertexPair> = a
        .iter()
        .enumerate()
        .flat_map(|(i, va)| {
            b.iter().enumerate().map(move |(j, vb)| VertexPair {
                i,
                j,
                dist: distance(*va, *vb),
            })
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    // Stable: equal distances keep a-major order.
    pairs.sort_by(|p, q| p.dist.total_cmp(&q.dist));

    let threshold = pairs[1].dist * threshold_factor;
    let mut candidates: Vec<VertexPair> =
        pairs.iter().copied().take_while(|p| p.dist < threshold).collect();

    let only = |sel: fn(&VertexPair) -> usize, c: &[VertexPair]| -> Option<usize> {
        let first = sel(c.first()?);
        c.iter().all(|p| sel(p) == first).then_some(first)
    };
    let rest = &pairs[candidates.len()..];
    if let Some(i) = only(|p| p.i, &candidates) {
        candidates.extend(rest.iter().find(|p| p.i != i));
    } else if let Some(j) = only(|p| p.j, &candidates) {
        candidates.extend(rest.iter().find(|p| p.j != j));
    }

    let mid = |p: &VertexPair| a[p.i].midpoint(b[p.j]);
    let mut seams: Option<(VertexPair, VertexPair, f64)> = None;
    for p1 in &candidates {
        for p2 in &candidates {
            if p1.i == p2.i || p1.j == p2.j {
                continue;
            }
            let d2 = distance_squared(mid(p1), mid(p2));
            if seams.is_none_or(|(_, _, best)| d2 > best) {
                seams = Some((*p1, *p2, d2));
            }
        }
    }
    let (p1, p2, _) = seams?;

    let (n, m) = (a.len(), b.len());
    let start = pairs[pairs.len() - 1].i;
    let mut out = Vec::with_capacity(n + m);
    let mut seam = None;
    let mut i = start;
    for _ in 0..n {
        out.push(a[i]);
        if i == p1.i {
            seam = Some((p1, p2));
            break;
        }
        if i == p2.i {
            seam = Some((p2, p1));
            break;
        }
        i = (i + 1) % n;
    }
    let (first, second) = seam?;
    let mut j = first.j;
    while j != second.j {
        out.push(b[j]);
        j = (j + 1) % m;
    }
    let mut i = second.i;
    while i != start {
        out.push(a[i]);
        i = (i + 1) % n;
    }
    Some(out)
}

/// Smallest area a cut section may enclose.
const MIN_SECTION_AREA: f64 = 1e-12;

fn is_degenerate(ring: &[Point]) -> bool {
    ring.len() < 3 || area(ring) <= MIN_SECTION_AREA
}

/// Cut `ring` along `line` into sections and concatenate them into the even and
/// odd groups.
///
/// A cut point inside an edge becomes two points `offset` either side of it along
/// that edge. A cut through a vertex replaces the vertex with one point `offset`
/// back along the incoming edge and one `offset` along the outgoing edge.
fn cut_groups(ring: &[Point], line: Line, offset: f64) -> Result<[Vec<Point>; 2], EditError> {
    let crossings = edge_crossings(ring, line.p0, line.p1);
    if crossings.is_empty() {
        return Err(EditError::NotCrossed);
    }
    if crossings.len() % 2 == 1 {
        return Err(EditError::OddIntersections {
            count: crossings.len(),
        });
    }
    let n = ring.len();
    let cut_vertices: Vec<usize> = crossings
        .iter()
        .filter(|(edge, x)| ring[(edge + 1) % n] == *x)
        .map(|(edge, _)| (edge + 1) % n)
        .collect();
    let mut sections: Vec<Vec<Point>> = vec![Vec::new()];
    let mut pending = crossings.iter().peekable();
    for (i, v) in ring.iter().enumerate() {
        let current = sections.len() - 1;
        if !cut_vertices.contains(&i) {
            sections[current].push(*v);
        }
        if let Some((_, x)) = pending.next_if(|(edge, _)| *edge == i) {
            let incoming = normalize(*x - *v);
            let outgoing = if cut_vertices.contains(&((i + 1) % n)) {
                normalize(ring[(i + 2) % n] - *x)
            } else {
                incoming
            };
            sections[current].push(*x - incoming * offset);
            sections.push(vec![*x + outgoing * offset]);
        }
    }
    // The ring starts mid-section; the tail wraps around onto the head.
    let mut tail = sections.pop().unwrap_or_default();
    tail.append(&mut sections[0]);
    sections[0] = tail;

    let mut groups = [Vec::new(), Vec::new()];
    for (k, section) in sections.into_iter().enumerate() {
        groups[k % 2].extend(section);
    }
    Ok(groups)
}
