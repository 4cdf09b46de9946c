// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use celltrace_index::{Aabb2D, Index};
use celltrace_regions::{FrameSegmentation, Region, RegionId};
use kurbo::Point;

// An n×n grid of cell-sized boxes over the unit square, like one dense frame.
fn gen_grid_boxes(n: usize) -> Vec<Aabb2D> {
    let cell = 1.0 / n as f64;
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::from_xywh(x0, y0, cell * 0.8, cell * 0.8));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_pointer_positions(count: usize) -> Vec<(f64, f64)> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count).map(|_| (rng.next_f64(), rng.next_f64())).collect()
}

// Hexagonal cell outlines on the same grid as `gen_grid_boxes`.
fn gen_frame(n: usize) -> FrameSegmentation {
    let cell = 1.0 / n as f64;
    let r = cell * 0.4;
    let mut regions = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let c = Point::new((x as f64 + 0.4) * cell, (y as f64 + 0.4) * cell);
            let ring = (0..6)
                .map(|i| {
                    let a = i as f64 * core::f64::consts::FRAC_PI_3;
                    Point::new(c.x + r * a.cos(), c.y + r * a.sin())
                })
                .collect();
            let id = RegionId::new(format!("object{}", y * n + x + 1));
            regions.push(Region::new(id, ring).unwrap());
        }
    }
    FrameSegmentation::from_regions("object", regions).unwrap()
}

fn bench_insert_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_commit");
    for &n in &[16usize, 32, 64] {
        let boxes = gen_grid_boxes(n);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("flatvec_n{n}"), |b| {
            b.iter_batched(
                Index::<u32>::new,
                |mut idx| {
                    for (i, r) in boxes.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.commit());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("rtree_n{n}"), |b| {
            b.iter_batched(
                Index::<u32>::with_rtree,
                |mut idx| {
                    for (i, r) in boxes.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.commit());
                },
                BatchSize::SmallInput,
            )
        });
        let entries: Vec<(Aabb2D, u32)> = boxes
            .iter()
            .copied()
            .enumerate()
            .map(|(i, r)| (r, i as u32))
            .collect();
        group.bench_function(format!("rtree_bulk_n{n}"), |b| {
            b.iter(|| black_box(Index::<u32>::with_rtree_bulk(&entries).len()));
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let boxes = gen_grid_boxes(64);
    let entries: Vec<(Aabb2D, u32)> = boxes
        .iter()
        .copied()
        .enumerate()
        .map(|(i, r)| (r, i as u32))
        .collect();
    let mut flat = Index::<u32>::new();
    for &(r, i) in &entries {
        let _ = flat.insert(r, i);
    }
    let _ = flat.commit();
    let rtree = Index::<u32>::with_rtree_bulk(&entries);
    let points = gen_pointer_positions(256);
    let view = Aabb2D::from_xywh(0.25, 0.25, 0.125, 0.125);

    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("flatvec_nearest_k1", |b| {
        b.iter(|| {
            for &(x, y) in &points {
                black_box(flat.query_nearest(x, y, 1, |_| true));
            }
        });
    });
    group.bench_function("rtree_nearest_k1", |b| {
        b.iter(|| {
            for &(x, y) in &points {
                black_box(rtree.query_nearest(x, y, 1, |_| true));
            }
        });
    });
    group.bench_function("flatvec_point", |b| {
        b.iter(|| {
            for &(x, y) in &points {
                black_box(flat.query_point(x, y).count());
            }
        });
    });
    group.bench_function("rtree_point", |b| {
        b.iter(|| {
            for &(x, y) in &points {
                black_box(rtree.query_point(x, y).count());
            }
        });
    });
    group.throughput(Throughput::Elements(1));
    group.bench_function("flatvec_visible_rect", |b| {
        b.iter(|| black_box(flat.query_rect(view).count()));
    });
    group.bench_function("rtree_visible_rect", |b| {
        b.iter(|| black_box(rtree.query_rect(view).count()));
    });
    group.finish();
}

fn bench_frame_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_hit_test");
    let points: Vec<Point> = gen_pointer_positions(256)
        .into_iter()
        .map(Point::from)
        .collect();
    for &n in &[16usize, 64] {
        let frame = gen_frame(n);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function(format!("hexagons_n{n}"), |b| {
            b.iter(|| {
                for &p in &points {
                    black_box(frame.hit_test(p));
                }
            });
        });
    }
    group.finish();
}

fn bench_update_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_heavy");
    let boxes = gen_grid_boxes(64);
    group.bench_function("rtree_drag_one_box", |b| {
        b.iter_batched(
            || {
                let mut idx = Index::<u32>::with_rtree();
                let keys: Vec<_> = boxes
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(i, r)| idx.insert(r, i as u32))
                    .collect();
                let _ = idx.commit();
                (idx, keys[keys.len() / 2])
            },
            |(mut idx, key)| {
                // One region following the pointer: update then commit per move.
                for step in 0..64 {
                    let d = step as f64 * 0.001;
                    idx.update(key, Aabb2D::from_xywh(0.5 + d, 0.5, 0.01, 0.01));
                    black_box(idx.commit());
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_commit,
    bench_queries,
    bench_frame_hit_test,
    bench_update_heavy,
);
criterion_main!(benches);
