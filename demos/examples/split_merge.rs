// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split a region in two, merge it back, and trim it.
//!
//! Edits are logged through `tracing`; set `RUST_LOG` to change the level.
//!
//! Run:
//! - `cargo run -p celltrace_demos --example split_merge`

use celltrace_regions::{EditConfig, FrameSegmentation, Region, RegionId};
use kurbo::{Line, Point};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let cfg = EditConfig::default();
    let cell = Region::new(
        RegionId::from("object1"),
        vec![
            Point::new(0.2, 0.2),
            Point::new(0.6, 0.2),
            Point::new(0.6, 0.4),
            Point::new(0.2, 0.4),
        ],
    )
    .unwrap();
    let mut frame = FrameSegmentation::from_regions(&cfg.id_prefix, [cell]).unwrap();
    let key = frame.hit_test(Point::new(0.3, 0.3)).unwrap();

    // A 512 px wide image: the cut leaves a gap of 1.5 px on each side of the line.
    let offset = cfg.split_offset(512.0);
    let cut = Line::new((0.4, 0.1), (0.4, 0.5));
    let right = frame.split_region(key, cut, offset).unwrap();
    println!("== Split ==");
    for (k, r) in frame.regions() {
        println!("  {:?} {} bounds={:?}", k, r.id(), r.bounds());
    }

    // A line that stops inside the outline crosses it an odd number of times.
    let stub = Line::new((0.3, 0.1), (0.3, 0.3));
    println!("== Rejected split ==\n  {:?}", frame.split_region(key, stub, offset));

    frame
        .merge_regions(key, right, cfg.merge_threshold_factor)
        .unwrap();
    let merged = frame.get(key).unwrap();
    println!(
        "== Merge ==\n  {} vertices, bounds={:?}",
        merged.vertices().len(),
        merged.bounds()
    );

    frame
        .trim_region(key, Line::new((0.5, 0.1), (0.5, 0.5)))
        .unwrap();
    println!("== Trim ==\n  bounds={:?}", frame.get(key).unwrap().bounds());

    assert_eq!(frame.len(), 1);
}
