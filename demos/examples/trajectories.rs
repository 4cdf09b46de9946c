// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load a segmentation, link regions across frames, and generate trajectory ids.
//!
//! Run:
//! - `cargo run -p celltrace_demos --example trajectories`

use celltrace_regions::{COLLISION, RegionId, Segmentation};
use tracing_subscriber::EnvFilter;

const FRAMES: &str = r#"[
    [
        { "id": "object1", "vertices": [[0.10, 0.10], [0.20, 0.10], [0.15, 0.20]], "link_id": "object1" },
        { "id": "object2", "vertices": [[0.60, 0.60], [0.70, 0.60], [0.65, 0.70]], "link_id": "object1" }
    ],
    [
        { "id": "object1", "vertices": [[0.12, 0.10], [0.22, 0.10], [0.17, 0.20]] },
        { "id": "object2", "vertices": [[0.62, 0.60], [0.72, 0.60], [0.67, 0.70]], "link_id": "object9" }
    ],
    [
        { "id": "object1", "vertices": [[0.64, 0.60], [0.74, 0.60], [0.69, 0.70]] }
    ]
]"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut seg = Segmentation::from_json_str(FRAMES, "object").unwrap();

    println!("== Dangling links ==");
    for d in seg.dangling_links() {
        println!("  frame {} {} -> {}", d.frame, d.region, d.link);
    }

    // Repair: frame 1's object2 continues as frame 2's object1.
    let from = seg.frame(1).unwrap().key_of(&RegionId::from("object2")).unwrap();
    let to = seg.frame(2).unwrap().key_of(&RegionId::from("object1")).unwrap();
    seg.link(1, from, to).unwrap();
    assert!(seg.dangling_links().is_empty());

    seg.generate_trajectory_ids();
    println!("== Trajectories ==");
    for (i, frame) in seg.frames().enumerate() {
        for (_, r) in frame.regions() {
            let t = r.trajectory_id().unwrap_or("-");
            let note = if t == COLLISION { "  (two links arrive here)" } else { "" };
            println!("  frame {i} {:<8} {t}{note}", r.id().as_str());
        }
    }

    println!("== Saved JSON ==\n{}", seg.to_json_string().unwrap());
}
