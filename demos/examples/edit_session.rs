// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive an editing session with pointer events and watch the notifications.
//!
//! Run:
//! - `cargo run -p celltrace_demos --example edit_session`

use celltrace_interact::{EditMode, EditObserver, EditSession};
use celltrace_regions::{
    EditConfig, FrameSegmentation, RegionId, RegionKey, Segmentation,
};
use kurbo::{Point, Size};
use tracing_subscriber::EnvFilter;

struct Printer;

impl EditObserver for Printer {
    fn region_edited(&mut self, frame: usize, key: RegionKey) {
        println!("  edited   frame={frame} {key:?}");
    }

    fn region_removed(&mut self, frame: usize, id: &RegionId) {
        println!("  removed  frame={frame} {id}");
    }

    fn region_highlighted(&mut self, previous: Option<RegionKey>, current: Option<RegionKey>) {
        println!("  highlight {previous:?} -> {current:?}");
    }

    fn region_selected(&mut self, frame: usize, key: RegionKey) {
        println!("  selected frame={frame} {key:?}");
    }
}

fn click(session: &mut EditSession, x: f64, y: f64, out: &mut Printer) {
    session.pointer_down(Point::new(x, y), out);
    if let Err(err) = session.pointer_up(Point::new(x, y), out) {
        println!("  rejected: {err}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let frames = Segmentation::new(vec![FrameSegmentation::new(), FrameSegmentation::new()]);
    let mut session = EditSession::new(
        frames,
        EditConfig::default(),
        Size::new(512.0, 512.0),
        512.0,
    );
    let mut out = Printer;

    println!("== Seed two regions ==");
    session.set_mode(EditMode::RegionEdit);
    click(&mut session, 128.0, 128.0, &mut out);
    session.set_mode(EditMode::RegionEdit);
    click(&mut session, 136.0, 128.0, &mut out);

    println!("== Add a vertex just outside the first region ==");
    session.pointer_move(Point::new(128.0, 128.0), &mut out);
    click(&mut session, 128.0, 120.0, &mut out);

    println!("== Merge them ==");
    session.set_mode(EditMode::RegionMerge);
    click(&mut session, 128.0, 128.0, &mut out);
    click(&mut session, 136.0, 128.0, &mut out);
    println!("  regions left: {}", session.frame().unwrap().len());

    println!("== Copy to the next frame ==");
    session.set_mode(EditMode::RegionCopy);
    click(&mut session, 128.0, 128.0, &mut out);
    session.set_frame(1, &mut out).unwrap();
    click(&mut session, 300.0, 300.0, &mut out);

    println!("== Undo the paste ==");
    session.undo(&mut out);
    println!("  frame 1 regions: {}", session.frame().unwrap().len());

    println!("== Zoom on a region ==");
    session.set_frame(0, &mut out).unwrap();
    session.set_mode(EditMode::RegionSelect);
    click(&mut session, 128.0, 128.0, &mut out);
    let vp = session.viewport();
    println!("  zoom={} center={:?}", vp.zoom(), vp.center());
}
