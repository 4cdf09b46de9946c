// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer event routing for one editing session.

use celltrace_regions::{
    EditConfig, EditError, FrameSegmentation, Region, RegionKey, RegionSnapshot, Segmentation,
    VertexIndex,
};
use kurbo::{Line, Point, Size};
use tracing::{debug, warn};

use crate::clipboard::Clipboard;
use crate::gesture::{Gesture, GestureKind};
use crate::highlight::HighlightState;
use crate::hit::{Hit, HitTester};
use crate::history::EditHistory;
use crate::mode::EditMode;
use crate::observer::EditObserver;
use crate::viewport::Viewport;

/// Copies of the frames an edit touched, by frame index.
type FrameSnapshots = Vec<(usize, FrameSegmentation)>;

/// Interactive editing of a [`Segmentation`], one displayed frame at a time.
///
/// The host forwards pointer events in canvas pixels; the session converts them
/// through its [`Viewport`], hit tests the displayed frame, and turns each completed
/// gesture into at most one committed edit. Every commit is recorded in the undo
/// history, as copies of the frames it touched, and reported to the [`EditObserver`]. A rejected edit is logged,
/// returned from [`pointer_up`](Self::pointer_up), and changes nothing.
///
/// After a committed edit the session returns to [`EditMode::Vertex`], except that
/// copying switches to [`EditMode::RegionPaste`] and the paste, link, label, and
/// select modes stay active.
#[derive(Debug)]
pub struct EditSession {
    segmentation: Segmentation,
    config: EditConfig,
    viewport: Viewport,
    hit_tester: HitTester,
    image_width: f64,
    frame: usize,
    mode: EditMode,
    highlight: HighlightState<RegionKey>,
    handle: Option<VertexIndex>,
    gesture: Option<Gesture>,
    clipboard: Clipboard,
    history: EditHistory<FrameSnapshots>,
    merge_first: Option<RegionKey>,
    link_source: Option<(usize, RegionKey)>,
    label: Option<String>,
}

impl EditSession {
    /// Start a session on frame 0 in vertex mode.
    ///
    /// `canvas` is the drawing surface in pixels and `image_width` the width of the
    /// frame images in pixels, which sets the split gap.
    pub fn new(
        segmentation: Segmentation,
        config: EditConfig,
        canvas: Size,
        image_width: f64,
    ) -> Self {
        Self {
            segmentation,
            hit_tester: HitTester::new(config.handle_radius_px),
            history: EditHistory::new(config.history_depth),
            config,
            viewport: Viewport::new(canvas),
            image_width,
            frame: 0,
            mode: EditMode::Vertex,
            highlight: HighlightState::new(),
            handle: None,
            gesture: None,
            clipboard: Clipboard::new(),
            merge_first: None,
            link_source: None,
            label: None,
        }
    }

    // --- state ---

    /// The edited segmentation.
    pub fn segmentation(&self) -> &Segmentation {
        &self.segmentation
    }

    /// Mutable access for changes outside pointer editing, such as generating
    /// trajectory ids. Changes made here are not recorded in the history.
    pub fn segmentation_mut(&mut self) -> &mut Segmentation {
        &mut self.segmentation
    }

    /// End the session and return the segmentation.
    pub fn into_segmentation(self) -> Segmentation {
        self.segmentation
    }

    /// The displayed frame.
    pub fn frame(&self) -> Result<&FrameSegmentation, EditError> {
        self.segmentation
            .frame(self.frame)
            .ok_or(EditError::UnknownFrame(self.frame))
    }

    /// Index of the displayed frame.
    pub fn frame_index(&self) -> usize {
        self.frame
    }

    /// The editing parameters.
    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The viewport, for zoom controls and canvas resizes.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// The active edit mode.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// The region the pointer acts on.
    pub fn current_region(&self) -> Option<RegionKey> {
        self.highlight.current()
    }

    /// The vertex handle under the pointer, in vertex mode.
    pub fn current_handle(&self) -> Option<VertexIndex> {
        self.handle
    }

    /// The first region picked in merge mode.
    pub fn merge_candidate(&self) -> Option<RegionKey> {
        self.merge_first
    }

    /// The frame and region picked as a link source.
    pub fn link_source(&self) -> Option<(usize, RegionKey)> {
        self.link_source
    }

    /// The line being drawn in split or trim mode.
    pub fn cut_line(&self) -> Option<Line> {
        self.gesture.as_ref().and_then(Gesture::cut_line)
    }

    /// The copy/paste buffer.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// The label toggled in label mode.
    pub fn current_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Set the label toggled in label mode.
    pub fn set_current_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Whether there is an edit to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether there is an edit to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- mode and frame ---

    /// Switch edit mode, abandoning any gesture in progress.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.cancel_gesture();
        if mode != EditMode::RegionLink {
            self.link_source = None;
        }
        self.merge_first = None;
        self.handle = None;
        debug!(from = ?self.mode, to = ?mode, "edit mode changed");
        self.mode = mode;
    }

    /// Display another frame. A picked link source survives the switch.
    pub fn set_frame<O: EditObserver + ?Sized>(
        &mut self,
        frame: usize,
        observer: &mut O,
    ) -> Result<(), EditError> {
        if frame >= self.segmentation.len() {
            return Err(EditError::UnknownFrame(frame));
        }
        self.cancel_gesture();
        self.clear_highlight(observer);
        self.merge_first = None;
        self.frame = frame;
        Ok(())
    }

    // --- pointer events ---

    /// Pointer pressed at canvas position `px`.
    pub fn pointer_down<O: EditObserver + ?Sized>(&mut self, px: Point, observer: &mut O) {
        self.cancel_gesture();
        let p = self.viewport.to_normalized(px);
        let hit = self.hit(p);
        self.apply_hit(hit, observer);

        let frame = self.segmentation.frame(self.frame);
        let snapshot_of = |key: RegionKey| frame.and_then(|f| f.snapshot(key));
        let kind = match self.mode {
            EditMode::Vertex => match (hit.region, hit.handle) {
                (Some(key), Some(vertex)) => match snapshot_of(key) {
                    Some(snapshot) => GestureKind::Handle {
                        key,
                        vertex,
                        snapshot,
                    },
                    None => GestureKind::Click,
                },
                _ => GestureKind::Click,
            },
            EditMode::RegionMove | EditMode::RegionRotate => {
                match hit.region.and_then(|k| snapshot_of(k).map(|s| (k, s))) {
                    Some((key, snapshot)) => GestureKind::Region { key, snapshot },
                    None => GestureKind::Click,
                }
            }
            EditMode::RegionSplit | EditMode::RegionTrim => GestureKind::Cut {
                line: Line::new(p, p),
            },
            EditMode::RegionSelect => GestureKind::Pan {
                origin: self.viewport.center(),
            },
            _ => GestureKind::Click,
        };
        self.gesture = Some(Gesture::new(px, p, hit, kind));
    }

    /// Pointer moved to canvas position `px`, pressed or not.
    pub fn pointer_move<O: EditObserver + ?Sized>(&mut self, px: Point, observer: &mut O) {
        let p = self.viewport.to_normalized(px);
        let Some(mut gesture) = self.gesture.take() else {
            let hit = self.hit(p);
            self.apply_hit(hit, observer);
            return;
        };
        if px != gesture.start_px {
            gesture.moved = true;
        }
        if let Err(err) = self.drag(&mut gesture, px, p) {
            warn!(%err, mode = ?self.mode, "drag update rejected");
        }
        self.gesture = Some(gesture);
    }

    /// Pointer released at canvas position `px`; commits the gesture.
    ///
    /// Returns the reason when the edit was rejected. The segmentation is unchanged
    /// in that case.
    pub fn pointer_up<O: EditObserver + ?Sized>(
        &mut self,
        px: Point,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(());
        };
        let p = self.viewport.to_normalized(px);
        let moved = gesture.moved || px != gesture.start_px;
        let result = self.finish(gesture, p, moved, observer);
        if let Err(err) = &result {
            warn!(%err, mode = ?self.mode, frame = self.frame, "edit rejected");
        }
        let hit = self.hit(p);
        self.apply_hit(hit, observer);
        result
    }

    /// Pointer left the canvas: abandon the gesture and clear the highlight.
    pub fn pointer_leave<O: EditObserver + ?Sized>(&mut self, observer: &mut O) {
        self.cancel_gesture();
        self.clear_highlight(observer);
    }

    // --- history ---

    /// Revert the most recent committed edit. Returns whether anything changed.
    pub fn undo<O: EditObserver + ?Sized>(&mut self, observer: &mut O) -> bool {
        self.cancel_gesture();
        let segmentation = &mut self.segmentation;
        let changed = self.history.undo(|frames| swap_frames(segmentation, frames));
        if changed {
            self.reset_transient(observer);
        }
        changed
    }

    /// Reapply the most recently undone edit. Returns whether anything changed.
    pub fn redo<O: EditObserver + ?Sized>(&mut self, observer: &mut O) -> bool {
        self.cancel_gesture();
        let segmentation = &mut self.segmentation;
        let changed = self.history.redo(|frames| swap_frames(segmentation, frames));
        if changed {
            self.reset_transient(observer);
        }
        changed
    }

    // --- internals ---

    fn frame_mut(&mut self) -> Result<&mut FrameSegmentation, EditError> {
        self.segmentation.try_frame_mut(self.frame)
    }

    fn hit(&self, p: Point) -> Hit {
        match self.segmentation.frame(self.frame) {
            Some(frame) => self.hit_tester.hit(
                frame,
                &self.viewport,
                self.mode,
                p,
                self.highlight.current(),
            ),
            None => Hit::default(),
        }
    }

    fn apply_hit<O: EditObserver + ?Sized>(&mut self, hit: Hit, observer: &mut O) {
        self.handle = hit.handle;
        if let Some(change) = self.highlight.update(hit.region) {
            if let Some(frame) = self.segmentation.frame_mut(self.frame) {
                frame.set_highlight(change.current);
            }
            observer.region_highlighted(change.previous, change.current);
        }
    }

    fn clear_highlight<O: EditObserver + ?Sized>(&mut self, observer: &mut O) {
        self.apply_hit(Hit::default(), observer);
    }

    fn reset_transient<O: EditObserver + ?Sized>(&mut self, observer: &mut O) {
        self.merge_first = None;
        self.link_source = None;
        self.clear_highlight(observer);
    }

    fn cancel_gesture(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let Some(frame) = self.segmentation.frame_mut(self.frame) else {
            return;
        };
        if let Err(err) = gesture.cancel(frame, &mut self.viewport) {
            warn!(%err, "could not restore gesture snapshot");
        }
    }

    fn drag(&mut self, gesture: &mut Gesture, px: Point, p: Point) -> Result<(), EditError> {
        let start = gesture.start;
        let delta = gesture.drag_px(px);
        match &mut gesture.kind {
            GestureKind::Click => {}
            GestureKind::Handle { key, vertex, .. } => {
                self.frame_mut()?.move_vertex(*key, *vertex, p)?;
            }
            GestureKind::Region { key, snapshot } => {
                let key = *key;
                if self.mode == EditMode::RegionRotate {
                    let c = snapshot.region().bounds().center();
                    let theta = (p - c).atan2() - (start - c).atan2();
                    self.frame_mut()?
                        .rotate_region(key, snapshot.region().vertices(), theta)?;
                } else {
                    self.frame_mut()?
                        .move_region(key, snapshot.region().vertices(), p - start)?;
                }
            }
            GestureKind::Cut { line } => line.p1 = p,
            GestureKind::Pan { origin } => {
                self.viewport.pan_from(*origin, delta);
            }
        }
        Ok(())
    }

    fn finish<O: EditObserver + ?Sized>(
        &mut self,
        gesture: Gesture,
        p: Point,
        moved: bool,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let frame = self.frame;
        let hit = gesture.hit;
        match gesture.kind {
            GestureKind::Handle {
                key,
                vertex,
                snapshot,
            } => {
                if moved {
                    self.frame_mut()?.move_vertex(key, vertex, p)?;
                    self.record_drag(key, snapshot)?;
                } else {
                    self.commit(&[frame], |seg| {
                        seg.try_frame_mut(frame)?.remove_vertex(key, vertex)
                    })?;
                }
                observer.region_edited(frame, key);
            }
            GestureKind::Region { key, snapshot } => {
                if moved {
                    self.record_drag(key, snapshot)?;
                    observer.region_edited(frame, key);
                }
            }
            GestureKind::Cut { line } => {
                let line = Line::new(line.p0, p);
                if self.mode == EditMode::RegionTrim {
                    self.trim(line, observer)?;
                } else {
                    self.split(line, hit.region, observer)?;
                }
            }
            GestureKind::Pan { .. } => {
                if !moved {
                    self.select(p, hit.region, observer)?;
                }
            }
            GestureKind::Click => {
                if !moved {
                    self.click(p, hit.region, observer)?;
                }
            }
        }
        Ok(())
    }

    fn click<O: EditObserver + ?Sized>(
        &mut self,
        p: Point,
        region: Option<RegionKey>,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let frame = self.frame;
        match self.mode {
            EditMode::Vertex => {
                if let Some(key) = region {
                    self.commit(&[frame], |seg| seg.try_frame_mut(frame)?.add_vertex(key, p))?;
                    observer.region_edited(frame, key);
                }
            }
            EditMode::RegionEdit => match region {
                Some(key) => {
                    let frames = with_previous(frame);
                    let removed = self.commit(&frames, |seg| seg.remove_region(frame, key))?;
                    observer.region_removed(frame, removed.id());
                }
                None => {
                    let radius = self
                        .frame()?
                        .default_seed_radius(self.config.default_region_radius);
                    let key = self.commit(&[frame], |seg| {
                        seg.try_frame_mut(frame)?.add_region(p, radius)
                    })?;
                    observer.region_edited(frame, key);
                }
            },
            EditMode::RegionMerge => self.merge_click(region, observer)?,
            EditMode::RegionCopy => {
                if let Some(key) = region {
                    let ring = self.frame()?.copy_region(key)?;
                    self.clipboard.copy(ring);
                    self.mode = self.mode.after_commit();
                    debug!(?key, "copied region outline");
                }
            }
            EditMode::RegionPaste => {
                let ring = self.clipboard.contents()?.to_vec();
                let key = self.commit(&[frame], |seg| {
                    seg.try_frame_mut(frame)?.paste_region(&ring, p)
                })?;
                observer.region_edited(frame, key);
            }
            EditMode::RegionLink => self.link_click(region, observer)?,
            EditMode::RegionLabel => {
                let Some(key) = region else { return Ok(()) };
                let Some(label) = self.label.clone() else {
                    warn!(?key, "label mode without a current label");
                    return Ok(());
                };
                self.commit(&[frame], |seg| {
                    seg.try_frame_mut(frame)?.toggle_label(key, &label)
                })?;
                observer.region_edited(frame, key);
            }
            EditMode::RegionMove
            | EditMode::RegionRotate
            | EditMode::RegionSplit
            | EditMode::RegionTrim
            | EditMode::RegionSelect => {}
        }
        Ok(())
    }

    fn merge_click<O: EditObserver + ?Sized>(
        &mut self,
        region: Option<RegionKey>,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let frame = self.frame;
        match (self.merge_first, region) {
            (Some(a), Some(b)) if a != b => {
                self.merge_first = None;
                let factor = self.config.merge_threshold_factor;
                let removed = self
                    .frame()?
                    .get(b)
                    .ok_or(EditError::UnknownRegion(b))?
                    .id()
                    .clone();
                let frames = with_previous(frame);
                self.commit(&frames, |seg| seg.merge_regions(frame, a, b, factor))?;
                observer.region_edited(frame, a);
                observer.region_removed(frame, &removed);
            }
            (None, Some(first)) => self.merge_first = Some(first),
            _ => self.merge_first = None,
        }
        Ok(())
    }

    fn link_click<O: EditObserver + ?Sized>(
        &mut self,
        region: Option<RegionKey>,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let frame = self.frame;
        let Some(key) = region else {
            self.link_source = None;
            return Ok(());
        };
        match self.link_source {
            Some(source) if source == (frame, key) => {
                self.link_source = None;
                let linked = self.frame()?.get(key).and_then(Region::link_id).is_some();
                if linked {
                    self.commit(&[frame], |seg| seg.unlink(frame, key))?;
                    observer.region_edited(frame, key);
                }
            }
            Some((from_frame, from)) if from_frame + 1 == frame => {
                self.link_source = None;
                self.commit(&[from_frame], |seg| seg.link(from_frame, from, key))?;
                observer.region_edited(from_frame, from);
            }
            _ => self.link_source = Some((frame, key)),
        }
        Ok(())
    }

    fn split<O: EditObserver + ?Sized>(
        &mut self,
        line: Line,
        target: Option<RegionKey>,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let frame = self.frame;
        let offset = self.config.split_offset(self.image_width);
        let target = match target {
            Some(key) => key,
            None => match self.frame()?.regions_crossing(line).first() {
                Some(key) => *key,
                None => return Ok(()),
            },
        };
        let created = self.commit(&[frame], |seg| {
            seg.try_frame_mut(frame)?.split_region(target, line, offset)
        })?;
        observer.region_edited(frame, target);
        observer.region_edited(frame, created);
        Ok(())
    }

    fn trim<O: EditObserver + ?Sized>(
        &mut self,
        line: Line,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let frame = self.frame;
        let candidates = self.frame()?.regions_crossing(line);
        if candidates.is_empty() {
            return Ok(());
        }
        let trimmed = self.commit(&[frame], |seg| {
            let f = seg.try_frame_mut(frame)?;
            let mut trimmed = Vec::new();
            for key in candidates {
                match f.trim_region(key, line) {
                    Ok(()) => trimmed.push(key),
                    Err(err) => warn!(?key, %err, "trim rejected"),
                }
            }
            if trimmed.is_empty() {
                Err(EditError::NotCrossed)
            } else {
                Ok(trimmed)
            }
        })?;
        for key in trimmed {
            observer.region_edited(frame, key);
        }
        Ok(())
    }

    fn select<O: EditObserver + ?Sized>(
        &mut self,
        p: Point,
        region: Option<RegionKey>,
        observer: &mut O,
    ) -> Result<(), EditError> {
        let frame = self.frame;
        let bounds = region.and_then(|k| self.frame().ok()?.get(k).map(|r| (k, r.bounds())));
        match bounds {
            Some((key, bounds)) => {
                self.frame_mut()?.set_selected(Some(key));
                self.viewport.zoom_to_region(bounds);
                observer.region_selected(frame, key);
            }
            None => {
                let size = self.frame()?.mean_region_size();
                self.viewport.zoom_to_point(p, size);
            }
        }
        Ok(())
    }

    /// Run `op`, which may change only `frames`; on success record their prior
    /// state and leave the mode per [`EditMode::after_commit`].
    fn commit<T>(
        &mut self,
        frames: &[usize],
        op: impl FnOnce(&mut Segmentation) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        let before = frames
            .iter()
            .filter_map(|&i| Some((i, self.segmentation.frame(i)?.clone())))
            .collect();
        let out = op(&mut self.segmentation)?;
        self.record(before);
        Ok(out)
    }

    /// Record a live drag: the prior state is the current frame with the snapshot put back.
    fn record_drag(&mut self, key: RegionKey, snapshot: RegionSnapshot) -> Result<(), EditError> {
        let mut before = self.frame()?.clone();
        before.restore(key, snapshot)?;
        self.record(vec![(self.frame, before)]);
        Ok(())
    }

    fn record(&mut self, before: FrameSnapshots) {
        self.history.record(before);
        let next = self.mode.after_commit();
        if next != self.mode {
            debug!(from = ?self.mode, to = ?next, "edit committed; switching mode");
        }
        self.mode = next;
    }
}

/// Frames touched by edits that also retarget links from the previous frame.
fn with_previous(frame: usize) -> Vec<usize> {
    frame.checked_sub(1).into_iter().chain([frame]).collect()
}

/// Put `frames` back into `segmentation`, returning the copies they replaced.
fn swap_frames(segmentation: &mut Segmentation, frames: FrameSnapshots) -> FrameSnapshots {
    frames
        .into_iter()
        .filter_map(|(i, frame)| {
            let slot = segmentation.frame_mut(i)?;
            Some((i, core::mem::replace(slot, frame)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::EditEvent;
    use celltrace_regions::{RegionFlags, RegionId};
    use kurbo::Rect;

    // Canvas and image are 256 px, so at zoom 1 a pixel maps to px / 256.
    const SIDE: f64 = 256.0;

    fn square(id: &str, x0: f64, y0: f64, side: f64) -> Region {
        Region::new(
            RegionId::from(id),
            vec![
                Point::new(x0, y0),
                Point::new(x0 + side, y0),
                Point::new(x0 + side, y0 + side),
                Point::new(x0, y0 + side),
            ],
        )
        .unwrap()
    }

    // Frame 0: object1 at px 64..96, object2 at px 128..160 (both rows 64..96).
    // Frame 1: object1 at px 64..96.
    fn session() -> (EditSession, RegionKey, RegionKey) {
        let f0 = FrameSegmentation::from_regions(
            "object",
            [
                square("object1", 0.25, 0.25, 0.125),
                square("object2", 0.5, 0.25, 0.125),
            ],
        )
        .unwrap();
        let f1 =
            FrameSegmentation::from_regions("object", [square("object1", 0.25, 0.25, 0.125)])
                .unwrap();
        let a = f0.key_of(&RegionId::from("object1")).unwrap();
        let b = f0.key_of(&RegionId::from("object2")).unwrap();
        let s = EditSession::new(
            Segmentation::new(vec![f0, f1]),
            EditConfig::default(),
            Size::new(SIDE, SIDE),
            SIDE,
        );
        (s, a, b)
    }

    fn click(s: &mut EditSession, x: f64, y: f64, ev: &mut Vec<EditEvent>) -> Result<(), EditError> {
        s.pointer_down(Point::new(x, y), ev);
        s.pointer_up(Point::new(x, y), ev)
    }

    fn drag(
        s: &mut EditSession,
        from: (f64, f64),
        to: (f64, f64),
        ev: &mut Vec<EditEvent>,
    ) -> Result<(), EditError> {
        s.pointer_down(from.into(), ev);
        s.pointer_move(to.into(), ev);
        s.pointer_up(to.into(), ev)
    }

    fn edits(ev: &[EditEvent]) -> Vec<EditEvent> {
        ev.iter()
            .filter(|e| !matches!(e, EditEvent::Highlighted { .. }))
            .cloned()
            .collect()
    }

    #[test]
    fn hover_reports_highlight_changes_once() {
        let (mut s, a, b) = session();
        s.set_mode(EditMode::RegionMove);
        let mut ev = Vec::new();
        s.pointer_move(Point::new(80.0, 80.0), &mut ev);
        s.pointer_move(Point::new(81.0, 80.0), &mut ev);
        s.pointer_move(Point::new(144.0, 80.0), &mut ev);
        s.pointer_move(Point::new(112.0, 80.0), &mut ev);
        assert_eq!(
            ev,
            vec![
                EditEvent::Highlighted {
                    previous: None,
                    current: Some(a)
                },
                EditEvent::Highlighted {
                    previous: Some(a),
                    current: Some(b)
                },
                EditEvent::Highlighted {
                    previous: Some(b),
                    current: None
                },
            ]
        );
        let frame = s.frame().unwrap();
        assert!(!frame.get(b).unwrap().flags().contains(RegionFlags::HIGHLIGHT));
    }

    #[test]
    fn vertex_mode_keeps_region_and_adds_outside_vertex() {
        let (mut s, a, _) = session();
        let mut ev = Vec::new();
        s.pointer_move(Point::new(80.0, 80.0), &mut ev);
        s.pointer_move(Point::new(80.0, 60.0), &mut ev);
        assert_eq!(s.current_region(), Some(a));
        assert_eq!(s.current_handle(), None);

        click(&mut s, 80.0, 60.0, &mut ev).unwrap();
        let region = s.frame().unwrap().get(a).unwrap();
        assert_eq!(region.vertices().len(), 5);
        assert_eq!(region.vertices()[1], Point::new(0.3125, 0.234375));
        assert_eq!(edits(&ev), vec![EditEvent::Edited { frame: 0, key: a }]);

        assert!(s.undo(&mut ev));
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 4);
        assert!(s.redo(&mut ev));
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 5);
    }

    #[test]
    fn dragging_a_handle_commits_once() {
        let (mut s, a, _) = session();
        let mut ev = Vec::new();
        s.pointer_down(Point::new(65.0, 65.0), &mut ev);
        assert_eq!(s.current_handle(), Some(VertexIndex(0)));
        s.pointer_move(Point::new(60.0, 60.0), &mut ev);
        s.pointer_move(Point::new(58.0, 58.0), &mut ev);
        s.pointer_up(Point::new(58.0, 58.0), &mut ev).unwrap();

        let region = s.frame().unwrap().get(a).unwrap();
        assert_eq!(region.vertices()[0], Point::new(0.2265625, 0.2265625));
        assert_eq!(edits(&ev), vec![EditEvent::Edited { frame: 0, key: a }]);

        assert!(s.undo(&mut ev));
        let region = s.frame().unwrap().get(a).unwrap();
        assert_eq!(region.vertices()[0], Point::new(0.25, 0.25));
        assert!(!s.can_undo());
    }

    #[test]
    fn undo_restores_only_the_frames_an_edit_touched() {
        let (mut s, a, _) = session();
        let mut ev = Vec::new();
        click(&mut s, 65.0, 65.0, &mut ev).unwrap();
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 3);

        // Unrecorded change in frame 1, made after the commit.
        let f1 = s.segmentation_mut().try_frame_mut(1).unwrap();
        let c = f1.key_of(&RegionId::from("object1")).unwrap();
        f1.remove_region(c).unwrap();

        assert!(s.undo(&mut ev));
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 4);
        assert!(s.segmentation().frame(1).unwrap().is_empty());
        assert!(s.redo(&mut ev));
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 3);
        assert!(s.segmentation().frame(1).unwrap().is_empty());
    }

    #[test]
    fn undoing_a_removal_restores_incoming_links() {
        let (mut s, a, _) = session();
        let c = s.segmentation().frame(1).unwrap();
        let c = c.key_of(&RegionId::from("object1")).unwrap();
        s.segmentation_mut().link(0, a, c).unwrap();

        let mut ev = Vec::new();
        s.set_frame(1, &mut ev).unwrap();
        s.set_mode(EditMode::RegionEdit);
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(s.segmentation().linked(0, a), None);

        assert!(s.undo(&mut ev));
        assert!(s.frame().unwrap().is_alive(c));
        assert_eq!(s.segmentation().linked(0, a), Some(c));
        assert!(!s.can_undo());
    }

    #[test]
    fn rejected_edit_records_nothing() {
        let (mut s, a, _) = session();
        let mut ev = Vec::new();
        click(&mut s, 65.0, 65.0, &mut ev).unwrap();
        assert!(s.undo(&mut ev));
        assert!(!s.can_undo());

        s.set_mode(EditMode::RegionPaste);
        assert_eq!(
            click(&mut s, 200.0, 200.0, &mut ev),
            Err(EditError::EmptyClipboard)
        );
        s.set_mode(EditMode::RegionSplit);
        // Starts and ends inside the region, so nothing is crossed.
        assert_eq!(
            drag(&mut s, (70.0, 80.0), (90.0, 80.0), &mut ev),
            Err(EditError::NotCrossed)
        );
        assert!(!s.can_undo());
        assert!(s.can_redo());
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 4);
    }

    #[test]
    fn leaving_the_canvas_mid_drag_commits_nothing() {
        let (mut s, a, _) = session();
        s.segmentation_mut().try_frame_mut(0).unwrap().mark_saved();
        s.set_mode(EditMode::RegionMove);
        let mut ev = Vec::new();
        s.pointer_down(Point::new(80.0, 80.0), &mut ev);
        s.pointer_move(Point::new(112.0, 80.0), &mut ev);
        assert_eq!(s.frame().unwrap().get(a).unwrap().bounds().x0, 0.375);

        s.pointer_leave(&mut ev);
        let region = s.frame().unwrap().get(a).unwrap();
        assert_eq!(region.bounds(), Rect::new(0.25, 0.25, 0.375, 0.375));
        assert!(edits(&ev).is_empty());
        assert!(!s.can_undo());
        assert_eq!(s.mode(), EditMode::RegionMove);
        assert_eq!(s.frame().unwrap().hit_test(Point::new(0.4, 0.3)), None);
        assert!(!s.frame().unwrap().is_edited());
    }

    #[test]
    fn moving_a_region_returns_to_vertex_mode() {
        let (mut s, a, _) = session();
        s.set_mode(EditMode::RegionMove);
        let mut ev = Vec::new();
        drag(&mut s, (80.0, 80.0), (80.0, 112.0), &mut ev).unwrap();
        let region = s.frame().unwrap().get(a).unwrap();
        assert_eq!(region.bounds(), Rect::new(0.25, 0.375, 0.375, 0.5));
        assert_eq!(s.mode(), EditMode::Vertex);
    }

    #[test]
    fn handle_click_removes_vertex_down_to_three() {
        let (mut s, a, _) = session();
        let mut ev = Vec::new();
        click(&mut s, 65.0, 65.0, &mut ev).unwrap();
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 3);

        // Remaining corner (96, 64) is still a handle; removing it is refused.
        let err = click(&mut s, 95.0, 66.0, &mut ev).unwrap_err();
        assert_eq!(err, EditError::MinimumVertices);
        assert_eq!(s.frame().unwrap().get(a).unwrap().vertices().len(), 3);
        assert_eq!(edits(&ev).len(), 1);
    }

    #[test]
    fn merge_takes_two_clicks() {
        let (mut s, a, b) = session();
        s.set_mode(EditMode::RegionMerge);
        let mut ev = Vec::new();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(s.merge_candidate(), Some(a));
        assert!(edits(&ev).is_empty());

        click(&mut s, 144.0, 80.0, &mut ev).unwrap();
        let frame = s.frame().unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(a).unwrap().vertices().len(), 7);
        assert_eq!(
            edits(&ev),
            vec![
                EditEvent::Edited { frame: 0, key: a },
                EditEvent::Removed {
                    frame: 0,
                    id: RegionId::from("object2")
                },
            ]
        );
        assert_eq!(s.mode(), EditMode::Vertex);

        assert!(s.undo(&mut ev));
        assert!(s.frame().unwrap().is_alive(b));
    }

    #[test]
    fn clicking_the_merge_candidate_again_clears_it() {
        let (mut s, _, _) = session();
        s.set_mode(EditMode::RegionMerge);
        let mut ev = Vec::new();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(s.merge_candidate(), None);
        assert_eq!(s.frame().unwrap().len(), 2);
    }

    #[test]
    fn split_line_drawn_from_outside_cuts_the_crossed_region() {
        let (mut s, a, _) = session();
        s.set_mode(EditMode::RegionSplit);
        let mut ev = Vec::new();
        s.pointer_down(Point::new(80.0, 56.0), &mut ev);
        s.pointer_move(Point::new(80.0, 104.0), &mut ev);
        assert_eq!(
            s.cut_line(),
            Some(Line::new((0.3125, 0.21875), (0.3125, 0.40625)))
        );
        s.pointer_up(Point::new(80.0, 104.0), &mut ev).unwrap();

        let frame = s.frame().unwrap();
        assert_eq!(frame.len(), 3);
        let created = frame.key_of(&RegionId::from("object3")).unwrap();
        assert_eq!(
            edits(&ev),
            vec![
                EditEvent::Edited { frame: 0, key: a },
                EditEvent::Edited {
                    frame: 0,
                    key: created
                },
            ]
        );
        assert_eq!(s.mode(), EditMode::Vertex);
    }

    #[test]
    fn trim_cuts_every_crossed_region() {
        let (mut s, a, b) = session();
        s.set_mode(EditMode::RegionTrim);
        let mut ev = Vec::new();
        drag(&mut s, (56.0, 72.0), (168.0, 72.0), &mut ev).unwrap();
        let frame = s.frame().unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(a).unwrap().bounds().y0, 0.28125);
        assert_eq!(frame.get(b).unwrap().bounds().y0, 0.28125);
        assert_eq!(
            edits(&ev),
            vec![
                EditEvent::Edited { frame: 0, key: a },
                EditEvent::Edited { frame: 0, key: b },
            ]
        );
    }

    #[test]
    fn region_edit_removes_then_seeds() {
        let (mut s, _, _) = session();
        s.set_mode(EditMode::RegionEdit);
        let mut ev = Vec::new();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(
            edits(&ev),
            vec![EditEvent::Removed {
                frame: 0,
                id: RegionId::from("object1")
            }]
        );
        assert_eq!(s.mode(), EditMode::Vertex);

        s.set_mode(EditMode::RegionEdit);
        click(&mut s, 200.0, 200.0, &mut ev).unwrap();
        let frame = s.frame().unwrap();
        let seeded = frame.key_of(&RegionId::from("object3")).unwrap();
        assert_eq!(frame.hit_test(Point::new(0.78125, 0.78125)), Some(seeded));
        // Seed radius is half the mean width of the remaining region.
        let width = frame.get(seeded).unwrap().bounds().width();
        assert!((width - 2.0 * 0.0625 * (core::f64::consts::FRAC_PI_6).cos()).abs() < 1e-12);
    }

    #[test]
    fn copy_switches_to_paste_and_paste_stays() {
        let (mut s, _, _) = session();
        s.set_mode(EditMode::RegionCopy);
        let mut ev = Vec::new();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(s.mode(), EditMode::RegionPaste);
        assert!(!s.can_undo());

        click(&mut s, 200.0, 200.0, &mut ev).unwrap();
        assert_eq!(s.mode(), EditMode::RegionPaste);
        let frame = s.frame().unwrap();
        let pasted = frame.key_of(&RegionId::from("object3")).unwrap();
        assert_eq!(
            frame.get(pasted).unwrap().bounds(),
            Rect::new(0.71875, 0.71875, 0.84375, 0.84375)
        );
    }

    #[test]
    fn paste_with_empty_clipboard_is_rejected() {
        let (mut s, _, _) = session();
        s.set_mode(EditMode::RegionPaste);
        let mut ev = Vec::new();
        assert_eq!(
            click(&mut s, 200.0, 200.0, &mut ev),
            Err(EditError::EmptyClipboard)
        );
        assert_eq!(s.frame().unwrap().len(), 2);
    }

    #[test]
    fn link_across_frames_and_break_it() {
        let (mut s, a, _) = session();
        s.set_mode(EditMode::RegionLink);
        let mut ev = Vec::new();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(s.link_source(), Some((0, a)));

        s.set_frame(1, &mut ev).unwrap();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        let c = s.frame().unwrap().key_of(&RegionId::from("object1")).unwrap();
        assert_eq!(s.segmentation().linked(0, a), Some(c));
        assert_eq!(s.link_source(), None);
        assert_eq!(edits(&ev), vec![EditEvent::Edited { frame: 0, key: a }]);

        s.set_frame(0, &mut ev).unwrap();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(s.segmentation().linked(0, a), None);
        assert_eq!(s.mode(), EditMode::RegionLink);

        assert_eq!(s.set_frame(5, &mut ev), Err(EditError::UnknownFrame(5)));
    }

    #[test]
    fn label_mode_toggles_current_label() {
        let (mut s, a, _) = session();
        s.set_mode(EditMode::RegionLabel);
        s.set_current_label(Some("mitosis".to_owned()));
        let mut ev = Vec::new();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert!(s.frame().unwrap().get(a).unwrap().has_label("mitosis"));
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert!(!s.frame().unwrap().get(a).unwrap().has_label("mitosis"));
        assert_eq!(s.mode(), EditMode::RegionLabel);
    }

    #[test]
    fn select_click_zooms_and_drag_pans() {
        let (mut s, a, _) = session();
        s.set_mode(EditMode::RegionSelect);
        let mut ev = Vec::new();
        click(&mut s, 80.0, 80.0, &mut ev).unwrap();
        assert_eq!(edits(&ev), vec![EditEvent::Selected { frame: 0, key: a }]);
        assert_eq!(s.viewport().zoom(), 4.0);
        assert_eq!(s.viewport().center(), Point::new(0.3125, 0.3125));
        let flags = s.frame().unwrap().get(a).unwrap().flags();
        assert!(flags.contains(RegionFlags::SELECTED));

        s.viewport_mut().reset();
        drag(&mut s, (128.0, 128.0), (160.0, 128.0), &mut ev).unwrap();
        assert_eq!(s.viewport().center(), Point::new(0.375, 0.5));
        assert_eq!(s.viewport().zoom(), 1.0);

        // Empty space: zoom to the point using the mean region size.
        click(&mut s, 200.0, 200.0, &mut ev).unwrap();
        assert_eq!(s.viewport().zoom(), 4.0);
        assert_eq!(s.viewport().center(), Point::new(0.65625, 0.78125));
    }
}
