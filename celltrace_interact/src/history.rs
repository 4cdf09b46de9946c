// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded undo/redo.

use std::collections::VecDeque;

/// Undo and redo stacks of snapshots.
///
/// [`record`](Self::record) takes a snapshot of whatever a committed edit is about
/// to change. [`undo`](Self::undo) hands the most recent snapshot to a `swap`
/// closure, which puts it back and returns a snapshot of what it replaced; that is
/// kept for [`redo`](Self::redo), which works the same way in the other direction.
/// Recording a new edit drops the redo stack. At most `depth` undo steps are kept;
/// the oldest falls off.
///
/// ```
/// use celltrace_interact::EditHistory;
///
/// let mut h = EditHistory::new(2);
/// let mut state = 0;
/// for next in 1..=3 {
///     h.record(state);
///     state = next;
/// }
/// let mut swap = |prev| core::mem::replace(&mut state, prev);
/// assert!(h.undo(&mut swap));
/// assert!(h.undo(&mut swap));
/// assert!(!h.undo(&mut swap));
/// assert_eq!(state, 1);
/// ```
#[derive(Clone, Debug)]
pub struct EditHistory<S> {
    depth: usize,
    undo: VecDeque<S>,
    redo: Vec<S>,
}

impl<S> EditHistory<S> {
    /// Create a history keeping at most `depth` undo steps.
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            undo: VecDeque::with_capacity(depth),
            redo: Vec::new(),
        }
    }

    /// Maximum number of undo steps.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Push the state from before a committed edit.
    pub fn record(&mut self, before: S) {
        if self.depth == 0 {
            return;
        }
        if self.undo.len() == self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Step back: `swap` receives the snapshot to put back and returns a snapshot
    /// of what it replaced. Returns `false` without calling `swap` when there is
    /// nothing to undo.
    pub fn undo(&mut self, swap: impl FnOnce(S) -> S) -> bool {
        let Some(prev) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(swap(prev));
        true
    }

    /// Step forward again after an undo, swapping the same way as [`undo`](Self::undo).
    pub fn redo(&mut self, swap: impl FnOnce(S) -> S) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(swap(next));
        true
    }

    /// Whether [`undo`](Self::undo) would succeed.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`redo`](Self::redo) would succeed.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Drop all snapshots.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap_into<S>(state: &mut S) -> impl FnOnce(S) -> S + '_ {
        move |other| core::mem::replace(state, other)
    }

    #[test]
    fn undo_then_redo_restores_states() {
        let mut h = EditHistory::new(10);
        let mut s = "c";
        h.record("a");
        h.record("b");
        assert!(h.undo(swap_into(&mut s)));
        assert_eq!(s, "b");
        assert!(h.undo(swap_into(&mut s)));
        assert_eq!(s, "a");
        assert!(!h.can_undo());
        assert!(h.redo(swap_into(&mut s)));
        assert_eq!(s, "b");
        assert!(h.redo(swap_into(&mut s)));
        assert_eq!(s, "c");
        assert!(!h.redo(swap_into(&mut s)));
        assert_eq!(s, "c");
    }

    #[test]
    fn swap_sees_only_the_recorded_part() {
        // Snapshots hold (slot, value) pairs; untouched slots never go through history.
        let mut state = [10, 20, 30];
        let mut h = EditHistory::new(4);
        h.record(vec![(1, state[1])]);
        state[1] = 21;
        state[2] = 31;
        let mut swap = |parts: Vec<(usize, i32)>| {
            parts
                .into_iter()
                .map(|(i, v)| (i, core::mem::replace(&mut state[i], v)))
                .collect::<Vec<_>>()
        };
        assert!(h.undo(&mut swap));
        assert!(h.redo(&mut swap));
        assert!(h.undo(&mut swap));
        assert_eq!(state, [10, 20, 31]);
    }

    #[test]
    fn new_edit_drops_redo() {
        let mut h = EditHistory::new(10);
        let mut s = 2;
        h.record(1);
        assert!(h.undo(swap_into(&mut s)));
        assert!(h.can_redo());
        h.record(s);
        assert!(!h.can_redo());
    }

    #[test]
    fn depth_bounds_undo() {
        let mut h = EditHistory::new(3);
        for i in 0..5 {
            h.record(i);
        }
        let mut s = 5;
        let mut seen = Vec::new();
        while h.undo(swap_into(&mut s)) {
            seen.push(s);
        }
        assert_eq!(seen, vec![4, 3, 2]);

        let mut off = EditHistory::new(0);
        off.record(1);
        assert!(!off.can_undo());
    }
}
