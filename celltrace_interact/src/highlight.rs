// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Highlight tracking.
//!
//! ## Usage
//!
//! Hit test on each pointer move and feed the result to
//! [`HighlightState::update`]. A change is reported only when the highlighted
//! region differs from the previous one:
//!
//! ```
//! use celltrace_interact::{HighlightChange, HighlightState};
//!
//! let mut h: HighlightState<u32> = HighlightState::new();
//! assert_eq!(
//!     h.update(Some(7)),
//!     Some(HighlightChange { previous: None, current: Some(7) })
//! );
//! assert_eq!(h.update(Some(7)), None);
//! ```

/// Tracks the highlighted item and reports transitions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightState<K: Copy + Eq> {
    current: Option<K>,
}

/// A highlight transition returned by [`HighlightState::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HighlightChange<K> {
    /// Item highlighted before the update.
    pub previous: Option<K>,
    /// Item highlighted after the update.
    pub current: Option<K>,
}

impl<K: Copy + Eq> HighlightState<K> {
    /// Create a state with nothing highlighted.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The highlighted item, if any.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Clear the highlight, returning the transition if something was highlighted.
    pub fn clear(&mut self) -> Option<HighlightChange<K>> {
        self.update(None)
    }

    /// Highlight `next` and return the transition, or `None` when it is unchanged.
    pub fn update(&mut self, next: Option<K>) -> Option<HighlightChange<K>> {
        if self.current == next {
            return None;
        }
        let previous = core::mem::replace(&mut self.current, next);
        Some(HighlightChange {
            previous,
            current: next,
        })
    }
}
