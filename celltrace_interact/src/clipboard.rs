// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Copy/paste buffer for region outlines.

use celltrace_regions::EditError;
use kurbo::Point;

/// Holds the outline most recently copied with [`EditMode::RegionCopy`](crate::EditMode::RegionCopy).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clipboard {
    ring: Vec<Point>,
}

impl Clipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `ring`.
    pub fn copy(&mut self, ring: Vec<Point>) {
        self.ring = ring;
    }

    /// The copied outline.
    pub fn contents(&self) -> Result<&[Point], EditError> {
        if self.ring.is_empty() {
            Err(EditError::EmptyClipboard)
        } else {
            Ok(&self.ring)
        }
    }

    /// Whether nothing has been copied.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Forget the copied outline.
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clipboard_is_an_error() {
        let mut c = Clipboard::new();
        assert_eq!(c.contents(), Err(EditError::EmptyClipboard));
        c.copy(vec![Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)]);
        assert_eq!(c.contents().unwrap().len(), 3);
        c.clear();
        assert!(c.is_empty());
    }
}
