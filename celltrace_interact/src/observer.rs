// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications from an [`EditSession`](crate::EditSession).

use celltrace_regions::{RegionId, RegionKey};

/// Receives notifications after the session changes state.
///
/// All methods default to doing nothing. `()` ignores everything and
/// `Vec<EditEvent>` records everything.
pub trait EditObserver {
    /// A region was created or changed by a committed edit.
    fn region_edited(&mut self, _frame: usize, _key: RegionKey) {}

    /// A region was removed by a committed edit.
    fn region_removed(&mut self, _frame: usize, _id: &RegionId) {}

    /// The region under the pointer changed.
    fn region_highlighted(&mut self, _previous: Option<RegionKey>, _current: Option<RegionKey>) {}

    /// A region was selected with a click in select mode.
    fn region_selected(&mut self, _frame: usize, _key: RegionKey) {}
}

impl EditObserver for () {}

/// A recorded notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditEvent {
    /// See [`EditObserver::region_edited`].
    Edited {
        /// Frame index.
        frame: usize,
        /// Edited region.
        key: RegionKey,
    },
    /// See [`EditObserver::region_removed`].
    Removed {
        /// Frame index.
        frame: usize,
        /// Id of the removed region.
        id: RegionId,
    },
    /// See [`EditObserver::region_highlighted`].
    Highlighted {
        /// Region highlighted before.
        previous: Option<RegionKey>,
        /// Region highlighted now.
        current: Option<RegionKey>,
    },
    /// See [`EditObserver::region_selected`].
    Selected {
        /// Frame index.
        frame: usize,
        /// Selected region.
        key: RegionKey,
    },
}

impl EditObserver for Vec<EditEvent> {
    fn region_edited(&mut self, frame: usize, key: RegionKey) {
        self.push(EditEvent::Edited { frame, key });
    }

    fn region_removed(&mut self, frame: usize, id: &RegionId) {
        self.push(EditEvent::Removed {
            frame,
            id: id.clone(),
        });
    }

    fn region_highlighted(&mut self, previous: Option<RegionKey>, current: Option<RegionKey>) {
        self.push(EditEvent::Highlighted { previous, current });
    }

    fn region_selected(&mut self, frame: usize, key: RegionKey) {
        self.push(EditEvent::Selected { frame, key });
    }
}
