// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Allocation of fresh region ids.
//!
//! Ids follow `<prefix><n>` (for example `object17`). A fresh id is the prefix
//! followed by one more than the largest `n` in use. Ids that do not follow the
//! pattern are logged and skipped; they can never collide with a generated id.

use tracing::warn;

use crate::types::RegionId;

/// Allocate the next id after every conforming id in `existing`.
///
/// Starts at `<prefix>1` when no id conforms.
pub fn next_region_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a RegionId>) -> RegionId {
    let mut max = 0_u64;
    for id in existing {
        match numeric_suffix(prefix, id.as_str()) {
            Some(n) => max = max.max(n),
            None => warn!(%id, prefix, "region id does not follow the numbered pattern"),
        }
    }
    RegionId::new(format!("{prefix}{}", max.saturating_add(1)))
}

fn numeric_suffix(prefix: &str, id: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<RegionId> {
        raw.iter().map(|s| RegionId::new(*s)).collect()
    }

    #[test]
    fn allocates_after_max() {
        let existing = ids(&["object3", "object12", "object7"]);
        assert_eq!(next_region_id("object", &existing).as_str(), "object13");
    }

    #[test]
    fn empty_frame_starts_at_one() {
        assert_eq!(next_region_id("object", &[]).as_str(), "object1");
    }

    #[test]
    fn non_conforming_ids_are_skipped() {
        let existing = ids(&["cell_4", "object", "object-2", "object5", "object+9"]);
        assert_eq!(next_region_id("object", &existing).as_str(), "object6");
        assert_eq!(numeric_suffix("object", "object007"), Some(7));
        assert_eq!(numeric_suffix("object", "object99999999999999999999999"), None);
    }
}
