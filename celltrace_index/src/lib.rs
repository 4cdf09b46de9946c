// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Celltrace Index: a 2D AABB index over region bounding boxes.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) with small `Copy` payloads.
//! - Query by point, by intersecting rectangle, or by nearest box with an acceptance predicate.
//! - Batch updates with [`IndexGeneric::commit`] and receive coarse damage (added/removed/moved boxes).
//!
//! The index knows nothing about polygons. It only stores boxes, so every result is a
//! superset that callers refine with exact geometry (for example a point-in-polygon test
//! passed as the nearest-query predicate).
//!
//! # Example
//!
//! ```rust
//! use celltrace_index::{Aabb2D, Index};
//!
//! let mut idx: Index<u32> = Index::new();
//! let k1 = idx.insert(Aabb2D::new(0.0, 0.0, 0.2, 0.2), 1);
//! let _k2 = idx.insert(Aabb2D::new(0.5, 0.5, 0.7, 0.7), 2);
//! let _ = idx.commit();
//!
//! // Move the first box and commit a damage set.
//! idx.update(k1, Aabb2D::new(0.1, 0.0, 0.3, 0.2));
//! let damage = idx.commit();
//! assert!(!damage.is_empty());
//!
//! // Nearest box to a point, accepting every payload.
//! let hits = idx.query_nearest(0.55, 0.55, 1, |_| true);
//! assert_eq!(hits[0].1, 2);
//! ```
//!
//! Frames with many regions should bulk-load an R-tree:
//!
//! ```rust
//! use celltrace_index::{Aabb2D, Index};
//!
//! let boxes: Vec<_> = (0..100_u32)
//!     .map(|i| {
//!         let x = f64::from(i % 10) / 10.0;
//!         let y = f64::from(i / 10) / 10.0;
//!         (Aabb2D::from_xywh(x, y, 0.05, 0.05), i)
//!     })
//!     .collect();
//! let idx = Index::with_rtree_bulk(&boxes);
//! let hits: Vec<_> = idx.query_rect(Aabb2D::new(0.0, 0.0, 0.15, 0.05)).collect();
//! assert_eq!(hits.len(), 2);
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` (default): linear scans. Fine for sparse frames.
//! - `RTree`: STR bulk load plus incremental insert/update/remove; nearest queries are
//!   best-first and stop as soon as enough candidates are accepted.
//!
//! ### Float semantics
//!
//! Coordinates are assumed finite. NaN distances compare as equal and may reorder results.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod damage;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::rtree::RTree;
pub use damage::Damage;
pub use index::{Index, IndexGeneric, Key, RTreeIndex};
pub use types::Aabb2D;
