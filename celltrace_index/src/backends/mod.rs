// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `rtree`: R-tree with STR bulk loading and SAH-like overflow splits.
//!
//! SAH note
//! --------
//! For a split point `k` along a sorted axis the R-tree minimizes
//!
//! `cost(k) = area(LB_k) * k + area(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` bound the first `k` and remaining `n - k` children.
//! Prefix/suffix boxes make every `k` cost O(1) to evaluate.
//!
//! Nearest search is best-first: a binary heap ordered by squared box distance
//! pops nodes and items, so the first `k` items popped are the `k` nearest.

pub mod flatvec;
pub mod rtree;
