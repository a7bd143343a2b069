// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense key trait used to index adjacency tables.

use core::hash::Hash;

/// A key that maps to a small, dense `usize` index.
///
/// [`DepGraph`](crate::DepGraph) stores adjacency lists in vectors indexed by
/// [`index`](Self::index), so keys should be allocated densely from zero.
/// Sparse keys work but waste memory proportional to the largest index.
pub trait DenseKey: Copy + Eq + Hash {
    /// Returns the dense index of this key.
    fn index(self) -> usize;
}

impl DenseKey for u16 {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl DenseKey for u32 {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl DenseKey for usize {
    #[inline]
    fn index(self) -> usize {
        self
    }
}
