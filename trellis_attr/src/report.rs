// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flush results.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::id::AttrKey;

/// What a [`flush`](crate::AttrGraph::flush) did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    changed: Vec<AttrKey>,
    /// Same keys as `changed`, for lookups.
    seen: HashSet<AttrKey>,
    recomputed: usize,
}

impl FlushReport {
    pub(crate) fn push_changed(&mut self, key: AttrKey) {
        if self.seen.insert(key) {
            self.changed.push(key);
        }
    }

    pub(crate) fn count_recompute(&mut self) {
        self.recomputed += 1;
    }

    /// Attributes whose value changed, in processing order.
    ///
    /// This holds the written sources plus every computed attribute whose new
    /// value differed from the old one, in the topological order the flush
    /// visited them.
    #[must_use]
    pub fn changed(&self) -> &[AttrKey] {
        &self.changed
    }

    /// Returns `true` if `key` changed during the flush.
    #[must_use]
    pub fn contains(&self, key: AttrKey) -> bool {
        self.seen.contains(&key)
    }

    /// How many rules ran.
    #[must_use]
    pub fn recomputed(&self) -> usize {
        self.recomputed
    }

    /// Returns `true` if nothing changed and no rule ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.recomputed == 0
    }
}
