// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Published endpoints and keeping their objects in sync.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use trellis_attr::{AttrGraph, AttrKey, ErasedValue, FlushReport, ObjectId};

/// Objects published under one endpoint name.
pub(crate) struct Endpoint {
    /// In publish order. Earlier objects win when several changed at once.
    pub(crate) objects: Vec<ObjectId>,
    /// Sorted and deduplicated.
    pub(crate) attributes: Vec<String>,
}

impl Endpoint {
    /// Queues copies of every changed published attribute onto the other
    /// objects of this endpoint.
    ///
    /// Keys in `written` were themselves set by a previous copy and are never
    /// copied back.
    pub(crate) fn plan_copies(
        &self,
        graph: &AttrGraph,
        flushed: &FlushReport,
        written: &HashSet<AttrKey>,
        copies: &mut Vec<(AttrKey, ErasedValue)>,
    ) {
        for attribute in &self.attributes {
            let source = self
                .objects
                .iter()
                .filter_map(|&object| graph.lookup(object, attribute))
                .find(|key| flushed.contains(*key) && !written.contains(key));
            let Some(source) = source else {
                continue;
            };
            let Some(value) = graph.get_erased(source) else {
                continue;
            };
            for &object in &self.objects {
                if object == source.object() {
                    continue;
                }
                let Some(target) = graph.lookup(object, attribute) else {
                    continue;
                };
                if graph.is_computed(target) {
                    tracing::trace!(target = ?target, "skipping computed endpoint attribute");
                    continue;
                }
                copies.push((target, value.clone()));
            }
        }
    }
}

/// What [`Context::flush`](crate::Context::flush) did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    changed: Vec<AttrKey>,
    /// Same keys as `changed`, for lookups.
    seen: HashSet<AttrKey>,
    recomputed: usize,
    copied: usize,
    rounds: usize,
}

impl SyncReport {
    pub(crate) fn absorb(&mut self, flushed: &FlushReport) {
        for &key in flushed.changed() {
            if self.seen.insert(key) {
                self.changed.push(key);
            }
        }
        self.recomputed += flushed.recomputed();
    }

    pub(crate) fn count_copy(&mut self) {
        self.copied += 1;
    }

    pub(crate) fn next_round(&mut self) -> usize {
        self.rounds += 1;
        self.rounds
    }

    /// Every attribute that changed, across all rounds, first change first.
    #[must_use]
    pub fn changed(&self) -> &[AttrKey] {
        &self.changed
    }

    /// Returns `true` if `key` changed.
    #[must_use]
    pub fn contains(&self, key: AttrKey) -> bool {
        self.seen.contains(&key)
    }

    /// How many rules ran, across all rounds.
    #[must_use]
    pub fn recomputed(&self) -> usize {
        self.recomputed
    }

    /// How many endpoint attributes were overwritten from a sibling.
    #[must_use]
    pub fn copied(&self) -> usize {
        self.copied
    }

    /// How many rounds of copying ran after the initial flush.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_merges_changes_across_rounds() {
        let mut graph = AttrGraph::new();
        let obj = graph.create_object("obj");
        let a = graph.add_attribute(obj, "a", 0_u8).unwrap();
        let b = graph.add_attribute(obj, "b", 0_u8).unwrap();

        let mut report = SyncReport::default();
        graph.set(a, 1).unwrap();
        report.absorb(&graph.flush().unwrap());
        graph.set(b, 1).unwrap();
        graph.set(a, 2).unwrap();
        report.absorb(&graph.flush().unwrap());

        assert_eq!(report.changed(), &[a.key(), b.key()]);
        assert!(report.contains(b.key()));
        assert_eq!(report.recomputed(), 0);
    }
}
