// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topologically sorted drain iterator.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Reverse;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::graph::DepGraph;
use crate::key::DenseKey;
use crate::pending::PendingSet;

/// Indicates whether a drain finished normally or stalled due to a cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrainCompletion {
    /// All keys were yielded.
    Complete,
    /// Some keys kept a non-zero in-degree (cycle).
    Stalled {
        /// Number of keys that could not be yielded.
        remaining: usize,
    },
}

/// Iterator that yields a key subset in topological order.
///
/// Uses Kahn's algorithm restricted to the subset: a key is yielded only
/// after every one of its dependencies that is also in the subset. When
/// several keys are ready at once, the smallest (by `Ord`) comes first, so
/// the order is fully deterministic.
///
/// Input keys are deduplicated; each key is yielded at most once.
///
/// # Cycles
///
/// If the induced subgraph has a cycle, the keys on it never become ready.
/// Exhaust the iterator and check [`is_stalled`](Self::is_stalled), or use
/// [`collect_with_completion`](Self::collect_with_completion).
///
/// # Example
///
/// ```
/// use trellis_dirty::{CycleHandling, DepGraph, DrainSorted};
///
/// let mut graph = DepGraph::<u32>::new();
/// // 1 <- 2, 1 <- 3, {2, 3} <- 4
/// graph.add_dependency(2, 1, CycleHandling::Error).unwrap();
/// graph.add_dependency(3, 1, CycleHandling::Error).unwrap();
/// graph.add_dependency(4, 2, CycleHandling::Error).unwrap();
/// graph.add_dependency(4, 3, CycleHandling::Error).unwrap();
///
/// let order: Vec<_> = DrainSorted::new([4, 3, 2, 1], &graph).collect();
/// assert_eq!(order, vec![1, 2, 3, 4]);
/// ```
#[derive(Debug)]
pub struct DrainSorted<'a, K>
where
    K: DenseKey + Ord,
{
    graph: &'a DepGraph<K>,
    /// Zero in-degree keys, min-first.
    ready: BinaryHeap<Reverse<K>>,
    /// Remaining in-degree of each unyielded key within the subset.
    in_degree: HashMap<K, usize>,
    stalled: bool,
}

impl<'a, K> DrainSorted<'a, K>
where
    K: DenseKey + Ord,
{
    /// Creates a drain over `keys` ordered by `graph`.
    pub fn new(keys: impl IntoIterator<Item = K>, graph: &'a DepGraph<K>) -> Self {
        let keys = keys.into_iter();
        let mut in_degree: HashMap<K, usize> = HashMap::with_capacity(keys.size_hint().0);
        let mut unique = Vec::with_capacity(keys.size_hint().0);
        for key in keys {
            if let Entry::Vacant(e) = in_degree.entry(key) {
                e.insert(0);
                unique.push(key);
            }
        }

        for &key in &unique {
            let within = graph
                .dependencies(key)
                .iter()
                .filter(|dep| in_degree.contains_key(*dep))
                .count();
            if let Some(deg) = in_degree.get_mut(&key) {
                *deg = within;
            }
        }

        let ready = unique
            .into_iter()
            .filter(|k| in_degree.get(k) == Some(&0))
            .map(Reverse)
            .collect();

        Self {
            graph,
            ready,
            in_degree,
            stalled: false,
        }
    }

    /// Returns the number of keys not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.in_degree.len()
    }

    /// Iterates the keys not yet yielded. After a stall these are exactly the
    /// keys on, or downstream of, a cycle.
    pub fn remaining_keys(&self) -> impl Iterator<Item = K> + '_ {
        self.in_degree.keys().copied()
    }

    /// Returns `true` once the iterator ran dry with keys still remaining.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Returns whether the drain completed or stalled.
    ///
    /// Only meaningful after the iterator has been exhausted.
    #[must_use]
    pub fn completion(&self) -> DrainCompletion {
        if self.stalled {
            DrainCompletion::Stalled {
                remaining: self.remaining(),
            }
        } else {
            DrainCompletion::Complete
        }
    }

    /// Collects all yielded keys and returns the completion status.
    #[must_use]
    pub fn collect_with_completion(mut self) -> (Vec<K>, DrainCompletion) {
        let mut out = Vec::with_capacity(self.in_degree.len());
        out.extend(&mut self);
        let completion = self.completion();
        (out, completion)
    }
}

impl<K> Iterator for DrainSorted<'_, K>
where
    K: DenseKey + Ord,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(Reverse(key)) = self.ready.pop() else {
            if !self.in_degree.is_empty() {
                self.stalled = true;
            }
            return None;
        };

        self.in_degree.remove(&key);
        for dependent in self.graph.dependents(key) {
            if let Some(deg) = self.in_degree.get_mut(dependent) {
                *deg -= 1;
                if *deg == 0 {
                    self.ready.push(Reverse(*dependent));
                }
            }
        }

        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.ready.len().min(self.in_degree.len()), Some(self.in_degree.len()))
    }
}

/// Drains exactly the pending keys in topological order.
///
/// The pending set is cleared.
pub fn drain_sorted<'a, K>(pending: &mut PendingSet<K>, graph: &'a DepGraph<K>) -> DrainSorted<'a, K>
where
    K: DenseKey + Ord,
{
    let keys: Vec<K> = pending.drain().collect();
    DrainSorted::new(keys, graph)
}

/// Drains the pending keys plus all of their transitive dependents in
/// topological order.
///
/// This is the "lazy at mark time, eager at drain time" workflow: marking
/// only records roots, and the affected set is expanded once here.
///
/// # Example
///
/// ```
/// use trellis_dirty::{CycleHandling, DepGraph, PendingSet, drain_affected_sorted};
///
/// let mut graph = DepGraph::<u32>::new();
/// graph.add_dependency(2, 1, CycleHandling::Error).unwrap();
/// graph.add_dependency(3, 2, CycleHandling::Error).unwrap();
///
/// let mut pending = PendingSet::new();
/// pending.mark(2);
///
/// let order: Vec<_> = drain_affected_sorted(&mut pending, &graph).collect();
/// assert_eq!(order, vec![2, 3]);
/// ```
pub fn drain_affected_sorted<'a, K>(
    pending: &mut PendingSet<K>,
    graph: &'a DepGraph<K>,
) -> DrainSorted<'a, K>
where
    K: DenseKey + Ord,
{
    let mut affected: Vec<K> = pending.drain().collect();
    let roots = affected.len();
    for i in 0..roots {
        let root = affected[i];
        affected.extend(graph.transitive_dependents(root));
    }
    DrainSorted::new(affected, graph)
}
