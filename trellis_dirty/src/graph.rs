// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency graph over dense keys.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::key::DenseKey;

/// Most keys have only a handful of dependencies or dependents.
type Edges<K> = SmallVec<[K; 4]>;

/// Error returned when a dependency would close a cycle.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct CycleError<K> {
    /// The key that would depend on another.
    pub from: K,
    /// The key that would be depended upon.
    pub to: K,
}

impl<K> CycleError<K> {
    /// Converts the keys of this error with `f`.
    ///
    /// Higher layers use this to report cycles in terms of their own keys.
    pub fn map<U>(self, mut f: impl FnMut(K) -> U) -> CycleError<U> {
        CycleError {
            from: f(self.from),
            to: f(self.to),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for CycleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CycleError {{ from: {:?}, to: {:?} }}", self.from, self.to)
    }
}

impl<K: fmt::Debug> fmt::Display for CycleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dependency {:?} -> {:?} would create a cycle",
            self.from, self.to
        )
    }
}

impl<K: fmt::Debug> core::error::Error for CycleError<K> {}

/// How to handle cycle detection when adding dependencies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CycleHandling {
    /// Return an error if a cycle would be created.
    #[default]
    Error,
    /// Panic in debug builds, silently drop the edge in release builds.
    DebugAssert,
    /// Silently drop the edge if it would create a cycle.
    Ignore,
    /// Skip cycle detection entirely.
    ///
    /// Only use this when the caller already guarantees acyclicity, for
    /// example when restoring a previously valid edge set.
    Allow,
}

/// Dependency graph: "A depends on B" edges.
///
/// `DepGraph` stores edges in both directions, so "what does A depend on?"
/// and "what depends on A?" are both slice lookups.
///
/// # Example
///
/// ```
/// use trellis_dirty::{CycleHandling, DepGraph};
///
/// let mut graph = DepGraph::<u32>::new();
/// graph.add_dependency(2, 1, CycleHandling::Error).unwrap();
/// graph.add_dependency(3, 2, CycleHandling::Error).unwrap();
///
/// assert_eq!(graph.dependencies(2), &[1]);
/// assert_eq!(graph.dependents(1), &[2]);
///
/// let transitive: Vec<_> = graph.transitive_dependents(1).collect();
/// assert!(transitive.contains(&2));
/// assert!(transitive.contains(&3));
///
/// // 1 -> 3 would close 1 -> 3 -> 2 -> 1.
/// assert!(graph.add_dependency(1, 3, CycleHandling::Error).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DepGraph<K: DenseKey> {
    /// `forward[key.index()]`: keys that `key` depends on.
    forward: Vec<Edges<K>>,
    /// `reverse[key.index()]`: keys that depend on `key`.
    reverse: Vec<Edges<K>>,
    edge_count: usize,
}

impl<K: DenseKey> Default for DepGraph<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn slot<K: DenseKey>(table: &mut Vec<Edges<K>>, idx: usize) -> &mut Edges<K> {
    if idx >= table.len() {
        table.resize_with(idx + 1, Edges::new);
    }
    &mut table[idx]
}

#[inline]
fn edges_of<K: DenseKey>(table: &[Edges<K>], key: K) -> &[K] {
    table.get(key.index()).map(|e| e.as_slice()).unwrap_or(&[])
}

impl<K: DenseKey> DepGraph<K> {
    /// Creates a new empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            forward: Vec::new(),
            reverse: Vec::new(),
            edge_count: 0,
        }
    }

    /// Returns `true` if the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Adds a dependency: `from` depends on `to`.
    ///
    /// When `to` changes, `from` must be recomputed.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the dependency was newly added.
    /// - `Ok(false)` if it already existed, or was dropped by `handling`.
    /// - `Err(CycleError)` if a cycle would be created and `handling` is
    ///   [`CycleHandling::Error`].
    pub fn add_dependency(
        &mut self,
        from: K,
        to: K,
        handling: CycleHandling,
    ) -> Result<bool, CycleError<K>> {
        if handling != CycleHandling::Allow && self.would_create_cycle(from, to) {
            return match handling {
                CycleHandling::Error => Err(CycleError { from, to }),
                CycleHandling::DebugAssert => {
                    debug_assert!(false, "adding dependency would create a cycle");
                    Ok(false)
                }
                CycleHandling::Ignore | CycleHandling::Allow => Ok(false),
            };
        }

        let fwd = slot(&mut self.forward, from.index());
        if fwd.contains(&to) {
            return Ok(false);
        }
        fwd.push(to);
        slot(&mut self.reverse, to.index()).push(from);
        self.edge_count += 1;
        Ok(true)
    }

    /// Returns `true` if adding `from -> to` would create a cycle.
    ///
    /// A self-dependency is a trivial cycle. Otherwise this is a DFS from `to`
    /// along dependency edges looking for `from`.
    #[must_use]
    pub fn would_create_cycle(&self, from: K, to: K) -> bool {
        if from == to {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack: Vec<K> = Vec::new();
        stack.push(to);
        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            if visited.insert(current) {
                stack.extend_from_slice(edges_of(&self.forward, current));
            }
        }
        false
    }

    /// Removes a dependency: `from` no longer depends on `to`.
    ///
    /// Returns `true` if the dependency existed.
    pub fn remove_dependency(&mut self, from: K, to: K) -> bool {
        let Some(fwd) = self.forward.get_mut(from.index()) else {
            return false;
        };
        let Some(pos) = fwd.iter().position(|&k| k == to) else {
            return false;
        };
        fwd.swap_remove(pos);

        if let Some(rev) = self.reverse.get_mut(to.index())
            && let Some(pos) = rev.iter().position(|&k| k == from)
        {
            rev.swap_remove(pos);
        }
        self.edge_count -= 1;
        true
    }

    /// Replaces all direct dependencies of `from` with `to`.
    ///
    /// Stale edges are removed before new ones are added, so cycle checks see
    /// the post-update graph. Duplicate keys in `to` are ignored.
    ///
    /// This is atomic: if any new edge is rejected with a [`CycleError`], the
    /// previous dependency set is restored before the error is returned.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the dependency set changed.
    /// - `Ok(false)` if it was already equal to `to`.
    pub fn replace_dependencies(
        &mut self,
        from: K,
        to: impl IntoIterator<Item = K>,
        handling: CycleHandling,
    ) -> Result<bool, CycleError<K>> {
        let mut new_set: Edges<K> = Edges::new();
        for k in to {
            if !new_set.contains(&k) {
                new_set.push(k);
            }
        }

        let old: Edges<K> = edges_of(&self.forward, from).iter().copied().collect();
        if old.len() == new_set.len() && old.iter().all(|dep| new_set.contains(dep)) {
            return Ok(false);
        }

        let mut removed: Edges<K> = Edges::new();
        for &dep in &old {
            if !new_set.contains(&dep) && self.remove_dependency(from, dep) {
                removed.push(dep);
            }
        }

        let mut added: Edges<K> = Edges::new();
        for &dep in &new_set {
            if old.contains(&dep) {
                continue;
            }
            match self.add_dependency(from, dep, handling) {
                Ok(true) => added.push(dep),
                Ok(false) => {}
                Err(e) => {
                    for d in added {
                        self.remove_dependency(from, d);
                    }
                    for d in removed {
                        let _ = self.add_dependency(from, d, CycleHandling::Allow);
                    }
                    return Err(e);
                }
            }
        }

        Ok(true)
    }

    /// Removes every edge involving `key`, in both directions.
    pub fn remove_key(&mut self, key: K) {
        let idx = key.index();
        if let Some(deps) = self.forward.get_mut(idx).map(core::mem::take) {
            for dep in deps {
                if let Some(rev) = self.reverse.get_mut(dep.index())
                    && let Some(pos) = rev.iter().position(|&k| k == key)
                {
                    rev.swap_remove(pos);
                }
                self.edge_count -= 1;
            }
        }
        if let Some(dependents) = self.reverse.get_mut(idx).map(core::mem::take) {
            for dependent in dependents {
                if let Some(fwd) = self.forward.get_mut(dependent.index())
                    && let Some(pos) = fwd.iter().position(|&k| k == key)
                {
                    fwd.swap_remove(pos);
                }
                self.edge_count -= 1;
            }
        }
    }

    /// Returns the direct dependencies of `key`: the keys whose changes
    /// require `key` to be recomputed.
    ///
    /// Order is unspecified.
    #[inline]
    #[must_use]
    pub fn dependencies(&self, key: K) -> &[K] {
        edges_of(&self.forward, key)
    }

    /// Returns the direct dependents of `key`: the keys that must be
    /// recomputed when `key` changes.
    ///
    /// Order is unspecified.
    #[inline]
    #[must_use]
    pub fn dependents(&self, key: K) -> &[K] {
        edges_of(&self.reverse, key)
    }

    /// Returns an iterator over every key that directly or indirectly depends
    /// on `key`. Each key is yielded once; order is unspecified.
    pub fn transitive_dependents(&self, key: K) -> impl Iterator<Item = K> + '_ {
        TransitiveDependents {
            graph: self,
            visited: HashSet::new(),
            stack: self.dependents(key).to_vec(),
        }
    }

    /// Returns `true` if `key` depends on anything.
    #[must_use]
    pub fn has_dependencies(&self, key: K) -> bool {
        !self.dependencies(key).is_empty()
    }

    /// Returns `true` if anything depends on `key`.
    #[must_use]
    pub fn has_dependents(&self, key: K) -> bool {
        !self.dependents(key).is_empty()
    }

    /// Returns the number of keys that `key` depends on.
    #[must_use]
    pub fn in_degree(&self, key: K) -> usize {
        self.dependencies(key).len()
    }

    /// Returns the number of keys that depend on `key`.
    #[must_use]
    pub fn out_degree(&self, key: K) -> usize {
        self.dependents(key).len()
    }
}

/// DFS over reverse edges.
struct TransitiveDependents<'a, K: DenseKey> {
    graph: &'a DepGraph<K>,
    visited: HashSet<K>,
    stack: Vec<K>,
}

impl<K: DenseKey> Iterator for TransitiveDependents<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.stack.pop() {
            if self.visited.insert(key) {
                self.stack.extend_from_slice(self.graph.dependents(key));
                return Some(key);
            }
        }
        None
    }
}
