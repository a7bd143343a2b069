// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending set: keys changed since the last drain.

use core::hash::Hash;

use hashbrown::HashSet;

/// Accumulated pending keys with generation tracking.
///
/// The generation increments on every mutation, so callers can cheaply
/// detect that something was marked since a previous observation.
///
/// # Example
///
/// ```
/// use trellis_dirty::PendingSet;
///
/// let mut pending = PendingSet::<u32>::new();
/// assert!(pending.mark(1));
/// assert!(!pending.mark(1));
/// assert!(pending.is_pending(1));
///
/// let drained: Vec<_> = pending.drain().collect();
/// assert_eq!(drained, vec![1]);
/// assert!(pending.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PendingSet<K>
where
    K: Copy + Eq + Hash,
{
    keys: HashSet<K>,
    generation: u64,
}

impl<K> Default for PendingSet<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> PendingSet<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new empty pending set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
            generation: 0,
        }
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks `key` as pending.
    ///
    /// Returns `true` if the key was newly inserted.
    pub fn mark(&mut self, key: K) -> bool {
        self.generation = self.generation.wrapping_add(1);
        self.keys.insert(key)
    }

    /// Returns `true` if `key` is pending.
    #[must_use]
    pub fn is_pending(&self, key: K) -> bool {
        self.keys.contains(&key)
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the number of pending keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Iterates pending keys without clearing them. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.keys.iter().copied()
    }

    /// Drains and returns every pending key.
    pub fn drain(&mut self) -> impl Iterator<Item = K> + '_ {
        self.generation = self.generation.wrapping_add(1);
        self.keys.drain()
    }

    /// Clears the set.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.keys.clear();
    }

    /// Removes a single key, returning `true` if it was pending.
    pub fn remove(&mut self, key: K) -> bool {
        let removed = self.keys.remove(&key);
        if removed {
            self.generation = self.generation.wrapping_add(1);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn mark_and_query() {
        let mut pending = PendingSet::<u32>::new();
        assert!(pending.is_empty());
        assert!(pending.mark(3));
        assert!(!pending.mark(3));
        assert!(pending.is_pending(3));
        assert!(!pending.is_pending(4));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn drain_clears() {
        let mut pending = PendingSet::<u32>::new();
        pending.mark(1);
        pending.mark(2);
        let mut drained: Vec<_> = pending.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained, [1, 2]);
        assert!(pending.is_empty());
    }

    #[test]
    fn remove_only_bumps_generation_on_change() {
        let mut pending = PendingSet::<u32>::new();
        pending.mark(1);
        let generation = pending.generation();
        assert!(!pending.remove(2));
        assert_eq!(pending.generation(), generation);
        assert!(pending.remove(1));
        assert_eq!(pending.generation(), generation + 1);
    }

    #[test]
    fn generation_increments() {
        let mut pending = PendingSet::<u32>::new();
        let initial = pending.generation();
        pending.mark(1);
        pending.mark(1);
        assert_eq!(pending.generation(), initial + 2);
        let _ = pending.drain().count();
        assert_eq!(pending.generation(), initial + 3);
        pending.clear();
        assert_eq!(pending.generation(), initial + 4);
    }
}
