// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interning helper for owned keys.
//!
//! Graph types in this crate are keyed by small `Copy` keys. Embedders that
//! naturally identify things by owned values (attribute names, compound ids)
//! intern them once into an [`InternId`] and use that from then on.
//!
//! ## Example
//!
//! ```rust
//! use trellis_dirty::intern::Interner;
//!
//! let mut names = Interner::<String>::new();
//! let primary = names.intern("primary".to_owned());
//! assert_eq!(names.intern("primary".to_owned()), primary);
//!
//! // Borrowed lookups never insert.
//! assert_eq!(names.lookup("primary"), Some(primary));
//! assert_eq!(names.lookup("secondary"), None);
//! assert_eq!(names.get(primary).map(String::as_str), Some("primary"));
//! ```

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

use hashbrown::DefaultHashBuilder;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::key::DenseKey;

/// A compact, interned identifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct InternId(u32);

impl InternId {
    /// Returns this id as a `usize` index.
    #[inline]
    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw numeric id.
    #[inline]
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl DenseKey for InternId {
    #[inline]
    fn index(self) -> usize {
        self.as_usize()
    }
}

/// Interns owned keys into compact [`InternId`] handles.
///
/// Each key is stored once. Lookups hash into buckets of candidate ids, so
/// no second copy of the key is kept in an index.
#[derive(Debug, Clone)]
pub struct Interner<K> {
    keys: Vec<K>,
    buckets: HashMap<u64, SmallVec<[InternId; 1]>>,
    build_hasher: DefaultHashBuilder,
}

impl<K> Default for Interner<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Interner<K>
where
    K: Eq + Hash,
{
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            buckets: HashMap::new(),
            build_hasher: DefaultHashBuilder::default(),
        }
    }

    /// Returns the number of interned keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the key for an interned id.
    #[must_use]
    pub fn get(&self, id: InternId) -> Option<&K> {
        self.keys.get(id.as_usize())
    }

    /// Returns the id of an already interned key without inserting it.
    #[must_use]
    pub fn lookup<Q>(&self, key: &Q) -> Option<InternId>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let hash = self.build_hasher.hash_one(key);
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|id| Borrow::<Q>::borrow(&self.keys[id.as_usize()]) == key)
    }

    /// Interns `key` and returns its [`InternId`].
    ///
    /// If an equal key was already interned, the existing id is returned and
    /// `key` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` keys are interned.
    pub fn intern(&mut self, key: K) -> InternId {
        if let Some(id) = self.lookup::<K>(&key) {
            return id;
        }
        let hash = self.build_hasher.hash_one(&key);
        let id = InternId(u32::try_from(self.keys.len()).expect("too many interned keys"));
        self.keys.push(key);
        self.buckets.entry(hash).or_default().push(id);
        id
    }

    /// Iterates `(id, key)` pairs in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (InternId, &K)> + '_ {
        self.keys.iter().enumerate().map(|(i, k)| {
            #[expect(clippy::cast_possible_truncation, reason = "bounded by intern()")]
            let id = InternId(i as u32);
            (id, k)
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::string::{String, ToString};

    #[test]
    fn interns_duplicates_to_same_id() {
        let mut names = Interner::<String>::new();
        let a0 = names.intern("a".to_string());
        let a1 = names.intern("a".to_string());
        let b = names.intern("b".to_string());

        assert_eq!(a0, a1);
        assert_ne!(a0, b);
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(b).map(String::as_str), Some("b"));
    }

    #[test]
    fn lookup_by_borrowed_key() {
        let mut names = Interner::<String>::new();
        let id = names.intern("gray_700".to_string());
        assert_eq!(names.lookup("gray_700"), Some(id));
        assert_eq!(names.lookup("gray_800"), None);
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn iter_in_interning_order() {
        let mut names = Interner::<String>::new();
        names.intern("x".to_string());
        names.intern("y".to_string());
        let keys: std::vec::Vec<_> = names.iter().map(|(_, k)| k.as_str()).collect();
        assert_eq!(keys, ["x", "y"]);
    }
}
