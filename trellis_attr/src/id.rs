// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identification types for objects and attributes.
//!
//! [`ObjectId`] and [`Name`] are dense handles minted by an
//! [`AttrGraph`](crate::AttrGraph). [`Attr<T>`] is the typed handle returned
//! when an attribute is added or declared; its phantom `T` makes
//! [`AttrGraph::get`](crate::AttrGraph::get) and
//! [`AttrGraph::set`](crate::AttrGraph::set) type checked at compile time.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use trellis_dirty::{DenseKey, InternId};

/// Handle to an object inside an [`AttrGraph`](crate::AttrGraph).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the dense index of this object.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.0).finish()
    }
}

/// An interned attribute name.
///
/// Names are interned per graph, so comparing two names is an integer
/// comparison. Use [`AttrGraph::name_str`](crate::AttrGraph::name_str) to
/// get the text back.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(InternId);

impl Name {
    #[inline]
    pub(crate) const fn new(id: InternId) -> Self {
        Self(id)
    }

    #[inline]
    pub(crate) const fn intern_id(self) -> InternId {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Name").field(&self.0.as_u32()).finish()
    }
}

/// A fully qualified attribute: an object and one of its attribute names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttrKey {
    object: ObjectId,
    name: Name,
}

impl AttrKey {
    #[inline]
    pub(crate) const fn new(object: ObjectId, name: Name) -> Self {
        Self { object, name }
    }

    /// The owning object.
    #[must_use]
    #[inline]
    pub const fn object(self) -> ObjectId {
        self.object
    }

    /// The attribute name within the owner.
    #[must_use]
    #[inline]
    pub const fn name(self) -> Name {
        self.name
    }
}

/// Dense node index in the dependency graph, allocated in declaration order.
///
/// The drain breaks ties by the smallest node, so among independent
/// attributes the one declared first is recomputed first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }
}

impl DenseKey for NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A typed handle to one attribute of one object.
///
/// `Attr<T>` is `Copy` regardless of `T` and only valid for the graph that
/// returned it.
///
/// ```rust
/// use trellis_attr::{Attr, AttrGraph};
///
/// let mut graph = AttrGraph::new();
/// let obj = graph.create_object("widget");
/// let width: Attr<f64> = graph.add_attribute(obj, "width", 10.0).unwrap();
///
/// // graph.set(width, "wide"); // Would not compile!
/// graph.set(width, 12.0).unwrap();
/// assert_eq!(*graph.get(width), 12.0);
/// ```
pub struct Attr<T> {
    key: AttrKey,
    node: NodeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Attr<T> {
    #[inline]
    pub(crate) const fn new(key: AttrKey, node: NodeId) -> Self {
        Self {
            key,
            node,
            _marker: PhantomData,
        }
    }

    /// The untyped key of this attribute.
    #[must_use]
    #[inline]
    pub const fn key(self) -> AttrKey {
        self.key
    }

    /// The owning object.
    #[must_use]
    #[inline]
    pub const fn object(self) -> ObjectId {
        self.key.object
    }

    #[inline]
    pub(crate) const fn node(self) -> NodeId {
        self.node
    }
}

// Manual impls so `T` needs no bounds.

impl<T> Copy for Attr<T> {}

impl<T> Clone for Attr<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Attr<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.node == other.node
    }
}

impl<T> Eq for Attr<T> {}

impl<T> Hash for Attr<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.node.hash(state);
    }
}

impl<T> fmt::Debug for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attr")
            .field("key", &self.key)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}
