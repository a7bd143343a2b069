// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased attribute values.
//!
//! Attributes of one object hold values of different types, so the graph
//! stores them as [`ErasedValue`]. Unlike a plain `Box<dyn Any>`, an erased
//! value keeps enough of its type to clone itself, compare itself for
//! equality, and print itself.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// Bound for anything stored in an attribute.
///
/// Equality drives change detection, so every attribute value must be
/// `PartialEq`. `Send + Sync` lets a whole graph move behind a lock.
pub trait AttrValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> AttrValue for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// A type-erased attribute value.
///
/// # Example
///
/// ```rust
/// use trellis_attr::ErasedValue;
///
/// let a = ErasedValue::new(42_i32);
/// assert!(a.is::<i32>());
/// assert_eq!(a.downcast_ref::<i32>(), Some(&42));
///
/// // Value equality, not identity.
/// assert_eq!(a, ErasedValue::new(42_i32));
/// assert_ne!(a, ErasedValue::new(43_i32));
/// assert_ne!(a, ErasedValue::new(42_i64));
/// ```
pub struct ErasedValue {
    inner: Box<dyn DynValue>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ErasedValue {
    /// Wraps a concrete value.
    #[must_use]
    pub fn new<T: AttrValue>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the contained value, for diagnostics.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the contained value is a `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Downcasts to `&T`, or `None` if the value is not a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }

    /// Returns `true` if `other` is a `T` equal to the contained value.
    #[must_use]
    pub fn eq_value<T: AttrValue>(&self, other: &T) -> bool {
        self.downcast_ref::<T>() == Some(other)
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
            type_name: self.type_name,
        }
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.eq_dyn(other.inner.as_any())
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_debug(f)
    }
}

trait DynValue: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn DynValue>;
    fn eq_dyn(&self, other: &dyn Any) -> bool;
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: AttrValue> DynValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn DynValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>() == Some(self)
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn downcast_matches_type() {
        let value = ErasedValue::new(String::from("#9c27b0"));
        assert!(value.is::<String>());
        assert!(!value.is::<&str>());
        assert_eq!(
            value.downcast_ref::<String>().map(String::as_str),
            Some("#9c27b0")
        );
        assert_eq!(value.downcast_ref::<i32>(), None);
    }

    #[test]
    fn clone_is_deep_and_equal() {
        let value = ErasedValue::new(alloc::vec![1_u8, 2, 3]);
        let cloned = value.clone();
        assert_eq!(value, cloned);
        assert_eq!(cloned.downcast_ref::<alloc::vec::Vec<u8>>().map(|v| v.len()), Some(3));
    }

    #[test]
    fn equality_is_by_value_and_type() {
        assert_eq!(ErasedValue::new(1.5_f64), ErasedValue::new(1.5_f64));
        assert_ne!(ErasedValue::new(1_u32), ErasedValue::new(1_u64));
        assert!(ErasedValue::new(7_i32).eq_value(&7_i32));
        assert!(!ErasedValue::new(7_i32).eq_value(&8_i32));
    }

    #[test]
    fn debug_prints_inner_value() {
        let value = ErasedValue::new(String::from("white"));
        assert_eq!(format!("{value:?}"), "\"white\"");
        assert!(value.type_name().contains("String"));
    }
}
