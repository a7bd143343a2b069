// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency paths.

use crate::id::Name;

/// Which object a dependency path starts from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// The object that owns the rule.
    Own,
    /// The object the owner currently references.
    Referent,
}

/// A dependency of a rule: an attribute name on the owner or on its referent.
///
/// Paths are resolved to interned names once, when the rule is declared.
///
/// ```rust
/// use trellis_attr::{AttrPath, Selector};
///
/// let width = AttrPath::own("width");
/// let primary = AttrPath::referent("primary");
/// assert_eq!(width.selector(), Selector::Own);
/// assert_eq!(primary.name(), "primary");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttrPath<'a> {
    selector: Selector,
    name: &'a str,
}

impl<'a> AttrPath<'a> {
    /// A path to an attribute of the owning object.
    #[must_use]
    pub const fn own(name: &'a str) -> Self {
        Self {
            selector: Selector::Own,
            name,
        }
    }

    /// A path to an attribute of the referenced object.
    #[must_use]
    pub const fn referent(name: &'a str) -> Self {
        Self {
            selector: Selector::Referent,
            name,
        }
    }

    /// The starting object of this path.
    #[must_use]
    pub const fn selector(self) -> Selector {
        self.selector
    }

    /// The attribute name this path ends at.
    #[must_use]
    pub const fn name(self) -> &'a str {
        self.name
    }
}

/// A path whose name has been interned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ResolvedPath {
    pub(crate) selector: Selector,
    pub(crate) name: Name,
}
