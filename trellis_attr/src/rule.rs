// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rules and the inputs they read.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use smallvec::SmallVec;
use trellis_dirty::intern::Interner;

use crate::error::RuleError;
use crate::id::{NodeId, ObjectId};
use crate::path::{AttrPath, ResolvedPath, Selector};
use crate::value::{AttrValue, ErasedValue};

pub(crate) type RuleFn =
    Box<dyn Fn(&RuleInputs<'_>) -> Result<ErasedValue, RuleError> + Send + Sync>;

/// Wraps a typed rule closure into its stored form.
pub(crate) fn erase_rule<T, F>(rule: F) -> RuleFn
where
    T: AttrValue,
    F: Fn(&RuleInputs<'_>) -> Result<T, RuleError> + Send + Sync + 'static,
{
    Box::new(move |inputs| rule(inputs).map(ErasedValue::new))
}

/// A declared rule: its dependency paths, where each currently resolves, and
/// the function itself.
pub(crate) struct RuleSlot {
    pub(crate) paths: SmallVec<[ResolvedPath; 4]>,
    /// Parallel to `paths`. `None` for a referent path with no referent.
    pub(crate) resolved: SmallVec<[Option<NodeId>; 4]>,
    pub(crate) func: RuleFn,
}

/// The current values of a rule's declared dependencies.
///
/// Inputs are indexed in declaration order, duplicates removed. They can
/// also be looked up by attribute name.
///
/// ```rust
/// use trellis_attr::{AttrGraph, AttrPath};
///
/// let mut graph = AttrGraph::new();
/// let obj = graph.create_object("box");
/// graph.add_attribute(obj, "width", 3_u32).unwrap();
/// graph.add_attribute(obj, "height", 4_u32).unwrap();
///
/// let area = graph
///     .declare(
///         obj,
///         "area",
///         &[AttrPath::own("width"), AttrPath::own("height")],
///         |inputs| Ok(inputs.get::<u32>(0)? * inputs.by_name::<u32>("height")?),
///     )
///     .unwrap();
/// assert_eq!(*graph.get(area), 12);
/// ```
pub struct RuleInputs<'a> {
    owner: ObjectId,
    names: &'a Interner<String>,
    paths: &'a [ResolvedPath],
    values: SmallVec<[Option<&'a ErasedValue>; 4]>,
}

impl<'a> RuleInputs<'a> {
    pub(crate) fn new(
        owner: ObjectId,
        names: &'a Interner<String>,
        paths: &'a [ResolvedPath],
        values: SmallVec<[Option<&'a ErasedValue>; 4]>,
    ) -> Self {
        debug_assert_eq!(paths.len(), values.len(), "one value slot per path");
        Self {
            owner,
            names,
            paths,
            values,
        }
    }

    /// The object that owns the rule.
    #[must_use]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Number of declared inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` for a rule without dependencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The declared path of input `index`.
    #[must_use]
    pub fn path(&self, index: usize) -> Option<AttrPath<'a>> {
        let path = self.paths.get(index)?;
        let name = self.name_of(path);
        Some(match path.selector {
            Selector::Own => AttrPath::own(name),
            Selector::Referent => AttrPath::referent(name),
        })
    }

    /// The raw value of input `index`, or `None` if it has none.
    #[must_use]
    pub fn erased(&self, index: usize) -> Option<&'a ErasedValue> {
        self.values.get(index).copied().flatten()
    }

    /// The value of input `index`.
    ///
    /// # Errors
    ///
    /// [`RuleError::MissingInput`] if the input has no value and
    /// [`RuleError::InputTypeMismatch`] if it is not a `T`.
    pub fn get<T: AttrValue>(&self, index: usize) -> Result<&'a T, RuleError> {
        self.try_get(index)?
            .ok_or_else(|| RuleError::MissingInput {
                name: self.label(index),
            })
    }

    /// The value of input `index`, or `None` if it has none.
    ///
    /// # Errors
    ///
    /// [`RuleError::InputTypeMismatch`] if the value is not a `T`.
    pub fn try_get<T: AttrValue>(&self, index: usize) -> Result<Option<&'a T>, RuleError> {
        let Some(value) = self.erased(index) else {
            return Ok(None);
        };
        value
            .downcast_ref::<T>()
            .map(Some)
            .ok_or_else(|| RuleError::InputTypeMismatch {
                name: self.label(index),
                expected: core::any::type_name::<T>(),
                found: value.type_name(),
            })
    }

    /// The value of the first input whose path ends at `name`.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get); an undeclared name is a
    /// [`RuleError::MissingInput`].
    pub fn by_name<T: AttrValue>(&self, name: &str) -> Result<&'a T, RuleError> {
        self.try_by_name(name)?
            .ok_or_else(|| RuleError::MissingInput {
                name: name.to_string(),
            })
    }

    /// The value of the first input whose path ends at `name`, or `None`.
    ///
    /// # Errors
    ///
    /// [`RuleError::InputTypeMismatch`] if the value is not a `T`.
    pub fn try_by_name<T: AttrValue>(&self, name: &str) -> Result<Option<&'a T>, RuleError> {
        match self.index_of(name) {
            Some(index) => self.try_get(index),
            None => Ok(None),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let id = self.names.lookup(name)?;
        self.paths.iter().position(|p| p.name.intern_id() == id)
    }

    fn name_of(&self, path: &ResolvedPath) -> &'a str {
        self.names
            .get(path.name.intern_id())
            .map_or("", String::as_str)
    }

    fn label(&self, index: usize) -> String {
        match self.paths.get(index) {
            Some(path) => self.name_of(path).to_string(),
            None => alloc::format!("#{index}"),
        }
    }
}

impl core::fmt::Debug for RuleInputs<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut list = f.debug_map();
        for (path, value) in self.paths.iter().zip(&self.values) {
            list.entry(&self.name_of(path), value);
        }
        list.finish()
    }
}
