// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use trellis_dirty::CycleError;

use crate::id::{AttrKey, ObjectId};

/// Why a rule could not produce a value.
///
/// Rules return this from their closure. The graph wraps it in
/// [`Error::Rule`] together with the attribute whose rule failed.
#[derive(Debug)]
pub enum RuleError {
    /// A declared input has no value, usually a referent path while the
    /// owner references nothing.
    MissingInput {
        /// The attribute name of the missing input.
        name: String,
    },
    /// A declared input holds a value of another type than requested.
    InputTypeMismatch {
        /// The attribute name of the input.
        name: String,
        /// The type the rule asked for.
        expected: &'static str,
        /// The type actually stored.
        found: &'static str,
    },
    /// Any other failure raised by the rule itself.
    Failed(Box<dyn core::error::Error + Send + Sync>),
}

impl RuleError {
    /// Wraps an arbitrary error.
    pub fn failed(error: impl core::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Box::new(error))
    }

    /// A failure described only by a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failed(Box::from(message.into()))
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput { name } => write!(f, "input `{name}` has no value"),
            Self::InputTypeMismatch {
                name,
                expected,
                found,
            } => write!(f, "input `{name}` is a {found}, not a {expected}"),
            Self::Failed(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl core::error::Error for RuleError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Failed(error) => Some(&**error),
            _ => None,
        }
    }
}

/// Errors returned by [`AttrGraph`](crate::AttrGraph) operations.
#[derive(Debug)]
pub enum Error {
    /// A dependency edge would close a cycle, or propagation met one.
    ///
    /// The edge reads "`from` depends on `to`". When a flush fails this way
    /// both ends are among the attributes it could not order.
    Cycle(CycleError<AttrKey>),
    /// A rule failed while computing `attribute`.
    Rule {
        /// The attribute whose rule failed. It keeps its previous value.
        attribute: AttrKey,
        /// What the rule reported.
        source: RuleError,
    },
    /// The object handle does not belong to this graph.
    UnknownObject(ObjectId),
    /// The object has no attribute with this name.
    UnknownAttribute {
        /// The object that was searched.
        object: ObjectId,
        /// The requested name.
        name: String,
    },
    /// The object already has an attribute with this name.
    DuplicateAttribute {
        /// The owning object.
        object: ObjectId,
        /// The repeated name.
        name: String,
    },
    /// The attribute already has a rule.
    RuleAlreadyDeclared(AttrKey),
    /// The attribute is computed by a rule and cannot be written directly.
    ComputedAttribute(AttrKey),
    /// A value of the wrong type was supplied for, or requested from, an
    /// attribute.
    TypeMismatch {
        /// The attribute involved.
        attribute: AttrKey,
        /// The type the attribute holds.
        expected: &'static str,
        /// The type that was supplied or requested.
        found: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle(cycle) => fmt::Display::fmt(cycle, f),
            Self::Rule { attribute, source } => {
                write!(f, "rule for {attribute:?} failed: {source}")
            }
            Self::UnknownObject(object) => write!(f, "unknown object {object:?}"),
            Self::UnknownAttribute { object, name } => {
                write!(f, "{object:?} has no attribute `{name}`")
            }
            Self::DuplicateAttribute { object, name } => {
                write!(f, "{object:?} already has an attribute `{name}`")
            }
            Self::RuleAlreadyDeclared(key) => write!(f, "{key:?} already has a rule"),
            Self::ComputedAttribute(key) => {
                write!(f, "{key:?} is computed and cannot be set")
            }
            Self::TypeMismatch {
                attribute,
                expected,
                found,
            } => write!(f, "{attribute:?} holds a {expected}, not a {found}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Cycle(cycle) => Some(cycle),
            Self::Rule { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CycleError<AttrKey>> for Error {
    fn from(cycle: CycleError<AttrKey>) -> Self {
        Self::Cycle(cycle)
    }
}
