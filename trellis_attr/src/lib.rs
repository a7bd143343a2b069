// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Attr: a reactive attribute graph.
//!
//! Objects own named, typed attributes. An attribute is either a *source*,
//! written directly, or *computed* by a rule over other attributes: "recompute
//! `css` when `primary`, `secondary` or `radius` change". A rule may read
//! attributes of its own object or of the object its owner currently
//! references, one level deep.
//!
//! ## Core Concepts
//!
//! - [`AttrGraph::declare`] registers a rule, rejecting dependency cycles up
//!   front, and computes the attribute once immediately.
//! - [`AttrGraph::set`] writes a source. An equal value is ignored; a new one
//!   is recorded as pending.
//! - [`AttrGraph::flush`] propagates pending changes in topological order.
//!   Every attribute is visited at most once per flush, so a rule whose
//!   inputs changed together runs once.
//! - [`AttrGraph::get`] is passive and never recomputes.
//! - [`AttrGraph::set_reference`] rewires every rule that reads through the
//!   reference and reruns it against the new referent.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use trellis_attr::{AttrGraph, AttrPath};
//!
//! let mut graph = AttrGraph::new();
//! let obj = graph.create_object("point");
//! let x = graph.add_attribute(obj, "x", 1_i32).unwrap();
//! let y = graph.add_attribute(obj, "y", 2_i32).unwrap();
//!
//! let runs = Arc::new(AtomicUsize::new(0));
//! let counter = runs.clone();
//! let sum = graph
//!     .declare(obj, "sum", &[AttrPath::own("x"), AttrPath::own("y")], move |inputs| {
//!         counter.fetch_add(1, Ordering::Relaxed);
//!         Ok(inputs.get::<i32>(0)? + inputs.get::<i32>(1)?)
//!     })
//!     .unwrap();
//! assert_eq!(*graph.get(sum), 3);
//!
//! // Two writes, one recomputation.
//! graph.set(x, 10).unwrap();
//! graph.set(y, 20).unwrap();
//! graph.flush().unwrap();
//! assert_eq!(*graph.get(sum), 30);
//! assert_eq!(runs.load(Ordering::Relaxed), 2);
//!
//! // Writing the current value schedules nothing.
//! assert!(!graph.set(x, 10).unwrap());
//! assert!(!graph.has_pending());
//! ```
//!
//! ## Threading
//!
//! The graph is single-threaded and synchronous. Rules are `Send + Sync`, so
//! a graph can live behind a lock shared between threads.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Logging goes through `tracing`
//! without its `std` feature.

#![no_std]

extern crate alloc;

mod error;
mod graph;
mod id;
mod path;
mod report;
mod rule;
mod value;

pub use error::{Error, RuleError};
pub use graph::AttrGraph;
pub use id::{Attr, AttrKey, Name, ObjectId};
pub use path::{AttrPath, Selector};
pub use report::FlushReport;
pub use rule::RuleInputs;
pub use value::{AttrValue, ErasedValue};

pub use trellis_dirty::{CycleError, CycleHandling};
