// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Dirty: dependency and invalidation primitives.
//!
//! This crate is the substrate of the Trellis reactive attribute engine. It
//! knows nothing about values or rules; it tracks *which* keys depend on which
//! and in what order pending changes must be processed:
//!
//! - **Dependency graphs** ([`DepGraph`]): DAG of "A depends on B" edges with
//!   cycle detection, atomic dependency replacement, and bidirectional queries.
//! - **Pending sets** ([`PendingSet`]): accumulated changed keys with a
//!   generation counter.
//! - **Topological drain** ([`DrainSorted`]): Kahn's algorithm yielding keys in
//!   dependency order, ties broken by ascending key, with stall detection when
//!   a cycle slipped in.
//! - **Interning** ([`intern::Interner`]): maps owned keys such as attribute
//!   names to compact [`InternId`] handles.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_dirty::{CycleHandling, DepGraph, PendingSet, drain_affected_sorted};
//!
//! let mut graph = DepGraph::<u32>::new();
//!
//! // 3 depends on 2, 2 depends on 1
//! graph.add_dependency(2, 1, CycleHandling::Error).unwrap();
//! graph.add_dependency(3, 2, CycleHandling::Error).unwrap();
//!
//! let mut pending = PendingSet::new();
//! pending.mark(1);
//!
//! // Roots plus everything downstream, dependencies first.
//! let order: Vec<_> = drain_affected_sorted(&mut pending, &graph).collect();
//! assert_eq!(order, vec![1, 2, 3]);
//! assert!(pending.is_empty());
//! ```
//!
//! ## Cycle Detection
//!
//! [`DepGraph::add_dependency`] takes a [`CycleHandling`]:
//!
//! - `Error` (default): returns `Err(CycleError)` if a cycle would be created.
//! - `DebugAssert`: panics in debug builds, ignores the edge in release.
//! - `Ignore`: silently drops the edge.
//! - `Allow`: skips the reachability check entirely.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod drain;
mod graph;
pub mod intern;
mod key;
mod pending;

pub use drain::{DrainCompletion, DrainSorted, drain_affected_sorted, drain_sorted};
pub use graph::{CycleError, CycleHandling, DepGraph};
pub use intern::InternId;
pub use key::DenseKey;
pub use pending::PendingSet;
