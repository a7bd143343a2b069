// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis State: an explicit per-process context.
//!
//! Instead of module-level registries, a process owns one [`Context`]:
//!
//! - **Cache**: typed values shared between sessions, no eviction.
//! - **Servers**: everything started by the process, described by the
//!   [`Server`] trait, and stopped together by [`Context::kill_all_servers`].
//! - **Endpoints**: objects of a [`trellis_attr::AttrGraph`] published under
//!   a name. [`Context::flush`] keeps the published attributes of all
//!   objects on an endpoint equal.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_attr::AttrGraph;
//! use trellis_state::Context;
//!
//! let mut graph = AttrGraph::new();
//! let a = graph.create_object("session a");
//! let b = graph.create_object("session b");
//! let threshold_a = graph.add_attribute(a, "threshold", 0.5_f64).unwrap();
//! graph.add_attribute(b, "threshold", 0.5_f64).unwrap();
//!
//! let mut context = Context::new();
//! context.publish("/params", &graph, a, None).unwrap();
//! context.publish("/params", &graph, b, None).unwrap();
//!
//! graph.set(threshold_a, 0.8).unwrap();
//! context.flush(&mut graph).unwrap();
//! assert_eq!(graph.get_by_name::<f64>(b, "threshold"), Some(&0.8));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod context;
mod endpoint;
mod error;
mod server;

pub use context::Context;
pub use endpoint::SyncReport;
pub use error::StateError;
pub use server::{Server, ServerId, StopError};
