// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Theme: reactive CSS generation from color schemes.
//!
//! A [`ColorScheme`] is an object in a [`trellis_attr::AttrGraph`] with one
//! source attribute per [`ColorRole`]. A [`CssGenerator`] references a scheme
//! and computes its `panel_css` and `dataframe_css` attributes with a
//! [`CssTemplate`]. Edit a color, flush, and every generator on that scheme
//! has fresh stylesheets.
//!
//! ```rust
//! use trellis_attr::AttrGraph;
//! use trellis_theme::{ColorRole, ColorScheme, CssGenerator, DarkTemplate, DefaultTemplate};
//!
//! let mut graph = AttrGraph::new();
//! let scheme = ColorScheme::builder().build(&mut graph, "scheme").unwrap();
//! let default = CssGenerator::new(&mut graph, "Default", &scheme, DefaultTemplate).unwrap();
//! let dark = CssGenerator::new(&mut graph, "Dark", &scheme, DarkTemplate).unwrap();
//! assert_eq!(default.panel_css(&graph), "");
//!
//! scheme.set_color(&mut graph, ColorRole::Primary, "#3F51B5").unwrap();
//! graph.flush().unwrap();
//! assert!(dark.panel_css(&graph).contains("#3F51B5"));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod generator;
mod scheme;
mod template;

pub use generator::CssGenerator;
pub use scheme::{ColorRole, ColorScheme, ColorSchemeBuilder, EDITABLE_COLORS};
pub use template::{CssTemplate, DarkTemplate, DefaultTemplate, SchemeColors};
