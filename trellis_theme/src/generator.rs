// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS generators.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use trellis_attr::{Attr, AttrGraph, AttrPath, Error, FlushReport, ObjectId};

use crate::scheme::{ColorScheme, EDITABLE_COLORS};
use crate::template::{CssTemplate, SchemeColors};

/// An object whose `panel_css` and `dataframe_css` attributes are computed
/// from the color scheme it references.
///
/// Both stylesheets are rules over every editable color of the scheme, read
/// through the generator's reference. Changing a color regenerates them on
/// the next flush; pointing the generator at another scheme regenerates them
/// immediately.
///
/// ```rust
/// use trellis_attr::AttrGraph;
/// use trellis_theme::{ColorRole, ColorScheme, CssGenerator, DarkTemplate};
///
/// let mut graph = AttrGraph::new();
/// let scheme = ColorScheme::builder().build(&mut graph, "default").unwrap();
/// let dark = CssGenerator::new(&mut graph, "Dark", &scheme, DarkTemplate).unwrap();
/// assert!(dark.panel_css(&graph).contains("background-color: #121212;"));
///
/// scheme.set_color(&mut graph, ColorRole::Dark, "#000000").unwrap();
/// graph.flush().unwrap();
/// assert!(dark.panel_css(&graph).contains("background-color: #000000;"));
/// ```
#[derive(Clone, Debug)]
pub struct CssGenerator {
    object: ObjectId,
    panel_css: Attr<String>,
    dataframe_css: Attr<String>,
}

impl CssGenerator {
    /// Creates a generator object named `label` that renders `template`
    /// against `scheme`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rule`] if the template fails on the initial render.
    pub fn new(
        graph: &mut AttrGraph,
        label: &str,
        scheme: &ColorScheme,
        template: impl CssTemplate,
    ) -> Result<Self, Error> {
        let object = graph.create_object(label);
        graph.set_reference(object, Some(scheme.object()))?;

        let template = Arc::new(template);
        let paths: Vec<AttrPath<'static>> =
            EDITABLE_COLORS.iter().map(|&name| AttrPath::referent(name)).collect();

        let panel = Arc::clone(&template);
        let panel_css = graph.declare(object, "panel_css", &paths, move |inputs| {
            panel.panel_css(&SchemeColors::new(inputs))
        })?;
        let dataframe_css = graph.declare(object, "dataframe_css", &paths, move |inputs| {
            template.dataframe_css(&SchemeColors::new(inputs))
        })?;

        tracing::debug!(label, "css generator created");
        Ok(Self {
            object,
            panel_css,
            dataframe_css,
        })
    }

    /// The generator's object in the graph.
    #[must_use]
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// The computed page stylesheet attribute.
    #[must_use]
    pub fn panel_css_attr(&self) -> Attr<String> {
        self.panel_css
    }

    /// The computed table stylesheet attribute.
    #[must_use]
    pub fn dataframe_css_attr(&self) -> Attr<String> {
        self.dataframe_css
    }

    /// The current page stylesheet.
    #[must_use]
    pub fn panel_css<'g>(&self, graph: &'g AttrGraph) -> &'g str {
        graph.get::<String>(self.panel_css)
    }

    /// The current table stylesheet.
    #[must_use]
    pub fn dataframe_css<'g>(&self, graph: &'g AttrGraph) -> &'g str {
        graph.get::<String>(self.dataframe_css)
    }

    /// Renders against `scheme` from now on. Both stylesheets are
    /// regenerated before this returns.
    ///
    /// # Errors
    ///
    /// Errors of [`AttrGraph::set_reference`].
    pub fn set_color_scheme(
        &self,
        graph: &mut AttrGraph,
        scheme: &ColorScheme,
    ) -> Result<FlushReport, Error> {
        graph.set_reference(self.object, Some(scheme.object()))
    }
}
