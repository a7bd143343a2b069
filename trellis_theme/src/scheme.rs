// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color schemes.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use trellis_attr::{Attr, AttrGraph, Error, ObjectId};

/// An editable color of a [`ColorScheme`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColorRole {
    /// Accent for active and primary elements.
    Primary,
    /// Accent for selection, focus and success.
    Secondary,
    /// Warning and danger buttons.
    Warning,
    /// Page background.
    Dark,
    /// Light foreground.
    White,
    /// Dark foreground.
    Black,
    /// Input backgrounds.
    Gray700,
    /// Table headers and rows.
    Gray800,
    /// Default text.
    TextPrimary,
    /// Disabled text and outlines.
    DisabledText,
}

impl ColorRole {
    /// Every role, in attribute declaration order.
    pub const ALL: [Self; 10] = [
        Self::Primary,
        Self::Secondary,
        Self::Warning,
        Self::Dark,
        Self::White,
        Self::Black,
        Self::Gray700,
        Self::Gray800,
        Self::TextPrimary,
        Self::DisabledText,
    ];

    /// The attribute name of this role.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Warning => "warning",
            Self::Dark => "dark",
            Self::White => "white",
            Self::Black => "black",
            Self::Gray700 => "gray_700",
            Self::Gray800 => "gray_800",
            Self::TextPrimary => "text_primary",
            Self::DisabledText => "disabled_text",
        }
    }

    /// The role named `name`, if any.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }

    /// The color a new scheme starts with.
    #[must_use]
    pub const fn default_color(self) -> &'static str {
        match self {
            Self::Primary => "#9C27B0",
            Self::Secondary => "#F44336",
            Self::Warning => "#FF9800",
            Self::Dark => "#121212",
            Self::White => "#FFFFFF",
            Self::Black => "#000000",
            Self::Gray700 => "#616161",
            Self::Gray800 => "#424242",
            Self::TextPrimary => "#FFFFFF",
            Self::DisabledText => "rgba(255, 255, 255, 0.5)",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute names of every editable color.
pub const EDITABLE_COLORS: [&str; 10] = [
    ColorRole::Primary.name(),
    ColorRole::Secondary.name(),
    ColorRole::Warning.name(),
    ColorRole::Dark.name(),
    ColorRole::White.name(),
    ColorRole::Black.name(),
    ColorRole::Gray700.name(),
    ColorRole::Gray800.name(),
    ColorRole::TextPrimary.name(),
    ColorRole::DisabledText.name(),
];

/// A color scheme living in an [`AttrGraph`].
///
/// Each [`ColorRole`] is a source attribute holding a CSS color string.
///
/// ```rust
/// use trellis_attr::AttrGraph;
/// use trellis_theme::{ColorRole, ColorScheme};
///
/// let mut graph = AttrGraph::new();
/// let scheme = ColorScheme::builder()
///     .color(ColorRole::Primary, "#3F51B5")
///     .build(&mut graph, "indigo")
///     .unwrap();
///
/// assert_eq!(scheme.color(&graph, ColorRole::Primary), "#3F51B5");
/// assert_eq!(scheme.color(&graph, ColorRole::Secondary), "#F44336");
/// ```
#[derive(Clone, Debug)]
pub struct ColorScheme {
    object: ObjectId,
    colors: Vec<Attr<String>>,
}

impl ColorScheme {
    /// Starts a scheme with every role at its default color.
    #[must_use]
    pub fn builder() -> ColorSchemeBuilder {
        ColorSchemeBuilder::new()
    }

    /// The scheme's object in the graph.
    #[must_use]
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// The attribute holding `role`.
    #[must_use]
    pub fn attr(&self, role: ColorRole) -> Attr<String> {
        self.colors[role.index()]
    }

    /// The current color of `role`.
    #[must_use]
    pub fn color<'g>(&self, graph: &'g AttrGraph, role: ColorRole) -> &'g str {
        graph.get::<String>(self.attr(role))
    }

    /// Changes the color of `role`; the change propagates on the next flush.
    ///
    /// Returns whether the color changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `graph` is not the graph the scheme was built in.
    pub fn set_color(
        &self,
        graph: &mut AttrGraph,
        role: ColorRole,
        color: impl Into<String>,
    ) -> Result<bool, Error> {
        graph.set(self.attr(role), color.into())
    }
}

/// Builds a [`ColorScheme`].
#[derive(Clone, Debug)]
pub struct ColorSchemeBuilder {
    colors: [String; 10],
}

impl Default for ColorSchemeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSchemeBuilder {
    /// A builder with every role at its default color.
    #[must_use]
    pub fn new() -> Self {
        Self {
            colors: ColorRole::ALL.map(|role| String::from(role.default_color())),
        }
    }

    /// Overrides the color of `role`.
    #[must_use]
    pub fn color(mut self, role: ColorRole, color: impl Into<String>) -> Self {
        self.colors[role.index()] = color.into();
        self
    }

    /// Creates the scheme object in `graph`.
    ///
    /// # Errors
    ///
    /// Propagates graph errors; none occur for a freshly created object.
    pub fn build(self, graph: &mut AttrGraph, label: &str) -> Result<ColorScheme, Error> {
        let object = graph.create_object(label);
        let mut colors = Vec::with_capacity(ColorRole::ALL.len());
        for (role, color) in ColorRole::ALL.into_iter().zip(self.colors) {
            colors.push(graph.add_attribute(object, role.name(), color)?);
        }
        tracing::debug!(label, "color scheme created");
        Ok(ColorScheme { object, colors })
    }
}
