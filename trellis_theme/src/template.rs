// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylesheet templates.

use alloc::format;
use alloc::string::String;

use trellis_attr::{RuleError, RuleInputs};

use crate::scheme::ColorRole;

/// The scheme colors a template is rendered with.
///
/// This is a view over the inputs of a generator's stylesheet rule, which
/// reads every editable color through the generator's reference.
#[derive(Debug)]
pub struct SchemeColors<'r, 'a> {
    inputs: &'r RuleInputs<'a>,
}

impl<'r, 'a> SchemeColors<'r, 'a> {
    /// Wraps the inputs of a stylesheet rule.
    #[must_use]
    pub fn new(inputs: &'r RuleInputs<'a>) -> Self {
        Self { inputs }
    }

    /// The current color of `role`.
    ///
    /// # Errors
    ///
    /// [`RuleError::MissingInput`] if the generator references no scheme.
    pub fn get(&self, role: ColorRole) -> Result<&'a str, RuleError> {
        self.inputs.by_name::<String>(role.name()).map(String::as_str)
    }
}

/// Renders stylesheets from a color scheme.
///
/// Both methods default to an empty stylesheet.
pub trait CssTemplate: Send + Sync + 'static {
    /// CSS for the general page and widgets.
    ///
    /// # Errors
    ///
    /// Returns an error if a color the template needs is missing.
    fn panel_css(&self, colors: &SchemeColors<'_, '_>) -> Result<String, RuleError> {
        let _ = colors;
        Ok(String::new())
    }

    /// CSS for data tables.
    ///
    /// # Errors
    ///
    /// Returns an error if a color the template needs is missing.
    fn dataframe_css(&self, colors: &SchemeColors<'_, '_>) -> Result<String, RuleError> {
        let _ = colors;
        Ok(String::new())
    }
}

/// Produces empty stylesheets.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultTemplate;

impl CssTemplate for DefaultTemplate {}

/// A dark theme: light text on the scheme's dark background, with filled
/// buttons in the accent colors.
#[derive(Copy, Clone, Debug, Default)]
pub struct DarkTemplate;

impl DarkTemplate {
    const TABLE_BACKGROUND: &'static str = "#424242";
    const TABLE_BORDER: &'static str = "rgba(255,255,255, 0.5)";
    const TABLE_COLOR: &'static str = "#ffffff";
}

impl CssTemplate for DarkTemplate {
    fn panel_css(&self, colors: &SchemeColors<'_, '_>) -> Result<String, RuleError> {
        let dark = colors.get(ColorRole::Dark)?;
        let white = colors.get(ColorRole::White)?;
        let black = colors.get(ColorRole::Black)?;
        let primary = colors.get(ColorRole::Primary)?;
        let secondary = colors.get(ColorRole::Secondary)?;
        let warning = colors.get(ColorRole::Warning)?;

        let mut css = format!(
            "body {{\n    background-color: {dark};\n    color: {white};\n}}\n\n\
             h1, h2, h3, h4, h5 {{\n    color: {white} !important;\n}}\n\n\
             .bk-root .bk-tabs-header .bk-tab.bk-active {{\n    background: {primary};\n    \
             color: {white};\n    border-color: {primary};\n}}\n"
        );
        css.push_str(&outlined_button(
            "default",
            colors.get(ColorRole::TextPrimary)?,
            colors.get(ColorRole::DisabledText)?,
        ));
        css.push_str(&contained_button("primary", primary, white));
        css.push_str(&contained_button("success", secondary, black));
        css.push_str(&contained_button("warning", warning, white));
        css.push_str(&contained_button("danger", warning, white));
        css.push_str(&input(colors.get(ColorRole::Gray700)?, white, secondary));
        css.push_str(&table_header(colors.get(ColorRole::Gray800)?, secondary, black));
        Ok(css)
    }

    fn dataframe_css(&self, _colors: &SchemeColors<'_, '_>) -> Result<String, RuleError> {
        let (background, border, color) =
            (Self::TABLE_BACKGROUND, Self::TABLE_BORDER, Self::TABLE_COLOR);
        Ok(format!(
            "table.panel-df {{\n    color: {color};\n    border-radius: 4px;\n}}\n\
             .panel-df tbody tr {{\n    background: {background};\n    \
             border-top: 1px solid {border};\n}}\n\
             .panel-df thead {{\n    background: {background};\n    color: {color};\n}}\n\
             .panel-df tr:hover {{\n    background: {background} !important;\n}}\n"
        ))
    }
}

fn outlined_button(kind: &str, color: &str, border: &str) -> String {
    format!(
        ".bk-root .bk-btn-{kind} {{\n    color: {color};\n    background-color: transparent;\n    \
         border: 1px solid {border};\n    border-radius: 4px;\n}}\n\
         .bk-root .bk-btn-{kind}:hover,\n.bk-root .bk-btn-{kind}.bk-active {{\n    \
         color: {color};\n    background-color: transparent;\n    border-color: {border};\n}}\n"
    )
}

fn contained_button(kind: &str, background: &str, color: &str) -> String {
    format!(
        ".bk-root .bk-btn-{kind} {{\n    color: {color};\n    background-color: {background};\n    \
         border: 0px;\n    border-radius: 4px;\n}}\n\
         .bk-root .bk-btn-{kind}:hover,\n.bk-root .bk-btn-{kind}.bk-active {{\n    \
         background-color: {background};\n}}\n\
         .bk-root .bk-btn-{kind}[disabled] {{\n    background-color: transparent;\n    \
         border-color: #ccc;\n}}\n"
    )
}

fn input(background: &str, color: &str, focus: &str) -> String {
    format!(
        ".bk-root .bk-input {{\n    background: {background};\n    color: {color};\n    \
         border: 1px solid rgb(216,209,202);\n    border-radius: 4px;\n}}\n\
         .bk-root .bk-input:focus {{\n    background: {background};\n    color: {color};\n    \
         border-color: {focus};\n}}\n"
    )
}

fn table_header(background: &str, selected: &str, selected_text: &str) -> String {
    format!(
        ".bk-root .slick-header-column {{\n    background: {background};\n}}\n\
         .bk-root .slick-row {{\n    background: {background};\n}}\n\
         .bk-root .slick-cell.selected {{\n    background-color: {selected};\n    \
         color: {selected_text};\n}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contained_button_interpolates() {
        let css = contained_button("primary", "#9C27B0", "#FFFFFF");
        assert!(css.contains(".bk-root .bk-btn-primary {"));
        assert!(css.contains("background-color: #9C27B0;"));
        assert!(css.contains("color: #FFFFFF;"));
    }

    #[test]
    fn outlined_button_is_transparent() {
        let css = outlined_button("default", "#FFFFFF", "gray");
        assert!(css.contains("background-color: transparent;"));
        assert!(css.contains("border: 1px solid gray;"));
    }
}
