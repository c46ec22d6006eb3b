//! Per-path control panel: the interface to the external UI builder.
//!
//! The core never reads state back out of the panel. Every value shown in a
//! panel is pushed from path state; user edits come in as [`PanelInput`].

use crate::geometry::CurveKind;
use crate::path::PathIndex;
use crate::points::Axis;
use crate::text::TextEditor;
use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable key of a sub-control inside a path panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    PointInput { point: usize, axis: Axis },
    FontSize,
    TextOffset,
    /// Single-line text input.
    TextContent,
    /// Multi-line text area.
    TextContentFixed,
    TextStyle,
    FocusButton(usize),
    ResetPath,
    ToggleVisibility,
}

impl Control {
    /// Control for one of the two text editors.
    pub fn text_editor(editor: TextEditor) -> Self {
        match editor {
            TextEditor::Inline => Control::TextContent,
            TextEditor::Multiline => Control::TextContentFixed,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::PointInput { point, axis } => write!(f, "{}-{}", point, axis.name()),
            Control::FontSize => f.write_str("size"),
            Control::TextOffset => f.write_str("x"),
            Control::TextContent => f.write_str("textContent"),
            Control::TextContentFixed => f.write_str("textContentFixed"),
            Control::TextStyle => f.write_str("style"),
            Control::FocusButton(point) => write!(f, "focus-{}", point),
            Control::ResetPath => f.write_str("reset-path"),
            Control::ToggleVisibility => f.write_str("toggle-path-visibility"),
        }
    }
}

/// User interaction with a path panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelInput {
    /// Raw text typed into a point coordinate field.
    PointField { point: usize, axis: Axis, raw: String },
    FontSize(String),
    TextOffset(String),
    Text { editor: TextEditor, value: String },
    Style(String),
    FocusButton(usize),
    ResetPath,
    ToggleVisibility,
    EditorFocused(TextEditor),
    EditorBlurred(TextEditor),
}

/// What the core sends when asking for a new panel.
#[derive(Debug, Clone)]
pub struct PathUiRequest {
    pub index: PathIndex,
    pub points: Vec<Point>,
    pub color: Color,
    pub kind: CurveKind,
}

/// Handle to one materialised path panel.
pub trait PathPanel {
    /// Set the displayed value of a control.
    fn set_value(&mut self, control: Control, value: String);

    /// Current displayed value of a control.
    fn value(&self, control: Control) -> Option<&str>;

    /// Toggle the highlighted ("active") look of a control.
    fn set_active(&mut self, control: Control, active: bool);

    fn is_active(&self, control: Control) -> bool;

    /// Give keyboard focus to a control with the caret at `cursor` (in chars).
    fn focus(&mut self, control: Control, cursor: usize);

    /// Drop keyboard focus if `control` has it.
    fn blur(&mut self, control: Control);

    /// Focused control and caret position.
    fn focused(&self) -> Option<(Control, usize)>;
}

/// The external collaborator that builds panels.
pub trait PanelBuilder {
    fn add_path_ui(&mut self, request: &PathUiRequest) -> Box<dyn PathPanel>;
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ControlState {
    value: String,
    active: bool,
}

/// In-memory panel that only records control state.
///
/// Used by headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct FormPanel {
    index: PathIndex,
    controls: HashMap<Control, ControlState>,
    focus: Option<(Control, usize)>,
}

impl FormPanel {
    pub fn new(index: PathIndex) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn index(&self) -> PathIndex {
        self.index
    }
}

impl PathPanel for FormPanel {
    fn set_value(&mut self, control: Control, value: String) {
        self.controls.entry(control).or_default().value = value;
    }

    fn value(&self, control: Control) -> Option<&str> {
        self.controls.get(&control).map(|state| state.value.as_str())
    }

    fn set_active(&mut self, control: Control, active: bool) {
        self.controls.entry(control).or_default().active = active;
    }

    fn is_active(&self, control: Control) -> bool {
        self.controls.get(&control).is_some_and(|state| state.active)
    }

    fn focus(&mut self, control: Control, cursor: usize) {
        self.focus = Some((control, cursor));
    }

    fn blur(&mut self, control: Control) {
        if self.focus.is_some_and(|(focused, _)| focused == control) {
            self.focus = None;
        }
    }

    fn focused(&self) -> Option<(Control, usize)> {
        self.focus
    }
}

/// Builds [`FormPanel`]s and keeps a log of requests.
#[derive(Debug, Clone, Default)]
pub struct FormPanelBuilder {
    requested: Vec<PathIndex>,
}

impl FormPanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of all panels requested so far, in order.
    pub fn requested(&self) -> &[PathIndex] {
        &self.requested
    }
}

impl PanelBuilder for FormPanelBuilder {
    fn add_path_ui(&mut self, request: &PathUiRequest) -> Box<dyn PathPanel> {
        log::debug!(
            "Building panel for path {} ({}, {} points)",
            request.index,
            request.kind,
            request.points.len()
        );
        self.requested.push(request.index);
        Box::new(FormPanel::new(request.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_keys() {
        assert_eq!(Control::PointInput { point: 2, axis: Axis::Y }.to_string(), "2-y");
        assert_eq!(Control::FontSize.to_string(), "size");
        assert_eq!(Control::text_editor(TextEditor::Multiline).to_string(), "textContentFixed");
    }

    #[test]
    fn test_form_panel_values() {
        let mut panel = FormPanel::new(0);
        assert!(panel.value(Control::FontSize).is_none());
        panel.set_value(Control::FontSize, "24".to_string());
        assert_eq!(panel.value(Control::FontSize), Some("24"));
        assert!(!panel.is_active(Control::FocusButton(0)));
        panel.set_active(Control::FocusButton(0), true);
        assert!(panel.is_active(Control::FocusButton(0)));
    }

    #[test]
    fn test_form_panel_focus() {
        let mut panel = FormPanel::new(0);
        panel.focus(Control::TextContentFixed, 5);
        panel.blur(Control::TextContent);
        assert_eq!(panel.focused(), Some((Control::TextContentFixed, 5)));
        panel.blur(Control::TextContentFixed);
        assert!(panel.focused().is_none());
    }

    #[test]
    fn test_builder_records_requests() {
        let mut builder = FormPanelBuilder::new();
        let request = PathUiRequest {
            index: 4,
            points: CurveKind::Cubic.point_bases().to_vec(),
            color: Color::from_rgba8(255, 255, 255, 255),
            kind: CurveKind::Cubic,
        };
        let panel = builder.add_path_ui(&request);
        assert!(panel.focused().is_none());
        assert_eq!(builder.requested(), &[4]);
    }
}
