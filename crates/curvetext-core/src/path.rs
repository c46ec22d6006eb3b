//! Path controller: one curve with its markers, text and panel.
//!
//! State lives in [`PointStore`] and [`TextRun`]. After every operation the
//! surface elements (curve data, markers, labels) and the panel point inputs
//! are rewritten from that state, so the three never diverge.

use crate::color::{contrasting_color, string_to_color, to_css};
use crate::config::EditorConfig;
use crate::drag::DragController;
use crate::error::{EditorError, EditorResult};
use crate::geometry::{self, CurveKind};
use crate::input::Modifiers;
use crate::panel::{Control, PanelBuilder, PathPanel, PathUiRequest};
use crate::points::{Axis, PointStore};
use crate::surface::{ElementId, Surface};
use crate::text::{TextEditor, TextRun, parse_number};
use kurbo::{ParamCurveNearest, Point, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable path identifier, unique among live paths.
pub type PathIndex = u32;

const GROUP_CLASS: &str = "svg__path-and-text-group";
const GRABBING_CLASS: &str = "svg__path-and-text-group--grabbing";
const MARKER_CLASS: &str = "svg__bezier-circle";
const LABEL_CLASS: &str = "svg__bezier-circle-number";
const MARKER_OPACITY: &str = "0.7";
const LABEL_FONT_SIZE: &str = "10px";
/// Label position relative to its marker centre.
const LABEL_OFFSET: Vec2 = Vec2::new(-3.0, 4.0);
const TEXT_FILL: &str = "#fff";
const SHOW_LABEL: &str = "Show Path";
const HIDE_LABEL: &str = "Hide Path";
const NEAREST_ACCURACY: f64 = 0.01;

/// Interaction state of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditState {
    Idle,
    DraggingPoint(usize),
    DraggingPath,
}

/// What part of a path lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathHit {
    Marker(usize),
    Text,
    Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathDrag {
    Point(usize),
    Path,
}

/// Who changed the points. Point inputs are not rewritten while the user is
/// typing in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateSource {
    PointInput,
    Other,
}

#[derive(Debug, Clone)]
struct PathElements {
    group: ElementId,
    path: ElementId,
    text: ElementId,
    text_path: ElementId,
    markers: Vec<ElementId>,
    labels: Vec<ElementId>,
    path_id: String,
}

pub struct PathController {
    index: PathIndex,
    points: PointStore,
    color: Color,
    text: TextRun,
    visible: bool,
    marker_radius: f64,
    drag: DragController<PathDrag>,
    elements: PathElements,
    panel: Box<dyn PathPanel>,
    first_reset: bool,
}

impl std::fmt::Debug for PathController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathController")
            .field("index", &self.index)
            .field("kind", &self.points.kind())
            .field("points", &self.points.as_slice())
            .field("visible", &self.visible)
            .field("state", &self.edit_state())
            .finish()
    }
}

impl PathController {
    /// Create a path, draw it on `surface` and request its panel.
    pub fn new(
        index: PathIndex,
        kind: CurveKind,
        config: &EditorConfig,
        surface: &mut dyn Surface,
        panels: &mut dyn PanelBuilder,
    ) -> EditorResult<Self> {
        let color = contrasting_color(string_to_color(&config.background), true);
        let elements = create_elements(index, color, surface)?;
        let points = PointStore::new(kind);

        let panel = panels.add_path_ui(&PathUiRequest {
            index,
            points: points.as_slice().to_vec(),
            color,
            kind,
        });

        let mut controller = Self {
            index,
            points,
            color,
            text: TextRun::new(config.initial_text.clone(), config.font_size),
            visible: true,
            marker_radius: config.marker_radius,
            drag: DragController::new(),
            elements,
            panel,
            first_reset: true,
        };

        // Runs before the markers exist; the guard keeps it off the surface.
        controller.reset_path(surface)?;
        controller.create_markers(surface)?;
        controller.sync_points(UpdateSource::Other, surface)?;
        controller.render_text(surface)?;
        controller.init_panel();

        log::info!("Created {} path {}", kind, index);
        Ok(controller)
    }

    pub fn index(&self) -> PathIndex {
        self.index
    }

    pub fn kind(&self) -> CurveKind {
        self.points.kind()
    }

    pub fn points(&self) -> &[Point] {
        self.points.as_slice()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn text(&self) -> &TextRun {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn panel(&self) -> &dyn PathPanel {
        self.panel.as_ref()
    }

    /// The text element; its bounds are what a crop fits the canvas to.
    pub fn text_element(&self) -> ElementId {
        self.elements.text
    }

    pub fn group_element(&self) -> ElementId {
        self.elements.group
    }

    /// Id of the curve element referenced by the text path.
    pub fn path_id(&self) -> &str {
        &self.elements.path_id
    }

    /// Current geometry description.
    pub fn description(&self) -> String {
        geometry::describe(self.points.as_slice(), self.points.kind())
    }

    pub fn edit_state(&self) -> EditState {
        match self.drag.target() {
            None => EditState::Idle,
            Some(PathDrag::Point(i)) => EditState::DraggingPoint(i),
            Some(PathDrag::Path) => EditState::DraggingPath,
        }
    }

    fn check_point(&self, index: usize) -> EditorResult<()> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(EditorError::PointOutOfRange {
                index,
                arity: self.points.len(),
            })
        }
    }

    /// Restore the canonical points of this kind.
    pub fn reset_path(&mut self, surface: &mut dyn Surface) -> EditorResult<()> {
        self.points.reset();
        if self.first_reset {
            self.first_reset = false;
            return Ok(());
        }
        log::debug!("Reset path {}", self.index);
        self.sync_points(UpdateSource::Other, surface)
    }

    /// Pointer-down on point marker `point`.
    pub fn grab_point(&mut self, point: usize, position: Point) -> EditorResult<()> {
        self.check_point(point)?;
        self.drag.begin(PathDrag::Point(point), position);
        log::debug!("Path {}: dragging point {}", self.index, point);
        Ok(())
    }

    /// Pointer-down on the path group.
    pub fn grab_path(&mut self, position: Point, surface: &mut dyn Surface) -> EditorResult<()> {
        self.drag.begin(PathDrag::Path, position);
        surface.set_class(self.elements.group, GRABBING_CLASS, true)?;
        log::debug!("Path {}: dragging path", self.index);
        Ok(())
    }

    /// Feed a pointer move (client coordinates). Returns whether the path
    /// changed.
    pub fn pointer_moved(
        &mut self,
        position: Point,
        surface: &mut dyn Surface,
    ) -> EditorResult<bool> {
        let Some(step) = self.drag.update(position) else {
            return Ok(false);
        };
        match step.target {
            PathDrag::Point(i) => {
                let local = position - surface.origin().to_vec2();
                self.points.set(i, local.round())?;
                self.sync_points(UpdateSource::Other, surface)?;
            }
            PathDrag::Path => {
                let delta = step.delta.round();
                self.points.translate(delta);
                self.sync_points(UpdateSource::Other, surface)?;
            }
        }
        Ok(true)
    }

    /// Global pointer-up: end any drag and clear focus-button highlights.
    pub fn release(&mut self, surface: &mut dyn Surface) -> EditorResult<bool> {
        let ended = self.drag.end();
        if ended == Some(PathDrag::Path) {
            surface.set_class(self.elements.group, GRABBING_CLASS, false)?;
        }
        self.clear_focus_buttons();
        Ok(ended.is_some())
    }

    fn clear_focus_buttons(&mut self) {
        for i in 0..self.points.len() {
            self.panel.set_active(Control::FocusButton(i), false);
        }
    }

    /// Focus button for `point`: the point follows the pointer until the next
    /// pointer-up. Pressing the button of the focused point unfocuses it.
    pub fn focus_button(&mut self, point: usize, surface: &mut dyn Surface) -> EditorResult<()> {
        self.check_point(point)?;
        self.clear_focus_buttons();
        match self.drag.target() {
            Some(PathDrag::Point(i)) if i == point => {
                self.drag.end();
                return Ok(());
            }
            Some(PathDrag::Path) => {
                surface.set_class(self.elements.group, GRABBING_CLASS, false)?;
            }
            _ => {}
        }
        self.panel.set_active(Control::FocusButton(point), true);
        // Point drags are absolute, the reference position is unused.
        self.drag.begin(PathDrag::Point(point), Point::ZERO);
        Ok(())
    }

    /// Numeric edit of one coordinate. Malformed input becomes `NaN`.
    pub fn set_point_field(
        &mut self,
        point: usize,
        axis: Axis,
        raw: &str,
        surface: &mut dyn Surface,
    ) -> EditorResult<()> {
        let value = parse_number(raw);
        if !value.is_finite() {
            log::warn!(
                "Path {}: point {} {} set to non-numeric value {:?}",
                self.index,
                point,
                axis.name(),
                raw
            );
        }
        self.points.set_axis(point, axis, value)?;
        self.panel
            .set_value(Control::PointInput { point, axis }, raw.to_string());
        self.sync_points(UpdateSource::PointInput, surface)
    }

    /// Rigid translation, used by path drags and canvas crops.
    pub fn translate(&mut self, delta: Vec2, surface: &mut dyn Surface) -> EditorResult<()> {
        self.points.translate(delta);
        self.sync_points(UpdateSource::Other, surface)
    }

    /// Font-size field edit. The typed text is kept in the field even when it
    /// is rejected.
    pub fn set_font_size(&mut self, raw: &str, surface: &mut dyn Surface) -> EditorResult<()> {
        self.panel.set_value(Control::FontSize, raw.to_string());
        let size = parse_number(raw);
        if !size.is_finite() || size < 0.0 {
            log::warn!("Path {}: ignoring font size {:?}", self.index, raw);
            return Ok(());
        }
        self.text.font_size = size;
        self.render_text(surface)
    }

    pub fn set_offset(&mut self, raw: &str, surface: &mut dyn Surface) -> EditorResult<()> {
        self.panel.set_value(Control::TextOffset, raw.to_string());
        let offset = parse_number(raw);
        if !offset.is_finite() {
            log::warn!("Path {}: ignoring text offset {:?}", self.index, raw);
            return Ok(());
        }
        self.text.offset = offset;
        self.render_text(surface)
    }

    /// Text typed into one editor; the other editor mirrors it.
    pub fn edit_text(
        &mut self,
        editor: TextEditor,
        value: &str,
        surface: &mut dyn Surface,
    ) -> EditorResult<()> {
        self.text.content = value.to_string();
        for editor in [editor, editor.other()] {
            self.panel
                .set_value(Control::text_editor(editor), value.to_string());
        }
        surface.set_text(self.elements.text_path, value)
    }

    /// A text editor gained focus. The multi-line editor gets highlighted and
    /// its caret moves to the end.
    pub fn focus_text_editor(&mut self, editor: TextEditor) {
        let control = Control::text_editor(editor);
        match editor {
            TextEditor::Multiline => {
                self.panel.set_active(control, true);
                self.panel.focus(control, self.text.content.chars().count());
            }
            TextEditor::Inline => self.panel.focus(control, 0),
        }
    }

    pub fn blur_text_editor(&mut self, editor: TextEditor) {
        let control = Control::text_editor(editor);
        if editor == TextEditor::Multiline {
            self.panel.set_active(control, false);
        }
        self.panel.blur(control);
    }

    /// Replace the free-form style. Font size is pinned and the font-size
    /// input follows it.
    pub fn apply_style(&mut self, raw: &str, surface: &mut dyn Surface) -> EditorResult<()> {
        self.text.apply_style(raw);
        self.render_text(surface)?;
        self.panel.set_value(Control::TextStyle, raw.to_string());
        self.panel
            .set_value(Control::FontSize, self.text.font_size.trunc().to_string());
        Ok(())
    }

    /// Wheel over the curve or text: font size with Ctrl, offset otherwise.
    pub fn scroll(
        &mut self,
        up: bool,
        modifiers: Modifiers,
        surface: &mut dyn Surface,
    ) -> EditorResult<()> {
        if modifiers.ctrl {
            let size = self.text.scroll_font_size(up);
            self.panel.set_value(Control::FontSize, size.to_string());
        } else {
            let offset = self.text.scroll_offset(up);
            self.panel.set_value(Control::TextOffset, offset.to_string());
        }
        self.render_text(surface)
    }

    /// Show or hide the curve and its markers. Text stays visible.
    pub fn toggle_visibility(&mut self, surface: &mut dyn Surface) -> EditorResult<()> {
        self.visible = !self.visible;
        let display = if self.visible { "inline" } else { "none" };
        let elements = &self.elements;
        for &element in std::iter::once(&elements.path)
            .chain(&elements.markers)
            .chain(&elements.labels)
        {
            surface.set_style(element, "display", display)?;
        }
        let label = if self.visible { HIDE_LABEL } else { SHOW_LABEL };
        self.panel
            .set_value(Control::ToggleVisibility, label.to_string());
        log::debug!("Path {} visible: {}", self.index, self.visible);
        Ok(())
    }

    /// What part of this path is under `position` (client coordinates).
    pub fn hit_test(&self, position: Point, tolerance: f64, surface: &dyn Surface) -> Option<PathHit> {
        let local = position - surface.origin().to_vec2();
        if self.visible {
            let marker = self
                .points
                .as_slice()
                .iter()
                .enumerate()
                .rev()
                .find(|(_, p)| (local - **p).hypot() <= self.marker_radius);
            if let Some((i, _)) = marker {
                return Some(PathHit::Marker(i));
            }
        }
        if surface
            .bounding_box(self.elements.text)
            .is_some_and(|r| r.contains(position))
        {
            return Some(PathHit::Text);
        }
        let curve = geometry::to_bez_path(self.points.as_slice(), self.points.kind());
        if self.visible && geometry::is_layout_safe(&curve) {
            let near = curve
                .segments()
                .any(|seg| seg.nearest(local, NEAREST_ACCURACY).distance_sq <= tolerance * tolerance);
            if near {
                return Some(PathHit::Curve);
            }
        }
        None
    }

    /// Drop every surface element of this path.
    pub fn remove(self, surface: &mut dyn Surface) -> EditorResult<()> {
        surface.remove(self.elements.group)?;
        log::info!("Removed path {}", self.index);
        Ok(())
    }

    fn create_markers(&mut self, surface: &mut dyn Surface) -> EditorResult<()> {
        let fill = to_css(self.color);
        let radius = self.marker_radius.to_string();
        let mut markers = Vec::with_capacity(self.points.len());
        let mut labels = Vec::with_capacity(self.points.len());
        for i in 0..self.points.len() {
            let marker = surface.create_element("circle");
            surface.set_class(marker, MARKER_CLASS, true)?;
            surface.set_attribute(marker, "data-path-circle", &i.to_string())?;
            surface.set_attribute(marker, "r", &radius)?;
            surface.set_attribute(marker, "fill", &fill)?;
            surface.set_attribute(marker, "fill-opacity", MARKER_OPACITY)?;
            markers.push(marker);

            let label = surface.create_element("text");
            surface.set_class(label, LABEL_CLASS, true)?;
            surface.set_style(label, "fontSize", LABEL_FONT_SIZE)?;
            surface.set_text(label, &i.to_string())?;
            labels.push(label);
        }
        for &element in markers.iter().chain(&labels) {
            surface.append_child(self.elements.group, element)?;
        }
        self.elements.markers = markers;
        self.elements.labels = labels;
        Ok(())
    }

    fn sync_points(&mut self, source: UpdateSource, surface: &mut dyn Surface) -> EditorResult<()> {
        surface.set_attribute(self.elements.path, "d", &self.description())?;
        for (i, p) in self.points.iter().enumerate() {
            if let Some(&marker) = self.elements.markers.get(i) {
                surface.set_attribute(marker, "cx", &p.x.to_string())?;
                surface.set_attribute(marker, "cy", &p.y.to_string())?;
            }
            if let Some(&label) = self.elements.labels.get(i) {
                let at = p + LABEL_OFFSET;
                surface.set_attribute(label, "x", &at.x.to_string())?;
                surface.set_attribute(label, "y", &at.y.to_string())?;
            }
            if source != UpdateSource::PointInput {
                self.panel
                    .set_value(Control::PointInput { point: i, axis: Axis::X }, p.x.to_string());
                self.panel
                    .set_value(Control::PointInput { point: i, axis: Axis::Y }, p.y.to_string());
            }
        }
        Ok(())
    }

    fn render_text(&mut self, surface: &mut dyn Surface) -> EditorResult<()> {
        let text = self.elements.text;
        surface.clear_style(text)?;
        for (property, value) in self.text.style_properties() {
            surface.set_style(text, &property, &value)?;
        }
        surface.set_attribute(text, "x", &self.text.offset.to_string())?;
        surface.set_text(self.elements.text_path, &self.text.content)
    }

    fn init_panel(&mut self) {
        let content = self.text.content.clone();
        self.panel
            .set_value(Control::FontSize, self.text.font_size.to_string());
        self.panel
            .set_value(Control::TextOffset, self.text.offset.to_string());
        self.panel.set_value(Control::TextContent, content.clone());
        self.panel.set_value(Control::TextContentFixed, content);
        self.panel.set_value(Control::TextStyle, String::new());
        self.panel
            .set_value(Control::ToggleVisibility, HIDE_LABEL.to_string());
    }
}

/// Group, curve and text elements. Markers are added later.
fn create_elements(
    index: PathIndex,
    color: Color,
    surface: &mut dyn Surface,
) -> EditorResult<PathElements> {
    let path_id = format!("ctg-{}", Uuid::new_v4().simple());

    let group = surface.create_element("g");
    surface.set_class(group, GROUP_CLASS, true)?;
    surface.set_attribute(group, "data-path-group", &index.to_string())?;

    let path = surface.create_element("path");
    surface.set_attribute(path, "id", &path_id)?;
    surface.set_attribute(path, "fill", "transparent")?;
    surface.set_attribute(path, "stroke", &to_css(color))?;

    let text = surface.create_element("text");
    surface.set_attribute(text, "fill", TEXT_FILL)?;
    surface.set_attribute(text, "data-text-on-path", "")?;

    let text_path = surface.create_element("textPath");
    surface.set_attribute(text_path, "href", &format!("#{}", path_id))?;

    let root = surface.root();
    surface.append_child(root, group)?;
    surface.append_child(group, path)?;
    surface.append_child(group, text)?;
    surface.append_child(text, text_path)?;

    Ok(PathElements {
        group,
        path,
        text,
        text_path,
        markers: Vec::new(),
        labels: Vec::new(),
        path_id,
    })
}
