//! Editor: the path registry, the canvas and event dispatch.

use crate::canvas::{CanvasInput, CanvasManager, CropPlan, ResizeHandle};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::geometry::CurveKind;
use crate::input::{ClickTracker, PointerEvent};
use crate::panel::{PanelBuilder, PanelInput};
use crate::path::{PathController, PathHit, PathIndex};
use crate::points::Axis;
use crate::surface::Surface;
use crate::text::TextEditor;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// What lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTarget {
    PointMarker { path: PathIndex, point: usize },
    Path(PathIndex),
    Text(PathIndex),
    ResizeHandle(ResizeHandle),
    /// Empty canvas area.
    Canvas,
    Outside,
}

impl HitTarget {
    fn path(self) -> Option<PathIndex> {
        match self {
            HitTarget::PointMarker { path, .. } | HitTarget::Path(path) | HitTarget::Text(path) => {
                Some(path)
            }
            _ => None,
        }
    }
}

pub struct Editor<S: Surface> {
    config: EditorConfig,
    surface: S,
    canvas: CanvasManager,
    paths: Vec<PathController>,
    next_index: PathIndex,
    panels: Box<dyn PanelBuilder>,
    clicks: ClickTracker,
}

impl<S: Surface> Editor<S> {
    /// Create an editor drawing on `surface`. The canvas starts at the
    /// configured default size.
    pub fn new(config: EditorConfig, mut surface: S, panels: Box<dyn PanelBuilder>) -> EditorResult<Self> {
        let mut canvas = CanvasManager::new(
            Size::new(config.canvas_width, config.canvas_height),
            config.viewport,
        );
        canvas.reset(&mut surface)?;
        let root = surface.root();
        surface.set_style(root, "backgroundColor", &config.background)?;
        Ok(Self {
            config,
            surface,
            canvas,
            paths: Vec::new(),
            next_index: 0,
            panels,
            clicks: ClickTracker::new(),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn canvas(&self) -> &CanvasManager {
        &self.canvas
    }

    pub fn paths(&self) -> &[PathController] {
        &self.paths
    }

    pub fn path(&self, index: PathIndex) -> EditorResult<&PathController> {
        self.paths
            .iter()
            .find(|p| p.index() == index)
            .ok_or(EditorError::PathNotFound(index))
    }

    fn path_mut(&mut self, index: PathIndex) -> EditorResult<&mut PathController> {
        self.paths
            .iter_mut()
            .find(|p| p.index() == index)
            .ok_or(EditorError::PathNotFound(index))
    }

    /// Add a path of `kind`; returns its index.
    pub fn add_path(&mut self, kind: CurveKind) -> EditorResult<PathIndex> {
        let index = self.next_index;
        let path = PathController::new(
            index,
            kind,
            &self.config,
            &mut self.surface,
            self.panels.as_mut(),
        )?;
        self.next_index += 1;
        self.paths.push(path);
        Ok(index)
    }

    /// Add a path from a kind name such as `"cubic"`.
    pub fn add_path_named(&mut self, kind: &str) -> EditorResult<PathIndex> {
        self.add_path(kind.parse()?)
    }

    pub fn remove_path(&mut self, index: PathIndex) -> EditorResult<()> {
        let position = self
            .paths
            .iter()
            .position(|p| p.index() == index)
            .ok_or(EditorError::PathNotFound(index))?;
        let path = self.paths.remove(position);
        path.remove(&mut self.surface)
    }

    /// Translate every live path.
    pub fn move_all_paths(&mut self, delta: Vec2) -> EditorResult<()> {
        for path in &mut self.paths {
            path.translate(delta, &mut self.surface)?;
        }
        Ok(())
    }

    /// Topmost thing under `position` (client coordinates).
    pub fn hit_test(&self, position: Point) -> HitTarget {
        let origin = self.surface.origin();
        for path in self.paths.iter().rev() {
            match path.hit_test(position, self.config.hit_tolerance, &self.surface) {
                Some(PathHit::Marker(point)) => {
                    return HitTarget::PointMarker {
                        path: path.index(),
                        point,
                    };
                }
                Some(PathHit::Text) => return HitTarget::Text(path.index()),
                Some(PathHit::Curve) => return HitTarget::Path(path.index()),
                None => {}
            }
        }
        if let Some(handle) = self.canvas.handle_at(position, origin) {
            return HitTarget::ResizeHandle(handle);
        }
        if Rect::from_origin_size(origin, self.canvas.size()).contains(position) {
            HitTarget::Canvas
        } else {
            HitTarget::Outside
        }
    }

    /// Dispatch a pointer event. `target` overrides hit testing when the host
    /// already knows what was hit.
    ///
    /// Returns whether the event was consumed.
    pub fn handle_pointer(&mut self, event: PointerEvent, target: Option<HitTarget>) -> EditorResult<bool> {
        let target = target.unwrap_or_else(|| self.hit_test(event.position()));
        match event {
            PointerEvent::Down { position, button } => {
                let double = self.clicks.press(position, button);
                match target {
                    HitTarget::PointMarker { path, point } => {
                        self.path_mut(path)?.grab_point(point, position)?;
                        Ok(true)
                    }
                    HitTarget::Text(index) if double => {
                        self.path_mut(index)?
                            .focus_text_editor(TextEditor::Multiline);
                        Ok(true)
                    }
                    HitTarget::Path(index) | HitTarget::Text(index) => {
                        let surface = &mut self.surface;
                        let path = self
                            .paths
                            .iter_mut()
                            .find(|p| p.index() == index)
                            .ok_or(EditorError::PathNotFound(index))?;
                        path.grab_path(position, surface)?;
                        Ok(true)
                    }
                    HitTarget::ResizeHandle(handle) => {
                        Ok(self.canvas.begin_resize(handle, position, button))
                    }
                    HitTarget::Canvas | HitTarget::Outside => Ok(false),
                }
            }
            PointerEvent::Move { position } => {
                let mut changed = false;
                for path in &mut self.paths {
                    changed |= path.pointer_moved(position, &mut self.surface)?;
                }
                changed |= self.canvas.drag_to(position, &mut self.surface)?;
                Ok(changed)
            }
            PointerEvent::Up { .. } => {
                let mut ended = false;
                for path in &mut self.paths {
                    ended |= path.release(&mut self.surface)?;
                }
                ended |= self.canvas.end_resize();
                Ok(ended)
            }
            PointerEvent::Scroll {
                delta, modifiers, ..
            } => {
                if let HitTarget::Path(index) | HitTarget::Text(index) = target {
                    let up = delta.y > 0.0;
                    let surface = &mut self.surface;
                    let path = self
                        .paths
                        .iter_mut()
                        .find(|p| p.index() == index)
                        .ok_or(EditorError::PathNotFound(index))?;
                    path.scroll(up, modifiers, surface)?;
                }
                // Nothing over the canvas scrolls the page.
                Ok(target.path().is_some() || target == HitTarget::Canvas)
            }
        }
    }

    /// Dispatch a panel edit to path `index`.
    pub fn handle_panel_input(&mut self, index: PathIndex, input: PanelInput) -> EditorResult<()> {
        let surface = &mut self.surface;
        let path = self
            .paths
            .iter_mut()
            .find(|p| p.index() == index)
            .ok_or(EditorError::PathNotFound(index))?;
        match input {
            PanelInput::PointField { point, axis, raw } => {
                path.set_point_field(point, axis, &raw, surface)
            }
            PanelInput::FontSize(raw) => path.set_font_size(&raw, surface),
            PanelInput::TextOffset(raw) => path.set_offset(&raw, surface),
            PanelInput::Text { editor, value } => path.edit_text(editor, &value, surface),
            PanelInput::Style(raw) => path.apply_style(&raw, surface),
            PanelInput::FocusButton(point) => path.focus_button(point, surface),
            PanelInput::ResetPath => path.reset_path(surface),
            PanelInput::ToggleVisibility => path.toggle_visibility(surface),
            PanelInput::EditorFocused(editor) => {
                path.focus_text_editor(editor);
                Ok(())
            }
            PanelInput::EditorBlurred(editor) => {
                path.blur_text_editor(editor);
                Ok(())
            }
        }
    }

    pub fn handle_canvas_input(&mut self, input: CanvasInput) -> EditorResult<()> {
        match input {
            CanvasInput::Width(raw) => self.canvas.input_size(Axis::X, &raw, &mut self.surface),
            CanvasInput::Height(raw) => self.canvas.input_size(Axis::Y, &raw, &mut self.surface),
            CanvasInput::Crop => self.crop_to_content().map(|_| ()),
            CanvasInput::Reset => self.canvas.reset(&mut self.surface).map(|_| ()),
        }
    }

    /// Bounds of all rendered text, client coordinates.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.paths
            .iter()
            .filter_map(|p| self.surface.bounding_box(p.text_element()))
            .reduce(|a, b| a.union(b))
    }

    /// Move all paths so the text starts at the canvas corner and shrink the
    /// canvas around it. Does nothing when no text is rendered.
    pub fn crop_to_content(&mut self) -> EditorResult<Option<CropPlan>> {
        let Some(content) = self.content_bounds() else {
            log::warn!("Nothing to crop to");
            return Ok(None);
        };
        let plan = CanvasManager::plan_crop(content, self.surface.origin());
        log::debug!("Crop offset {:?}, size {:?}", plan.offset, plan.size);
        self.move_all_paths(plan.offset)?;
        self.canvas.apply_crop(&plan, &mut self.surface)?;
        Ok(Some(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Modifiers, MouseButton};
    use crate::panel::{Control, FormPanelBuilder};
    use crate::path::EditState;
    use crate::surface::SvgSurface;

    fn editor() -> Editor<SvgSurface> {
        Editor::new(
            EditorConfig::default(),
            SvgSurface::new(Point::new(24.0, 24.0)),
            Box::new(FormPanelBuilder::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_indices_are_monotonic() {
        let mut editor = editor();
        let a = editor.add_path(CurveKind::Quadratic).unwrap();
        let b = editor.add_path(CurveKind::Cubic).unwrap();
        editor.remove_path(a).unwrap();
        let c = editor.add_path(CurveKind::Ellipsis).unwrap();
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(editor.paths().len(), 2);
        assert_eq!(editor.remove_path(a), Err(EditorError::PathNotFound(a)));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let mut editor = editor();
        assert_eq!(
            editor.add_path_named("spiral"),
            Err(EditorError::UnimplementedGeometry("spiral".to_string()))
        );
        assert!(editor.paths().is_empty());
        assert_eq!(editor.add_path_named("cubic"), Ok(0));
    }

    #[test]
    fn test_marker_drag_through_events() {
        let mut editor = editor();
        let index = editor.add_path(CurveKind::Cubic).unwrap();
        let marker = Point::new(340.0 + 24.0, 100.0 + 24.0);
        assert_eq!(
            editor.hit_test(marker),
            HitTarget::PointMarker { path: index, point: 2 }
        );

        let down = PointerEvent::Down {
            position: marker,
            button: MouseButton::Left,
        };
        assert!(editor.handle_pointer(down, None).unwrap());
        let target = Point::new(324.0, 324.0);
        assert!(editor.handle_pointer(PointerEvent::Move { position: target }, None).unwrap());
        assert!(editor.handle_pointer(
            PointerEvent::Up {
                position: target,
                button: MouseButton::Left
            },
            None
        )
        .unwrap());

        let path = editor.path(index).unwrap();
        assert_eq!(path.points()[2], Point::new(300.0, 300.0));
        assert_eq!(path.edit_state(), EditState::Idle);
    }

    #[test]
    fn test_scroll_over_text_changes_offset() {
        let mut editor = editor();
        let index = editor.add_path(CurveKind::Quadratic).unwrap();
        let scroll = PointerEvent::Scroll {
            position: Point::ZERO,
            delta: Vec2::new(0.0, 120.0),
            modifiers: Modifiers::default(),
        };
        assert!(editor.handle_pointer(scroll, Some(HitTarget::Text(index))).unwrap());
        assert!((editor.path(index).unwrap().text().offset - 5.0).abs() < f64::EPSILON);

        // Over empty canvas: consumed, nothing changes.
        assert!(editor.handle_pointer(scroll, Some(HitTarget::Canvas)).unwrap());
        assert!(!editor.handle_pointer(scroll, Some(HitTarget::Outside)).unwrap());
        assert!((editor.path(index).unwrap().text().offset - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_double_click_on_text_focuses_multiline() {
        let mut editor = editor();
        let index = editor.add_path(CurveKind::Quadratic).unwrap();
        let down = PointerEvent::Down {
            position: Point::new(211.0, 211.0),
            button: MouseButton::Left,
        };
        let up = PointerEvent::Up {
            position: Point::new(211.0, 211.0),
            button: MouseButton::Left,
        };
        let target = Some(HitTarget::Text(index));
        editor.handle_pointer(down, target).unwrap();
        editor.handle_pointer(up, target).unwrap();
        editor.handle_pointer(down, target).unwrap();
        let panel = editor.path(index).unwrap().panel();
        assert!(matches!(panel.focused(), Some((Control::TextContentFixed, _))));
    }

    #[test]
    fn test_panel_input_dispatch() {
        let mut editor = editor();
        let index = editor.add_path(CurveKind::Quadratic).unwrap();
        editor
            .handle_panel_input(
                index,
                PanelInput::PointField {
                    point: 0,
                    axis: Axis::Y,
                    raw: "10".to_string(),
                },
            )
            .unwrap();
        assert_eq!(editor.path(index).unwrap().points()[0], Point::new(100.0, 10.0));

        editor
            .handle_panel_input(index, PanelInput::Style("color: red; font-size: 40px".to_string()))
            .unwrap();
        let text = editor.path(index).unwrap().text();
        assert_eq!(text.declarations().len(), 1);
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);

        assert_eq!(
            editor.handle_panel_input(9, PanelInput::ResetPath),
            Err(EditorError::PathNotFound(9))
        );
    }

    #[test]
    fn test_crop_moves_every_path() {
        let mut editor = Editor::new(
            EditorConfig::default(),
            SvgSurface::new(Point::new(100.0, 50.0)),
            Box::new(FormPanelBuilder::new()),
        )
        .unwrap();
        let a = editor.add_path(CurveKind::Quadratic).unwrap();
        let b = editor.add_path(CurveKind::Cubic).unwrap();
        editor
            .handle_pointer(
                PointerEvent::Down {
                    position: Point::ZERO,
                    button: MouseButton::Left,
                },
                Some(HitTarget::Path(b)),
            )
            .unwrap();
        editor
            .handle_pointer(PointerEvent::Move { position: Point::new(30.0, 40.0) }, None)
            .unwrap();
        editor
            .handle_pointer(
                PointerEvent::Up {
                    position: Point::new(30.0, 40.0),
                    button: MouseButton::Left,
                },
                None,
            )
            .unwrap();

        let before_a = editor.path(a).unwrap().points().to_vec();
        let before_b = editor.path(b).unwrap().points().to_vec();
        let content = editor.content_bounds().unwrap();
        let expected = (Point::new(100.0, 50.0) - content.origin()).round();

        let plan = editor.crop_to_content().unwrap().unwrap();
        assert_eq!(plan.offset, expected);
        for (index, before) in [(a, before_a), (b, before_b)] {
            let after = editor.path(index).unwrap().points();
            for (p, q) in before.iter().zip(after) {
                assert_eq!(*p + plan.offset, *q);
            }
        }

        // Text now starts at the canvas corner.
        let content = editor.content_bounds().unwrap();
        assert!((content.x0 - 100.0).abs() <= 1.0);
        assert!((content.y0 - 50.0).abs() <= 1.0);
        let root = editor.surface().root();
        let width = editor.canvas().size().width.to_string();
        assert_eq!(editor.surface().attribute(root, "width"), Some(width.as_str()));
        assert_eq!(editor.canvas().size_inputs().0, width);
    }

    #[test]
    fn test_crop_without_text_is_noop() {
        let mut editor = editor();
        assert_eq!(editor.crop_to_content(), Ok(None));
        let index = editor.add_path(CurveKind::Quadratic).unwrap();
        editor
            .handle_panel_input(
                index,
                PanelInput::Text {
                    editor: TextEditor::Inline,
                    value: String::new(),
                },
            )
            .unwrap();
        assert_eq!(editor.crop_to_content(), Ok(None));
        assert_eq!(editor.canvas().size(), Size::new(500.0, 500.0));
    }

    #[test]
    fn test_huge_coordinate_is_not_fatal() {
        let mut editor = editor();
        let index = editor.add_path(CurveKind::Cubic).unwrap();
        editor
            .handle_panel_input(
                index,
                PanelInput::PointField {
                    point: 1,
                    axis: Axis::Y,
                    raw: "1e200".to_string(),
                },
            )
            .unwrap();
        assert!((editor.paths()[0].points()[1].y - 1e200).abs() < f64::EPSILON);

        assert_eq!(editor.hit_test(Point::new(600.0, 600.0)), HitTarget::Outside);
        assert!(
            editor
                .handle_pointer(
                    PointerEvent::Down {
                        position: Point::new(600.0, 600.0),
                        button: MouseButton::Left,
                    },
                    None,
                )
                .is_ok()
        );
        assert_eq!(editor.crop_to_content(), Ok(None));
    }

    #[test]
    fn test_canvas_inputs() {
        let mut editor = editor();
        editor
            .handle_canvas_input(CanvasInput::Width("10".to_string()))
            .unwrap();
        assert_eq!(editor.canvas().size(), Size::new(50.0, 500.0));
        editor.handle_canvas_input(CanvasInput::Reset).unwrap();
        assert_eq!(editor.canvas().size(), Size::new(500.0, 500.0));
    }

    #[test]
    fn test_hit_test_canvas_and_outside() {
        let editor = editor();
        assert_eq!(editor.hit_test(Point::new(30.0, 30.0)), HitTarget::Canvas);
        assert_eq!(editor.hit_test(Point::new(5.0, 5.0)), HitTarget::Outside);
        assert_eq!(
            editor.hit_test(Point::new(530.0, 200.0)),
            HitTarget::ResizeHandle(ResizeHandle::Right)
        );
    }
}
