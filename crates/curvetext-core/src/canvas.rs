//! Canvas size management: clamped resizes, resize handles and crop.

use crate::drag::DragController;
use crate::error::EditorResult;
use crate::input::MouseButton;
use crate::points::Axis;
use crate::surface::Surface;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed canvas dimension.
pub const MIN_CANVAS_SIZE: f64 = 50.0;
/// Space the page keeps around the canvas.
pub const VIEWPORT_MARGIN: f64 = 48.0;
/// Container padding subtracted from a cropped size.
pub const CROP_PADDING: f64 = 24.0;
/// Width of the grab zones along the canvas edges.
pub const HANDLE_SIZE: f64 = 12.0;

/// Host window dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Width of the page scrollbar, taken off both maxima.
    pub scrollbar: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scrollbar: 0.0,
        }
    }
}

impl Viewport {
    /// Largest canvas that fits.
    pub fn max_canvas_size(&self) -> Size {
        Size::new(
            self.width - VIEWPORT_MARGIN - self.scrollbar,
            self.height - VIEWPORT_MARGIN - self.scrollbar,
        )
    }
}

/// Drag handle on the canvas border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    /// Bottom edge: height only.
    Bottom,
    /// Right edge: width only.
    Right,
    /// Corner: both dimensions.
    BottomRight,
}

/// User action on the canvas controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasInput {
    /// Raw text typed into the width field.
    Width(String),
    /// Raw text typed into the height field.
    Height(String),
    Crop,
    Reset,
}

/// Outcome of fitting the canvas to content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    /// Translation every path receives.
    pub offset: Vec2,
    /// New canvas size, before clamping.
    pub size: Size,
}

/// Owns the canvas size and the resize interaction.
#[derive(Debug, Clone)]
pub struct CanvasManager {
    size: Size,
    default_size: Size,
    viewport: Viewport,
    drag: DragController<ResizeHandle>,
    /// Values shown in the width and height fields.
    inputs: (String, String),
}

/// Leading integer of a numeric field, like a browser's `parseInt`:
/// `"300px"` is 300, `"1e3"` is 1, `"px"` has none.
fn parse_int(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let sign = usize::from(trimmed.starts_with(['+', '-']));
    let end = trimmed[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |i| i + sign);
    if end == sign {
        return None;
    }
    trimmed[..end].parse().ok()
}

impl CanvasManager {
    pub fn new(default_size: Size, viewport: Viewport) -> Self {
        Self {
            size: default_size,
            default_size,
            viewport,
            drag: DragController::new(),
            inputs: (default_size.width.to_string(), default_size.height.to_string()),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Width and height fields as displayed.
    pub fn size_inputs(&self) -> (&str, &str) {
        (&self.inputs.0, &self.inputs.1)
    }

    pub fn is_resizing(&self) -> bool {
        self.drag.is_active()
    }

    /// Clamp a requested size to `[MIN_CANVAS_SIZE, viewport max]`, rounded.
    pub fn clamp(&self, width: f64, height: f64) -> Size {
        let max = self.viewport.max_canvas_size();
        Size::new(
            width.round().max(MIN_CANVAS_SIZE).min(max.width),
            height.round().max(MIN_CANVAS_SIZE).min(max.height),
        )
    }

    /// Apply a clamped size to the canvas root. Width, height and view box
    /// are written together.
    pub fn resize(&mut self, width: f64, height: f64, surface: &mut dyn Surface) -> EditorResult<Size> {
        let size = self.clamp(width.trunc(), height.trunc());
        let root = surface.root();
        surface.set_attribute(root, "width", &size.width.to_string())?;
        surface.set_attribute(root, "height", &size.height.to_string())?;
        surface.set_attribute(root, "viewBox", &format!("0 0 {} {}", size.width, size.height))?;
        self.size = size;
        Ok(size)
    }

    /// Back to the configured default size.
    pub fn reset(&mut self, surface: &mut dyn Surface) -> EditorResult<Size> {
        let size = self.resize(self.default_size.width, self.default_size.height, surface)?;
        self.refresh_inputs();
        log::info!("Canvas reset to {}x{}", size.width, size.height);
        Ok(size)
    }

    fn refresh_inputs(&mut self) {
        self.inputs = (self.size.width.to_string(), self.size.height.to_string());
    }

    /// Text typed into one size field; the other dimension stays.
    pub fn input_size(&mut self, axis: Axis, raw: &str, surface: &mut dyn Surface) -> EditorResult<()> {
        match axis {
            Axis::X => self.inputs.0 = raw.to_string(),
            Axis::Y => self.inputs.1 = raw.to_string(),
        }
        let Some(value) = parse_int(raw) else {
            log::warn!("Ignoring canvas {} {:?}", axis.name(), raw);
            return Ok(());
        };
        let (width, height) = match axis {
            Axis::X => (value, self.size.height),
            Axis::Y => (self.size.width, value),
        };
        self.resize(width, height, surface)?;
        Ok(())
    }

    /// Which handle, if any, is at `position` (client coordinates).
    pub fn handle_at(&self, position: Point, origin: Point) -> Option<ResizeHandle> {
        let canvas = Rect::from_origin_size(origin, self.size);
        let right = position.x >= canvas.x1 && position.x <= canvas.x1 + HANDLE_SIZE;
        let bottom = position.y >= canvas.y1 && position.y <= canvas.y1 + HANDLE_SIZE;
        let within_x = position.x >= canvas.x0 && position.x < canvas.x1;
        let within_y = position.y >= canvas.y0 && position.y < canvas.y1;
        match (right, bottom) {
            (true, true) => Some(ResizeHandle::BottomRight),
            (true, false) if within_y => Some(ResizeHandle::Right),
            (false, true) if within_x => Some(ResizeHandle::Bottom),
            _ => None,
        }
    }

    /// Pointer-down on a handle. Only the primary button starts a resize.
    pub fn begin_resize(&mut self, handle: ResizeHandle, position: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        self.drag.begin(handle, position);
        log::debug!("Canvas resize started ({:?})", handle);
        true
    }

    /// Pointer move while resizing: the canvas corner follows the pointer on
    /// the axes the handle controls.
    pub fn drag_to(&mut self, position: Point, surface: &mut dyn Surface) -> EditorResult<bool> {
        let Some(step) = self.drag.update(position) else {
            return Ok(false);
        };
        let wanted = position - surface.origin();
        let (width, height) = match step.target {
            ResizeHandle::Bottom => (self.size.width, wanted.y),
            ResizeHandle::Right => (wanted.x, self.size.height),
            ResizeHandle::BottomRight => (wanted.x, wanted.y),
        };
        self.resize(width, height, surface)?;
        self.refresh_inputs();
        Ok(true)
    }

    /// Global pointer-up.
    pub fn end_resize(&mut self) -> bool {
        self.drag.end().is_some()
    }

    /// Offset and size that fit `content` (client coordinates) to a canvas
    /// whose top-left corner is at `origin`.
    pub fn plan_crop(content: Rect, origin: Point) -> CropPlan {
        let offset = (origin - content.origin()).round();
        CropPlan {
            offset,
            size: Size::new(
                (content.x1 + offset.x - CROP_PADDING).round(),
                (content.y1 + offset.y - CROP_PADDING).round(),
            ),
        }
    }

    /// Set the size from a crop plan and refresh the size fields.
    pub fn apply_crop(&mut self, plan: &CropPlan, surface: &mut dyn Surface) -> EditorResult<Size> {
        let size = self.resize(plan.size.width, plan.size.height, surface)?;
        self.refresh_inputs();
        log::info!("Canvas cropped to {}x{}", size.width, size.height);
        Ok(size)
    }
}
