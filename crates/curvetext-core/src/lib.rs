//! curvetext Core Library
//!
//! Editing model for curved text: control points, curve geometry, text bound
//! to a path, pointer drags and the canvas that holds everything. Rendering
//! goes through the [`Surface`] trait; the bundled [`SvgSurface`] keeps an
//! in-memory SVG tree.

pub mod canvas;
pub mod color;
pub mod config;
pub mod drag;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod panel;
pub mod path;
pub mod points;
pub mod surface;
pub mod text;

pub use canvas::{CanvasInput, CanvasManager, CropPlan, ResizeHandle, Viewport};
pub use config::EditorConfig;
pub use drag::{DragController, DragStep};
pub use editor::{Editor, HitTarget};
pub use error::{EditorError, EditorResult};
pub use geometry::CurveKind;
pub use input::{ClickTracker, Modifiers, MouseButton, PointerEvent};
pub use panel::{
    Control, FormPanel, FormPanelBuilder, PanelBuilder, PanelInput, PathPanel, PathUiRequest,
};
pub use path::{EditState, PathController, PathHit, PathIndex};
pub use points::{Axis, PointStore};
pub use surface::{ElementId, Surface, SvgSurface};
pub use text::{StyleDeclaration, TextEditor, TextRun};
