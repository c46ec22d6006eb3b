//! Rendering surface abstraction.
//!
//! The surface is a projection of editor state: the editor writes elements,
//! attributes and styles into it and only reads back layout results
//! (bounding boxes).

mod svg;

pub use svg::SvgSurface;

use crate::error::EditorResult;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Opaque handle to an element on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Minimal retained drawing API.
///
/// Style property names are camelCase (`fontSize`, `letterSpacing`).
pub trait Surface {
    /// The canvas root element.
    fn root(&self) -> ElementId;

    /// Canvas top-left corner in client coordinates.
    fn origin(&self) -> Point;

    /// Create a detached element with the given tag.
    fn create_element(&mut self, tag: &str) -> ElementId;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> EditorResult<()>;

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) -> EditorResult<()>;

    /// Remove every inline style property.
    fn clear_style(&mut self, element: ElementId) -> EditorResult<()>;

    /// Add or remove a class name.
    fn set_class(&mut self, element: ElementId, class: &str, enabled: bool) -> EditorResult<()>;

    /// Replace the text content of an element.
    fn set_text(&mut self, element: ElementId, text: &str) -> EditorResult<()>;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: ElementId, child: ElementId) -> EditorResult<()>;

    /// Detach and drop an element together with its subtree.
    fn remove(&mut self, element: ElementId) -> EditorResult<()>;

    /// Laid-out bounds of an element in client coordinates, if it renders
    /// anything.
    fn bounding_box(&self, element: ElementId) -> Option<Rect>;
}
