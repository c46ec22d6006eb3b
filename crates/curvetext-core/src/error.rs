//! Error types for editor operations.

use crate::path::PathIndex;
use crate::surface::ElementId;
use thiserror::Error;

/// Editor errors.
///
/// Every variant is local to the operation that raised it; the editor stays
/// usable afterwards.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    /// A curve kind was requested that has no geometry function.
    #[error("No geometry implementation for curve kind `{0}`")]
    UnimplementedGeometry(String),
    #[error("Path not found: {0}")]
    PathNotFound(PathIndex),
    #[error("Point {index} out of range for a path with {arity} points")]
    PointOutOfRange { index: usize, arity: usize },
    #[error("Unknown surface element: {0:?}")]
    UnknownElement(ElementId),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
