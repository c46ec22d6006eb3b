//! Control point storage for a single path.

use crate::error::{EditorError, EditorResult};
use crate::geometry::CurveKind;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Coordinate axis of a point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Short name used in control keys (`"x"` / `"y"`).
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Ordered control points of one path.
///
/// The length always equals the arity of the curve kind; there is no way to
/// add or remove points after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStore {
    kind: CurveKind,
    points: Vec<Point>,
}

impl PointStore {
    /// Create a store holding the reset positions of `kind`.
    pub fn new(kind: CurveKind) -> Self {
        Self {
            kind,
            points: kind.point_bases().to_vec(),
        }
    }

    /// The curve kind these points belong to.
    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    /// Restore every point to its canonical position.
    pub fn reset(&mut self) {
        self.points.clear();
        self.points.extend_from_slice(self.kind.point_bases());
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    fn slot(&mut self, index: usize) -> EditorResult<&mut Point> {
        let arity = self.points.len();
        self.points
            .get_mut(index)
            .ok_or(EditorError::PointOutOfRange { index, arity })
    }

    /// Move one point to an absolute position.
    pub fn set(&mut self, index: usize, position: Point) -> EditorResult<()> {
        *self.slot(index)? = position;
        Ok(())
    }

    /// Overwrite a single coordinate of one point.
    pub fn set_axis(&mut self, index: usize, axis: Axis, value: f64) -> EditorResult<()> {
        let point = self.slot(index)?;
        match axis {
            Axis::X => point.x = value,
            Axis::Y => point.y = value,
        }
        Ok(())
    }

    /// Rigidly translate every point.
    pub fn translate(&mut self, delta: Vec2) {
        let affine = Affine::translate(delta);
        for p in &mut self.points {
            *p = affine * *p;
        }
    }
}
