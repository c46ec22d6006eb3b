//! Curve kinds and the geometry description for each kind.

use crate::error::EditorError;
use kurbo::{BezPath, Point, Shape};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

const QUADRATIC_BASES: [Point; 3] = [
    Point::new(100.0, 250.0),
    Point::new(245.0, 100.0),
    Point::new(390.0, 250.0),
];

const CUBIC_BASES: [Point; 4] = [
    Point::new(100.0, 250.0),
    Point::new(150.0, 100.0),
    Point::new(340.0, 100.0),
    Point::new(390.0, 250.0),
];

// First and last point coincide at rest; the middle point is the far end of the loop.
const ELLIPSIS_BASES: [Point; 3] = [
    Point::new(100.0, 250.0),
    Point::new(390.0, 250.0),
    Point::new(100.0, 250.0),
];

/// The curve family of a path. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    /// One quadratic segment: start, control, end.
    Quadratic,
    /// One cubic segment: start, two controls, end.
    Cubic,
    /// Closed lens made of two mirrored quadratic arcs.
    Ellipsis,
}

impl CurveKind {
    /// Number of control points a path of this kind owns.
    pub fn arity(self) -> usize {
        self.point_bases().len()
    }

    /// Canonical reset positions.
    pub fn point_bases(self) -> &'static [Point] {
        match self {
            CurveKind::Quadratic => &QUADRATIC_BASES,
            CurveKind::Cubic => &CUBIC_BASES,
            CurveKind::Ellipsis => &ELLIPSIS_BASES,
        }
    }

    /// Name used in configuration and session files.
    pub fn name(self) -> &'static str {
        match self {
            CurveKind::Quadratic => "quadratic",
            CurveKind::Cubic => "cubic",
            CurveKind::Ellipsis => "ellipsis",
        }
    }

    /// All kinds, in menu order.
    pub fn all() -> &'static [CurveKind] {
        &[CurveKind::Quadratic, CurveKind::Cubic, CurveKind::Ellipsis]
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurveKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| EditorError::UnimplementedGeometry(s.to_string()))
    }
}

/// Point reflected about the horizontal line through the chord midpoint.
fn mirrored_control(start: Point, control: Point, end: Point) -> Point {
    let mid_y = (start.y + end.y) / 2.0;
    Point::new(control.x, 2.0 * mid_y - control.y)
}

/// Point at `index`, or the origin when the slice is too short.
fn at(points: &[Point], index: usize) -> Point {
    points.get(index).copied().unwrap_or(Point::ZERO)
}

fn push_point(out: &mut String, p: Point) {
    // Writing to a String cannot fail.
    let _ = write!(out, " {} {}", p.x, p.y);
}

/// Build the path data string for `points` interpreted as `kind`.
///
/// Pure: the same input always yields the same description. Short inputs and
/// coincident points produce degenerate curves instead of failing, and
/// non-finite coordinates are written through as `NaN`.
pub fn describe(points: &[Point], kind: CurveKind) -> String {
    let mut d = String::from("M");
    push_point(&mut d, at(points, 0));
    match kind {
        CurveKind::Quadratic => {
            d.push_str(" Q");
            push_point(&mut d, at(points, 1));
            push_point(&mut d, at(points, 2));
        }
        CurveKind::Cubic => {
            d.push_str(" C");
            push_point(&mut d, at(points, 1));
            push_point(&mut d, at(points, 2));
            push_point(&mut d, at(points, 3));
        }
        CurveKind::Ellipsis => {
            let (start, control, end) = (at(points, 0), at(points, 1), at(points, 2));
            d.push_str(" Q");
            push_point(&mut d, control);
            push_point(&mut d, end);
            d.push_str(" Q");
            push_point(&mut d, mirrored_control(start, control, end));
            push_point(&mut d, start);
            d.push_str(" Z");
        }
    }
    d
}

/// Same geometry as [`describe`], as a kurbo path for hit testing and layout.
pub fn to_bez_path(points: &[Point], kind: CurveKind) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(at(points, 0));
    match kind {
        CurveKind::Quadratic => path.quad_to(at(points, 1), at(points, 2)),
        CurveKind::Cubic => path.curve_to(at(points, 1), at(points, 2), at(points, 3)),
        CurveKind::Ellipsis => {
            let (start, control, end) = (at(points, 0), at(points, 1), at(points, 2));
            path.quad_to(control, end);
            path.quad_to(mirrored_control(start, control, end), start);
            path.close_path();
        }
    }
    path
}

/// Largest span, in pixels, that layout and hit testing will subdivide.
pub const MAX_LAYOUT_EXTENT: f64 = 1e9;

/// Whether the bounds of `path` are finite and small enough to flatten or
/// search.
pub fn is_layout_safe(path: &BezPath) -> bool {
    let bounds = path.bounding_box();
    bounds.is_finite() && bounds.width().max(bounds.height()) <= MAX_LAYOUT_EXTENT
}
