//! Continuous pointer-drag tracking.
//!
//! One [`DragController`] is owned by each component that can start a drag
//! (a path, the canvas). The owner decides what a step means: an absolute
//! position for point drags and canvas resizes, an incremental delta for path
//! moves.

use kurbo::{Point, Vec2};

/// One pointer-move while a drag is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep<T> {
    /// What is being dragged.
    pub target: T,
    /// Pointer position of this step, in client coordinates.
    pub position: Point,
    /// Movement since the previous step (or since `begin`).
    pub delta: Vec2,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag<T> {
    target: T,
    last: Point,
}

/// Drag state machine: idle, or dragging a target.
#[derive(Debug, Clone, Copy)]
pub struct DragController<T> {
    active: Option<ActiveDrag<T>>,
}

impl<T> Default for DragController<T> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<T: Copy> DragController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `target`. Replaces any drag already in progress.
    ///
    /// `position` is only the reference for the first delta.
    pub fn begin(&mut self, target: T, position: Point) {
        self.active = Some(ActiveDrag {
            target,
            last: position,
        });
    }

    /// Feed a pointer move. Returns `None` when idle.
    pub fn update(&mut self, position: Point) -> Option<DragStep<T>> {
        let drag = self.active.as_mut()?;
        let delta = position - drag.last;
        drag.last = position;
        Some(DragStep {
            target: drag.target,
            position,
            delta,
        })
    }

    /// Stop dragging. Returns the target that was being dragged, if any.
    pub fn end(&mut self) -> Option<T> {
        self.active.take().map(|drag| drag.target)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<T> {
        self.active.map(|drag| drag.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_ignores_moves() {
        let mut drag: DragController<u8> = DragController::new();
        assert!(drag.update(Point::new(10.0, 10.0)).is_none());
        assert!(drag.end().is_none());
    }

    #[test]
    fn test_incremental_deltas() {
        let mut drag = DragController::new();
        drag.begin('p', Point::new(100.0, 100.0));

        let step = drag.update(Point::new(110.0, 95.0)).unwrap();
        assert_eq!(step.target, 'p');
        assert!((step.delta.x - 10.0).abs() < f64::EPSILON);
        assert!((step.delta.y + 5.0).abs() < f64::EPSILON);

        let step = drag.update(Point::new(111.0, 95.0)).unwrap();
        assert!((step.delta.x - 1.0).abs() < f64::EPSILON);
        assert!(step.delta.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_end_returns_target() {
        let mut drag = DragController::new();
        drag.begin(3usize, Point::ZERO);
        assert!(drag.is_active());
        assert_eq!(drag.end(), Some(3));
        assert!(!drag.is_active());
        assert!(drag.update(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_begin_replaces_previous_drag() {
        let mut drag = DragController::new();
        drag.begin(1, Point::ZERO);
        drag.begin(2, Point::new(50.0, 50.0));
        assert_eq!(drag.target(), Some(2));
        let step = drag.update(Point::new(51.0, 50.0)).unwrap();
        assert!((step.delta.x - 1.0).abs() < f64::EPSILON);
    }
}
