//! Pointer input types and double-click detection.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

/// Pointer event, positions in client (page) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Up {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    /// Wheel input. `delta.y > 0` means the wheel moved up (away from the user).
    Scroll {
        position: Point,
        delta: Vec2,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    /// Pointer position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Scroll { position, .. } => position,
        }
    }
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Detects double-clicks from a stream of primary-button presses.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a button press. Returns `true` if it completes a double-click.
    pub fn press(&mut self, position: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        let now = Instant::now();
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.duration_since(last_time).as_millis();
            if elapsed < DOUBLE_CLICK_TIME_MS && (position - last_pos).hypot() < DOUBLE_CLICK_DISTANCE {
                // Reset so a third click starts a new sequence
                self.last_click_time = None;
                self.last_click_position = None;
                return true;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
        false
    }
}
