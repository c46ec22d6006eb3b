//! Scripted editing sessions.

use anyhow::{Context, Result};
use curvetext_core::{CanvasInput, HitTarget, PanelInput, PathIndex, PointerEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Add a path; `kind` is a curve kind name such as `"cubic"`.
    AddPath { kind: String },
    RemovePath { path: PathIndex },
    /// Pointer input. Without a target, the editor hit-tests the position.
    Pointer {
        event: PointerEvent,
        #[serde(default)]
        target: Option<HitTarget>,
    },
    Panel { path: PathIndex, input: PanelInput },
    Canvas { input: CanvasInput },
}

/// Ordered list of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a session file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid session {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvetext_core::{Axis, MouseButton};
    use kurbo::Point;

    #[test]
    fn test_parse_events() {
        let json = r#"{
            "events": [
                {"type": "add_path", "kind": "cubic"},
                {"type": "pointer", "event": {"Down": {"position": {"x": 10.0, "y": 20.0}}},
                 "target": {"point_marker": {"path": 0, "point": 2}}},
                {"type": "panel", "path": 0, "input": {"PointField": {"point": 1, "axis": "y", "raw": "7"}}},
                {"type": "canvas", "input": "crop"},
                {"type": "remove_path", "path": 0}
            ]
        }"#;
        let session = Session::from_json(json).unwrap();
        assert_eq!(session.events.len(), 5);
        assert_eq!(
            session.events[1],
            SessionEvent::Pointer {
                event: PointerEvent::Down {
                    position: Point::new(10.0, 20.0),
                    button: MouseButton::Left,
                },
                target: Some(HitTarget::PointMarker { path: 0, point: 2 }),
            }
        );
        assert_eq!(
            session.events[2],
            SessionEvent::Panel {
                path: 0,
                input: PanelInput::PointField {
                    point: 1,
                    axis: Axis::Y,
                    raw: "7".to_string(),
                },
            }
        );
        assert_eq!(session.events[3], SessionEvent::Canvas { input: CanvasInput::Crop });
    }

    #[test]
    fn test_empty_session() {
        assert!(Session::from_json("{}").unwrap().events.is_empty());
    }
}
