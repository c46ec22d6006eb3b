//! Editor configuration.

use crate::canvas::Viewport;
use serde::{Deserialize, Serialize};

/// Tunable editor settings. Missing fields in JSON fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas width on startup and after a canvas reset.
    pub canvas_width: f64,
    /// Canvas height on startup and after a canvas reset.
    pub canvas_height: f64,
    /// Host window dimensions the canvas size is clamped against.
    pub viewport: Viewport,
    /// Canvas background as a CSS colour; path accents contrast against it.
    pub background: String,
    /// Radius of the draggable point markers.
    pub marker_radius: f64,
    /// Text placed on every new path.
    pub initial_text: String,
    /// Font size of new text, in pixels.
    pub font_size: f64,
    /// Distance from the curve that still counts as a hit on the path.
    pub hit_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 500.0,
            canvas_height: 500.0,
            viewport: Viewport::default(),
            background: "#1e293b".to_string(),
            marker_radius: 7.0,
            initial_text: "My Curved Text :)".to_string(),
            font_size: 24.0,
            hit_tolerance: 4.0,
        }
    }
}

impl EditorConfig {
    /// Deserialize a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"canvas_width": 640}"#).unwrap();
        assert!((config.canvas_width - 640.0).abs() < f64::EPSILON);
        assert!((config.canvas_height - 500.0).abs() < f64::EPSILON);
        assert_eq!(config.initial_text, "My Curved Text :)");
    }

    #[test]
    fn test_json_round_trip() {
        let config = EditorConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
