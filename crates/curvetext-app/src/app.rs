//! Application state and configuration.

use crate::session::{Session, SessionEvent};
use anyhow::{Context, Result};
use curvetext_core::{Editor, EditorConfig, EditorResult, FormPanelBuilder, SvgSurface};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub editor: EditorConfig,
    /// Canvas top-left corner in page coordinates.
    pub canvas_origin: Point,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            canvas_origin: Point::new(24.0, 24.0),
        }
    }
}

impl AppConfig {
    /// Read a JSON configuration file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config {}", path.display()))
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    editor: Editor<SvgSurface>,
}

impl App {
    /// Create an application with default configuration.
    pub fn new() -> EditorResult<Self> {
        Self::with_config(AppConfig::default())
    }

    /// Create an application with custom configuration.
    pub fn with_config(config: AppConfig) -> EditorResult<Self> {
        let editor = Editor::new(
            config.editor.clone(),
            SvgSurface::new(config.canvas_origin),
            Box::new(FormPanelBuilder::new()),
        )?;
        Ok(Self { config, editor })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn editor(&self) -> &Editor<SvgSurface> {
        &self.editor
    }

    /// Apply one session event.
    pub fn apply(&mut self, event: &SessionEvent) -> EditorResult<()> {
        match event {
            SessionEvent::AddPath { kind } => {
                let index = self.editor.add_path_named(kind)?;
                log::debug!("Added path {}", index);
            }
            SessionEvent::RemovePath { path } => self.editor.remove_path(*path)?,
            SessionEvent::Pointer { event, target } => {
                self.editor.handle_pointer(*event, *target)?;
            }
            SessionEvent::Panel { path, input } => {
                self.editor.handle_panel_input(*path, input.clone())?
            }
            SessionEvent::Canvas { input } => self.editor.handle_canvas_input(input.clone())?,
        }
        Ok(())
    }

    /// Apply every event in order. A failing event is logged and skipped.
    ///
    /// Returns the number of events that failed.
    pub fn replay(&mut self, session: &Session) -> usize {
        let mut failed = 0;
        for (i, event) in session.events.iter().enumerate() {
            if let Err(e) = self.apply(event) {
                log::warn!("Event {} failed: {}", i, e);
                failed += 1;
            }
        }
        log::info!(
            "Replayed {} events ({} failed), {} paths live",
            session.events.len(),
            failed,
            self.editor.paths().len()
        );
        failed
    }

    /// Current canvas as SVG markup.
    pub fn render(&self) -> String {
        self.editor.surface().to_svg()
    }
}
