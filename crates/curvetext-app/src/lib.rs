//! curvetext Application
//!
//! Headless shell around the editor core: loads configuration, replays
//! scripted editing sessions and renders the resulting SVG.

mod app;
mod session;

pub use app::{App, AppConfig};
pub use session::{Session, SessionEvent};
