//! Main application entry point.

use anyhow::{Context, Result};
use clap::Parser;
use curvetext_app::{App, AppConfig, Session};
use std::path::PathBuf;

/// Replay a curvetext editing session and write the resulting SVG.
#[derive(Parser, Debug)]
#[command(name = "curvetext", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the SVG here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON session file to replay
    #[arg(value_name = "SESSION")]
    session: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting curvetext");

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let session = Session::load(&cli.session)?;

    let mut app = App::with_config(config).context("Failed to create editor")?;
    let failed = app.replay(&session);
    if failed > 0 {
        log::warn!("{} of {} events failed", failed, session.events.len());
    }

    let svg = app.render();
    match &cli.output {
        Some(path) => std::fs::write(path, svg)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", svg),
    }
    Ok(())
}
