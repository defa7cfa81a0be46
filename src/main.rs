mod app;
mod capability;
mod color;
mod compare;
mod config;
mod data;
mod error;
mod pipeline;
mod profile;
mod state;
mod stats;
mod ui;
mod viz;

use anyhow::Context;
use app::EdaApp;
use config::{DisplayMode, EdaConfig};
use eframe::egui;
use error::EdaError;
use pipeline::Pipeline;
use state::ViewerState;

/// `rusty-eda [PATH]`: PATH is a `.json` run configuration or the CSV
/// dataset itself. Without PATH, `./eda.json` is used when present.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    capability::probe();

    let arg = std::env::args().nth(1);
    let mut config =
        EdaConfig::from_arg(arg.as_deref()).context("failed to read run configuration")?;

    let path = match config.dataset.clone() {
        Some(path) => path,
        None if config.display == DisplayMode::Window => match ui::panels::pick_dataset() {
            Some(path) => path,
            None => {
                log::warn!("no dataset selected; nothing to do");
                return Ok(());
            }
        },
        None => anyhow::bail!("no dataset given: pass a CSV path or set \"dataset\" in eda.json"),
    };
    config.dataset = Some(path.clone());
    let display = config.display;

    let mut pipeline = match Pipeline::load(config, &path) {
        Ok(p) => p,
        Err(e) => {
            log::error!("[{}] {e}", pipeline::Stage::Load);
            return Err(e).with_context(|| format!("failed to load {}", path.display()));
        }
    };

    match display {
        DisplayMode::Headless => pipeline.run_headless(),
        DisplayMode::Window => {
            let Some(first) = pipeline.next_figure() else {
                log::info!("no figures to display");
                return Ok(());
            };
            run_viewer(pipeline, ViewerState::new(first))?;
        }
    }
    Ok(())
}

fn run_viewer(pipeline: Pipeline, state: ViewerState) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty EDA",
        options,
        Box::new(|_cc| Ok(Box::new(EdaApp::new(pipeline, state)))),
    )
    .map_err(|e| EdaError::Display(e.to_string()))?;
    Ok(())
}
