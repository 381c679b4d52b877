mod app;
mod color;
mod data;
mod state;
mod ui;

use anyhow::Context;

use app::CineScopeApp;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Load before any window opens.  A fetch or schema failure aborts
    // startup; the dashboard never renders a partially loaded view.
    let (table, report) = data::loader::load(data::loader::DEFAULT_DATASET_URI)
        .context("loading the movie dataset")?;

    let state = state::AppState::new(table, report);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CineScope – Movie Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(CineScopeApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard UI: {e}"))
}
