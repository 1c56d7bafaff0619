mod app;
mod color;
mod config;
mod country;
mod data;
mod state;
mod ui;

use app::AuthorExplorerApp;
use clap::Parser;
use config::{Cli, DashboardConfig};
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from(Cli::parse());
    log::info!("Loading authors from {}", config.source);
    // The session's one load happens here, before the window opens.
    let state = AppState::new(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Author Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(AuthorExplorerApp::new(state)))),
    )
}
