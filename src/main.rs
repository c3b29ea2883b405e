mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashboardApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_args(std::env::args().skip(1));

    // The dashboard is useless without its data: a failed load stops here.
    let (dataset, report) = data::loader::load_file(&config.data_path)
        .inspect_err(|e| log::error!("Failed to load sales data: {e:#}"))
        .context("startup load failed")?;
    let state = AppState::new(
        dataset,
        report,
        config.data_path.clone(),
        chrono::Local::now().date_naive(),
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard – Amazon Sale Report",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
