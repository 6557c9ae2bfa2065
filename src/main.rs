use anyhow::Result;
use eframe::egui;

use pnadc_dashboard::app::DashboardApp;
use pnadc_dashboard::config::DashboardConfig;
use pnadc_dashboard::data::loader;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::default();
    let loaded = match loader::load(&config) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load data: {e:#}");
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let app = DashboardApp::new(loaded, &config);
    eframe::run_native(
        "PNADC Dashboard – Indicators by Race and Locality",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
