mod app;
mod state;
mod ui;

use app::AnalyzerApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 700.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "RAR Data Analyzer",
        options,
        Box::new(|_cc| Ok(Box::new(AnalyzerApp::default()))),
    )
}
