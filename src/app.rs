use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AnalyzerApp {
    pub state: AppState,
}

impl eframe::App for AnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One archive per frame keeps the window responsive during a batch.
        if self.state.is_running() {
            self.state.tick();
            ctx.request_repaint();
        }

        // ---- Left side panel: form, progress and summary ----
        egui::SidePanel::left("form_panel")
            .default_width(460.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::form_panel(ui, &mut self.state);
            });

        // ---- Central panel: preview of the last chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::preview_plot(ui, &self.state);
        });

        if let Some(notice) = self.state.notice.take() {
            panels::show_notice(&notice);
        }
    }
}
