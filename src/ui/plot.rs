use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use rar_data_analyzer::color::SeriesColors;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Preview plot (central panel)
// ---------------------------------------------------------------------------

fn color32((r, g, b): (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Render the last chart written by the running or finished batch.
pub fn preview_plot(ui: &mut Ui, state: &AppState) {
    let chart = match &state.preview {
        Some(chart) => chart,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Choose the folders and press Process Archives");
            });
            return;
        }
    };

    let colors = SeriesColors::default();
    ui.heading(chart.title.as_str());

    Plot::new("temperature_preview")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label("Temperature")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let all: PlotPoints = chart.all.iter().map(|&(x, y)| [x, y]).collect();
            plot_ui.line(
                Line::new(all)
                    .name("All Data")
                    .color(color32(colors.full))
                    .width(1.5),
            );

            let selected: PlotPoints = chart.selected.iter().map(|&(x, y)| [x, y]).collect();
            plot_ui.points(
                Points::new(selected)
                    .name("Filtered Points")
                    .color(color32(colors.selected))
                    .radius(4.0),
            );
        });
}
