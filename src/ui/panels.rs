use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rar_data_analyzer::archive::ToolKind;

use crate::state::{AppState, Notice};

// ---------------------------------------------------------------------------
// Left side panel – batch form
// ---------------------------------------------------------------------------

/// Render the folder pickers, start button, progress and summary.
pub fn form_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("RAR Data Analyzer").strong());
    });
    ui.add_space(8.0);

    let running = state.is_running();

    egui::Grid::new("folders")
        .num_columns(3)
        .spacing([8.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Archives folder:");
            ui.add_enabled(
                !running,
                egui::TextEdit::singleline(&mut state.folder_path).desired_width(220.0),
            );
            if ui.add_enabled(!running, egui::Button::new("Browse")).clicked() {
                if let Some(folder) = pick_folder("Select folder containing archives") {
                    state.set_folder(folder);
                }
            }
            ui.end_row();

            ui.label("Save plots to:");
            ui.add_enabled(
                !running,
                egui::TextEdit::singleline(&mut state.save_dir).desired_width(220.0),
            );
            if ui.add_enabled(!running, egui::Button::new("Browse")).clicked() {
                if let Some(dir) = pick_folder("Select directory to save plots") {
                    state.set_save_dir(dir);
                }
            }
            ui.end_row();
        });

    egui::CollapsingHeader::new("Extraction tool")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.add_enabled_ui(!running, |ui: &mut Ui| tool_settings(ui, state));
        });

    ui.add_space(8.0);
    ui.vertical_centered(|ui: &mut Ui| {
        let button = egui::Button::new(
            RichText::new("Process Archives")
                .strong()
                .color(Color32::WHITE),
        )
        .fill(Color32::from_rgb(40, 140, 60));
        if ui.add_enabled(!running, button).clicked() {
            state.start();
        }
    });

    ui.add_space(8.0);
    ui.label(
        RichText::new(&state.status_message)
            .italics()
            .color(Color32::LIGHT_BLUE),
    );
    ui.add(egui::ProgressBar::new(state.progress).show_percentage());

    ui.separator();
    ui.strong("Suggestions Based on Temperature Ranges:");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(state.summary_text.as_str());
        });
}

fn tool_settings(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Kind:");
        egui::ComboBox::from_id_salt("tool_kind")
            .selected_text(tool_kind_label(state.tool_kind))
            .show_ui(ui, |ui: &mut Ui| {
                for kind in [ToolKind::UnRar, ToolKind::SevenZip] {
                    ui.selectable_value(&mut state.tool_kind, kind, tool_kind_label(kind));
                }
            });
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Program:");
        ui.text_edit_singleline(&mut state.tool_path);
        if ui.small_button("…").clicked() {
            if let Some(file) = rfd::FileDialog::new()
                .set_title("Locate extraction tool")
                .pick_file()
            {
                state.tool_path = file.display().to_string();
            }
        }
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Archive extension:");
        ui.add(egui::TextEdit::singleline(&mut state.archive_extension).desired_width(60.0));
    });
    ui.checkbox(&mut state.continue_on_error, "Continue after a failed archive");
}

fn tool_kind_label(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::UnRar => "UnRAR",
        ToolKind::SevenZip => "7-Zip",
    }
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

fn pick_folder(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new().set_title(title).pick_folder()
}

/// Show a blocking message box for a notice.
pub fn show_notice(notice: &Notice) {
    let (level, title, text) = match notice {
        Notice::Warning(text) => (rfd::MessageLevel::Warning, "Warning", text),
        Notice::Error(text) => (rfd::MessageLevel::Error, "Error", text),
        Notice::Info(text) => (rfd::MessageLevel::Info, "Success", text),
    };
    rfd::MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(text.as_str())
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
