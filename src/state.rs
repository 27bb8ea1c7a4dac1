use std::path::PathBuf;

use rar_data_analyzer::archive::{self, ExtractorTool, ToolKind};
use rar_data_analyzer::render::OverlayChart;
use rar_data_analyzer::{AnalyzerConfig, AnalyzerError, Batch, FailurePolicy};

pub const READY_STATUS: &str = "Ready to process...";
pub const COMPLETE_STATUS: &str = "Processing complete. Plots saved.";

/// A message the UI should show in a modal dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Warning(String),
    Error(String),
    Info(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Folder scanned for archives.
    pub folder_path: String,

    /// Folder receiving the charts.
    pub save_dir: String,

    pub archive_extension: String,

    /// Extraction tool settings.
    pub tool_kind: ToolKind,
    pub tool_path: String,

    pub continue_on_error: bool,

    /// Status line below the start button.
    pub status_message: String,

    /// Batch progress in `0.0..=1.0`.
    pub progress: f32,

    /// Summary of the most recently processed temperature table.
    pub summary_text: String,

    /// Chart of the most recently plotted temperature table.
    pub preview: Option<OverlayChart>,

    /// Batch in flight; advanced one archive per frame.
    pub batch: Option<Batch<ExtractorTool>>,

    /// Dialog waiting to be shown.
    pub notice: Option<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        let tool = ExtractorTool::default();
        Self {
            folder_path: String::new(),
            save_dir: String::new(),
            archive_extension: "rar".to_string(),
            tool_kind: tool.kind,
            tool_path: tool.program.display().to_string(),
            continue_on_error: false,
            status_message: READY_STATUS.to_string(),
            progress: 0.0,
            summary_text: String::new(),
            preview: None,
            batch: None,
            notice: None,
        }
    }
}

impl AppState {
    pub fn is_running(&self) -> bool {
        self.batch.is_some()
    }

    /// Build the batch configuration from the form fields.
    pub fn config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::new(self.folder_path.trim(), self.save_dir.trim());
        config.archive_extension = self.archive_extension.trim().to_string();
        config.extractor = ExtractorTool::new(self.tool_kind, self.tool_path.trim());
        config.failure_policy = if self.continue_on_error {
            FailurePolicy::ContinueOnError
        } else {
            FailurePolicy::AbortBatch
        };
        config
    }

    /// Record a newly chosen input folder and report how many archives it holds.
    pub fn set_folder(&mut self, folder: PathBuf) {
        self.folder_path = folder.display().to_string();
        match archive::discover_archives(&folder, self.archive_extension.trim()) {
            Ok(found) => {
                self.status_message = format!(
                    "Found {} {} files.",
                    found.len(),
                    self.archive_extension.to_uppercase()
                );
            }
            Err(e) => {
                log::warn!("Cannot list {}: {e}", folder.display());
                self.status_message = format!("Error: {e}");
            }
        }
    }

    pub fn set_save_dir(&mut self, dir: PathBuf) {
        self.save_dir = dir.display().to_string();
    }

    /// Validate the form and prepare a batch. Missing input leaves the state
    /// untouched apart from the warning.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let config = self.config();
        match Batch::from_config(&config) {
            Ok(batch) => {
                log::info!(
                    "Starting batch of {} archives from {}",
                    batch.archives().len(),
                    config.input_dir.display()
                );
                self.summary_text.clear();
                self.preview = None;
                self.progress = 0.0;
                self.status_message = "Processing...".to_string();
                self.batch = Some(batch);
            }
            Err(AnalyzerError::MissingInput(_)) => {
                self.notice = Some(Notice::Warning(
                    "Please select folder and save directory.".to_string(),
                ));
            }
            Err(e) => self.fail(e),
        }
    }

    /// Advance the running batch by one archive.
    pub fn tick(&mut self) {
        let Some(batch) = self.batch.as_mut() else {
            return;
        };

        match batch.step() {
            Some(Ok(outcome)) => {
                if let Some(text) = outcome.summary_text() {
                    self.summary_text = text;
                }
                if let Some(chart) = outcome.tables.iter().rev().find_map(|t| t.chart.clone()) {
                    self.preview = Some(chart);
                }
                if let Some(error) = &outcome.error {
                    self.status_message = format!("Skipped {}: {error}", outcome.archive);
                }
                self.progress = batch.progress();
            }
            Some(Err(e)) => {
                self.fail(e);
                return;
            }
            None => {}
        }

        if batch.is_finished() {
            self.progress = 1.0;
            self.batch = None;
            self.status_message = COMPLETE_STATUS.to_string();
            self.notice = Some(Notice::Info(
                "Archives processed successfully and plots saved.".to_string(),
            ));
        }
    }

    fn fail(&mut self, e: AnalyzerError) {
        log::error!("Batch failed: {e}");
        self.batch = None;
        self.status_message = "Processing stopped.".to_string();
        self.notice = Some(Notice::Error(format!("An error occurred: {e}")));
    }
}
