//! The batch fold: archives one at a time, lock tables before temperature
//! tables, one chart and one summary per temperature table.

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{self, ArchiveOpener, ArchiveSource, ExtractorTool, classify_entry, entry_stem};
use crate::config::{AnalyzerConfig, FailurePolicy};
use crate::data::filter::{TimeSet, extract_lock_times, filter_temperatures};
use crate::data::loader::load_table;
use crate::data::model::Table;
use crate::data::summary::{Summary, summarize};
use crate::error::{AnalyzerError, Result};
use crate::render::{ChartRenderer, OverlayChart, PngRenderer};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one temperature table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutcome {
    pub entry: String,
    /// Written chart, absent when nothing was selected.
    pub plot: Option<PathBuf>,
    pub summary: Summary,
    /// Chart data for previews; present whenever `plot` is.
    pub chart: Option<OverlayChart>,
}

/// Result of one archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveOutcome {
    pub archive: String,
    /// Number of sentinel times collected from all lock tables.
    pub lock_times: usize,
    pub tables: Vec<TableOutcome>,
    /// Set only under [`FailurePolicy::ContinueOnError`].
    pub error: Option<String>,
}

impl ArchiveOutcome {
    /// The summary left on screen after this archive: the last table's.
    pub fn summary_text(&self) -> Option<String> {
        self.tables.last().map(|t| t.summary.text())
    }
}

/// Every outcome of a finished batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<ArchiveOutcome>,
}

impl BatchReport {
    /// The summary a user sees at the end: each table's summary replaces the
    /// previous one, so only the most recent survives.
    pub fn final_summary(&self) -> Option<String> {
        self.outcomes.iter().rev().find_map(|o| o.summary_text())
    }

    pub fn plots(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .flat_map(|o| o.tables.iter())
            .filter_map(|t| t.plot.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Per-archive processing
// ---------------------------------------------------------------------------

fn read_table<S: ArchiveSource + ?Sized>(source: &mut S, entry: &str) -> Result<Table> {
    let bytes = source.read_entry(entry)?;
    load_table(entry, bytes).map_err(|e| AnalyzerError::Table {
        archive: source.name().to_string(),
        entry: entry.to_string(),
        source: e,
    })
}

fn table_error(source: &impl ArchiveSource, entry: &str, e: anyhow::Error) -> AnalyzerError {
    AnalyzerError::Table {
        archive: source.name().to_string(),
        entry: entry.to_string(),
        source: e,
    }
}

/// Join the lock and temperature tables of one archive, write a chart per
/// temperature table with a non-empty selection, and summarize each.
pub fn process_archive<S, R>(source: &mut S, output_dir: &Path, renderer: &R) -> Result<ArchiveOutcome>
where
    S: ArchiveSource,
    R: ChartRenderer + ?Sized,
{
    let entries = source.entry_names()?;
    let roles: Vec<_> = entries.iter().map(|e| (e, classify_entry(e))).collect();

    let mut lock_times = Vec::new();
    for (entry, _) in roles.iter().filter(|(_, role)| role.lock) {
        let table = read_table(source, entry)?;
        let times = extract_lock_times(&table).map_err(|e| table_error(&*source, entry, e))?;
        log::debug!("{}: {} sentinel rows in {entry}", source.name(), times.len());
        lock_times.extend(times);
    }
    let time_set: TimeSet = lock_times.iter().copied().collect();

    let mut tables = Vec::new();
    for (entry, _) in roles.iter().filter(|(_, role)| role.temperature) {
        let table = read_table(source, entry)?;
        let filtered =
            filter_temperatures(&table, &time_set).map_err(|e| table_error(&*source, entry, e))?;

        let mut plot = None;
        let mut chart = None;
        if !filtered.selected.is_empty() {
            let overlay = OverlayChart::new(entry, &filtered);
            let path = output_dir.join(format!("{}.png", entry_stem(entry)));
            renderer
                .render(&overlay, &path)
                .map_err(|e| AnalyzerError::Plot {
                    entry: entry.to_string(),
                    source: e,
                })?;
            log::info!("Saved {}", path.display());
            plot = Some(path);
            chart = Some(overlay);
        }

        tables.push(TableOutcome {
            entry: entry.to_string(),
            plot,
            summary: summarize(Some(&filtered.selected)),
            chart,
        });
    }

    Ok(ArchiveOutcome {
        archive: source.name().to_string(),
        lock_times: lock_times.len(),
        tables,
        error: None,
    })
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// A batch that advances one archive per [`Batch::step`], so a UI can
/// refresh between archives.
pub struct Batch<O: ArchiveOpener, R: ChartRenderer = PngRenderer> {
    opener: O,
    renderer: R,
    output_dir: PathBuf,
    policy: FailurePolicy,
    archives: Vec<PathBuf>,
    next: usize,
    aborted: bool,
    outcomes: Vec<ArchiveOutcome>,
}

impl Batch<ExtractorTool, PngRenderer> {
    /// Batch over the configured extraction tool with PNG output.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        Batch::prepare(config, config.extractor.clone(), PngRenderer::default())
    }
}

impl<O: ArchiveOpener, R: ChartRenderer> Batch<O, R> {
    /// Validate input, check the opener, create the output folder and list
    /// the archives. Nothing is processed yet.
    pub fn prepare(config: &AnalyzerConfig, opener: O, renderer: R) -> Result<Self> {
        config.validate()?;
        opener.verify()?;
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| AnalyzerError::io(&config.output_dir, e))?;
        let archives = archive::discover_archives(&config.input_dir, &config.archive_extension)?;

        Ok(Batch {
            opener,
            renderer,
            output_dir: config.output_dir.clone(),
            policy: config.failure_policy,
            archives,
            next: 0,
            aborted: false,
            outcomes: Vec::new(),
        })
    }

    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    /// Archives attempted so far.
    pub fn completed(&self) -> usize {
        self.next
    }

    pub fn is_finished(&self) -> bool {
        self.aborted || self.next >= self.archives.len()
    }

    /// Fraction of archives attempted, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.archives.is_empty() {
            1.0
        } else {
            self.next as f32 / self.archives.len() as f32
        }
    }

    /// Process the next archive. `None` once the batch is finished or aborted.
    pub fn step(&mut self) -> Option<Result<&ArchiveOutcome>> {
        if self.is_finished() {
            return None;
        }
        let path = self.archives[self.next].clone();
        self.next += 1;
        log::info!(
            "Processing {} ({}/{})",
            path.display(),
            self.next,
            self.archives.len()
        );

        let result = self
            .opener
            .open(&path)
            .and_then(|mut source| process_archive(&mut source, &self.output_dir, &self.renderer));

        match (result, self.policy) {
            (Ok(outcome), _) => self.outcomes.push(outcome),
            (Err(e), FailurePolicy::AbortBatch) => {
                log::error!("Aborting batch at {}: {e}", path.display());
                self.aborted = true;
                return Some(Err(e));
            }
            (Err(e), FailurePolicy::ContinueOnError) => {
                log::warn!("Skipping {}: {e}", path.display());
                self.outcomes.push(ArchiveOutcome {
                    archive: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    lock_times: 0,
                    tables: Vec::new(),
                    error: Some(e.to_string()),
                });
            }
        }
        self.outcomes.last().map(Ok)
    }

    /// Drive the batch to the end, returning the first error under
    /// [`FailurePolicy::AbortBatch`].
    pub fn run(mut self) -> Result<BatchReport> {
        while let Some(result) = self.step() {
            if let Err(e) = result {
                return Err(e);
            }
        }
        Ok(self.into_report())
    }

    pub fn into_report(self) -> BatchReport {
        BatchReport {
            outcomes: self.outcomes,
        }
    }
}

/// Process every archive in `config.input_dir` with the configured tool.
pub fn run_batch(config: &AnalyzerConfig) -> Result<BatchReport> {
    Batch::from_config(config)?.run()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::archive::MemoryArchive;
    use crate::render::PlotError;

    #[derive(Default)]
    struct RecordingRenderer {
        rendered: RefCell<Vec<PathBuf>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, _chart: &OverlayChart, output_path: &Path) -> core::result::Result<(), PlotError> {
            self.rendered.borrow_mut().push(output_path.to_path_buf());
            Ok(())
        }
    }

    const LOCK: &str = "time,lock\n1,4999.99\n2,0\n";
    const TEMPERATURE: &str = "time,temperature\n1,5\n2,25\n";

    #[test]
    fn test_scenario_single_match() {
        let mut archive = MemoryArchive::new("run.rar")
            .with_entry("run/lock.csv", LOCK)
            .with_entry("run/temperature.csv", TEMPERATURE);
        let renderer = RecordingRenderer::default();

        let outcome = process_archive(&mut archive, Path::new("out"), &renderer).unwrap();

        assert_eq!(outcome.lock_times, 1);
        assert_eq!(outcome.tables.len(), 1);
        let table = &outcome.tables[0];
        assert_eq!(table.plot.as_deref(), Some(Path::new("out/temperature.png")));
        assert_eq!(
            outcome.summary_text().unwrap(),
            "Range 1: Temperature between 0 and 10 degrees, 1 data points."
        );
        assert_eq!(table.chart.as_ref().unwrap().selected, vec![(1.0, 5.0)]);
        assert_eq!(renderer.rendered.borrow().len(), 1);
    }

    #[test]
    fn test_no_sentinel_means_no_plot() {
        let mut archive = MemoryArchive::new("run.rar")
            .with_entry("lock.csv", "time,lock\n1,4999.98\n2,5000\n")
            .with_entry("temperature.csv", TEMPERATURE);
        let renderer = RecordingRenderer::default();

        let outcome = process_archive(&mut archive, Path::new("out"), &renderer).unwrap();

        assert!(outcome.tables[0].plot.is_none());
        assert_eq!(outcome.summary_text().unwrap(), "No temperature data available.");
        assert!(renderer.rendered.borrow().is_empty());
    }

    #[test]
    fn test_selection_without_finite_values_still_plots() {
        let mut archive = MemoryArchive::new("run.rar")
            .with_entry("lock.csv", "time,lock\n1,4999.99\n")
            .with_entry("temperature.csv", "time,temperature\n1,NaN\n");
        let renderer = RecordingRenderer::default();

        let outcome = process_archive(&mut archive, Path::new("out"), &renderer).unwrap();

        let table = &outcome.tables[0];
        assert_eq!(table.plot.as_deref(), Some(Path::new("out/temperature.png")));
        assert_eq!(outcome.summary_text().unwrap(), "No suggestions based on current data.");
        assert_eq!(*renderer.rendered.borrow(), vec![PathBuf::from("out/temperature.png")]);
    }

    #[test]
    fn test_lock_times_are_combined_across_tables() {
        let mut archive = MemoryArchive::new("run.rar")
            .with_entry("a_lock.csv", "time,lock\n1,4999.99\n")
            .with_entry("b_lock.csv", "time,lock\n2,4999.99\n")
            .with_entry("temperature.csv", "time,temperature\n1,5\n2,15\n3,25\n");

        let outcome =
            process_archive(&mut archive, Path::new("out"), &RecordingRenderer::default()).unwrap();

        assert_eq!(outcome.lock_times, 2);
        assert_eq!(
            outcome.summary_text().unwrap(),
            "Range 1: Temperature between 0 and 10 degrees, 1 data points.\n\
             Range 2: Temperature between 10 and 20 degrees, 1 data points."
        );
    }

    #[test]
    fn test_lock_tables_are_read_before_temperature_tables() {
        // Entry order puts the temperature table first.
        let mut archive = MemoryArchive::new("run.rar")
            .with_entry("temperature.csv", TEMPERATURE)
            .with_entry("lock.csv", LOCK);

        let outcome =
            process_archive(&mut archive, Path::new("out"), &RecordingRenderer::default()).unwrap();
        assert!(outcome.tables[0].plot.is_some());
    }

    #[test]
    fn test_archive_without_tables_has_no_summary() {
        let mut archive = MemoryArchive::new("run.rar").with_entry("readme.txt", "hello");
        let outcome =
            process_archive(&mut archive, Path::new("out"), &RecordingRenderer::default()).unwrap();
        assert!(outcome.tables.is_empty());
        assert_eq!(outcome.summary_text(), None);
    }

    #[test]
    fn test_missing_column_is_a_table_error() {
        let mut archive = MemoryArchive::new("run.rar")
            .with_entry("lock.csv", "time,value\n1,4999.99\n");
        let err = process_archive(&mut archive, Path::new("out"), &RecordingRenderer::default())
            .unwrap_err();
        match err {
            AnalyzerError::Table { archive, entry, .. } => {
                assert_eq!(archive, "run.rar");
                assert_eq!(entry, "lock.csv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_final_summary_is_the_last_one_written() {
        let report = BatchReport {
            outcomes: vec![
                ArchiveOutcome {
                    archive: "a.rar".into(),
                    lock_times: 1,
                    tables: vec![TableOutcome {
                        entry: "temperature.csv".into(),
                        plot: None,
                        summary: Summary::NoData,
                        chart: None,
                    }],
                    error: None,
                },
                ArchiveOutcome {
                    archive: "b.rar".into(),
                    lock_times: 0,
                    tables: Vec::new(),
                    error: None,
                },
            ],
        };
        assert_eq!(
            report.final_summary().as_deref(),
            Some("No temperature data available.")
        );
        assert_eq!(report.plots().count(), 0);
    }
}
