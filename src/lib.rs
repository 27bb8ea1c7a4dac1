//! Correlates lock and temperature tables stored in archives.
//!
//! For every archive in a folder, the `time` values whose `lock` equals
//! [`data::model::LOCK_SENTINEL`] select rows of each temperature table; the
//! selection is charted to PNG and summarized by fixed temperature buckets.
//!
//! ```no_run
//! use rar_data_analyzer::{AnalyzerConfig, run_batch};
//!
//! let config = AnalyzerConfig::new("archives", "plots");
//! let report = run_batch(&config)?;
//! if let Some(summary) = report.final_summary() {
//!     println!("{summary}");
//! }
//! # Ok::<(), rar_data_analyzer::AnalyzerError>(())
//! ```

pub mod archive;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;

pub use config::{AnalyzerConfig, FailurePolicy};
pub use error::AnalyzerError;
pub use pipeline::{ArchiveOutcome, Batch, BatchReport, TableOutcome, process_archive, run_batch};
