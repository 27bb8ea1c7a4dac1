use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::render::PlotError;

/// The primary error type for batch processing.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Please select {0}.")]
    MissingInput(&'static str),

    #[error("Extraction tool not found at {}. Install it or fix the configured path.", .0.display())]
    ToolNotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed on {}: {stderr}", archive.display())]
    ToolFailed {
        tool: String,
        archive: PathBuf,
        stderr: String,
    },

    #[error("Failed to read {entry} in {archive}: {source:#}")]
    Table {
        archive: String,
        entry: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to plot {entry}: {source}")]
    Plot {
        entry: String,
        #[source]
        source: PlotError,
    },
}

impl AnalyzerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AnalyzerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = core::result::Result<T, AnalyzerError>;
