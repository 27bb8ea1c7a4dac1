use std::path::PathBuf;

use crate::archive::ExtractorTool;
use crate::error::{AnalyzerError, Result};

/// What happens to the rest of a batch once one archive fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first error. Outputs already written stay on disk.
    #[default]
    AbortBatch,
    /// Record the error on that archive's outcome and move on.
    ContinueOnError,
}

/// Everything a batch run needs, built by the caller instead of read from
/// widget state.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Folder scanned for archives.
    pub input_dir: PathBuf,
    /// Folder that receives the PNG charts. Created if missing.
    pub output_dir: PathBuf,
    /// Archive file extension without the dot, matched case-sensitively.
    pub archive_extension: String,
    pub extractor: ExtractorTool,
    pub failure_policy: FailurePolicy,
}

impl AnalyzerConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        AnalyzerConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            archive_extension: "rar".to_string(),
            extractor: ExtractorTool::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Reject missing user input before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(AnalyzerError::MissingInput("a folder containing archives"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(AnalyzerError::MissingInput("a directory to save plots"));
        }
        if self.archive_extension.is_empty() {
            return Err(AnalyzerError::MissingInput("an archive extension"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::new("in", "out");
        assert_eq!(config.archive_extension, "rar");
        assert_eq!(config.failure_policy, FailurePolicy::AbortBatch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_paths_are_rejected() {
        let err = AnalyzerConfig::new("", "out").validate().unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingInput(_)));

        let err = AnalyzerConfig::new("in", "").validate().unwrap_err();
        assert_eq!(err.to_string(), "Please select a directory to save plots.");
    }
}
