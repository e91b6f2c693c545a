//! Configuration structures for the extraction and report pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::batch::BatchPolicy;
use crate::report::StyleProfile;

/// Main configuration for exento.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExentoConfig {
    /// Report output configuration.
    pub report: ReportConfig,

    /// Batch extraction configuration.
    pub batch: BatchConfig,
}

/// Report output configuration.
///
/// The sheet name, title and column labels are fixed; only presentation is
/// configurable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the report file is written into.
    pub output_dir: PathBuf,

    /// Style of the merged title band.
    pub title_style: StyleProfile,

    /// Style of the header band.
    pub header_style: StyleProfile,

    /// Style of the data band.
    pub data_style: StyleProfile,

    /// Size columns to their longest value.
    pub autofit_columns: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            title_style: StyleProfile::title(),
            header_style: StyleProfile::header(),
            data_style: StyleProfile::data(),
            autofit_columns: true,
        }
    }
}

/// Batch extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents extracted concurrently.
    pub jobs: usize,

    /// Skip failing documents instead of aborting the batch.
    pub continue_on_error: bool,

    /// Report semantic issues of extracted records as warnings.
    pub validate: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            continue_on_error: false,
            validate: false,
        }
    }
}

impl BatchConfig {
    /// The failure policy selected by this configuration.
    pub fn policy(&self) -> BatchPolicy {
        if self.continue_on_error {
            BatchPolicy::SkipFailed
        } else {
            BatchPolicy::FailFast
        }
    }
}

impl ExentoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ExentoConfig =
            serde_json::from_str(r#"{ "batch": { "jobs": 8 } }"#).unwrap();

        assert_eq!(config.batch.jobs, 8);
        assert!(!config.batch.continue_on_error);
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn test_policy_from_config() {
        let mut batch = BatchConfig::default();
        assert_eq!(batch.policy(), BatchPolicy::FailFast);

        batch.continue_on_error = true;
        assert_eq!(batch.policy(), BatchPolicy::SkipFailed);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ExentoConfig::default();
        config.report.header_style.font_size = 16.0;
        config.save(&path).unwrap();

        let loaded = ExentoConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
