use crate::consolidation::sweeper::DEFAULT_MAX_SWEEPS;
use crate::error::{ConsolidateError, Result};
use serde::{Deserialize, Serialize};

/// Options for one consolidation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidateOptions {
    /// Name of the root-level folder survivors are moved into
    pub target_folder_name: String,
    /// Whether empty folders are swept after consolidation
    pub cleanup_empty_folders: bool,
    /// Upper bound on folder sweeps. `None` derives the bound from the
    /// number of folders in the project.
    pub max_sweeps: Option<usize>,
    /// Label of the undo group wrapping the execution phase
    pub undo_label: String,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            target_folder_name: "Solids".into(),
            cleanup_empty_folders: true,
            max_sweeps: Some(DEFAULT_MAX_SWEEPS),
            undo_label: "Consolidate Solids".into(),
        }
    }
}

impl ConsolidateOptions {
    /// Parse options from JSON, missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_folder_name.trim().is_empty() {
            return Err(ConsolidateError::InvalidOptions(
                "target_folder_name must not be empty".into(),
            ));
        }
        if self.max_sweeps == Some(0) {
            return Err(ConsolidateError::InvalidOptions(
                "max_sweeps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
