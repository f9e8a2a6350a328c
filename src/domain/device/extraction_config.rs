// ============================================================
// EXTRACTION CONFIGURATION
// ============================================================
// Per-call knobs for column projection and output chunking

use serde::{Deserialize, Serialize};

use super::device_row::{default_columns, RequiredColumns};

/// Lines per output file unless the caller asks otherwise
pub const DEFAULT_MAX_LINES: usize = 1900;

/// Configuration for one extraction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Maximum number of lines written to a single output file (default: 1900)
    pub max_lines: usize,

    /// Columns to project onto, in output order
    pub columns: RequiredColumns,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            columns: default_columns(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn with_columns(mut self, columns: RequiredColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_lines == 0 {
            return Err("max_lines must be > 0".to_string());
        }
        if self.columns.iter().any(|name| name.is_empty()) {
            return Err("column names must not be empty".to_string());
        }
        Ok(())
    }
}
