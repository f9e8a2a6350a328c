// ============================================================
// EXTRACTION OUTCOME
// ============================================================
// Reports and in-memory output files returned by one extraction

use serde::{Deserialize, Serialize};

use super::device_row::{DeviceRow, RequiredColumns};

/// Which informational set a report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnomalyKind {
    Duplicates,
    MissingValues,
}

impl AnomalyKind {
    /// Heading printed above a non-empty listing
    pub fn found_message(&self) -> &'static str {
        match self {
            AnomalyKind::Duplicates => "Duplicates found:",
            AnomalyKind::MissingValues => "Rows with missing values found:",
        }
    }

    /// Message printed instead of an empty listing
    pub fn none_found_message(&self) -> &'static str {
        match self {
            AnomalyKind::Duplicates => "No duplicates found.",
            AnomalyKind::MissingValues => "No missing values found.",
        }
    }
}

/// Duplicate or missing-value rows of the selected table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub kind: AnomalyKind,
    pub columns: RequiredColumns,
    pub rows: Vec<DeviceRow>,
}

impl AnomalyReport {
    pub fn new(kind: AnomalyKind, columns: RequiredColumns, rows: Vec<DeviceRow>) -> Self {
        Self { kind, columns, rows }
    }

    /// True when the set is empty and the report is the explicit "none found"
    pub fn is_none_found(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn message(&self) -> &'static str {
        if self.is_none_found() {
            self.kind.none_found_message()
        } else {
            self.kind.found_message()
        }
    }
}

/// A downloadable text file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub file_name: String,
    pub content: String,
    pub line_count: usize,
}

/// Everything one extraction call produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub duplicates: AnomalyReport,
    pub missing_values: AnomalyReport,
    pub files: Vec<OutputFile>,

    /// Rows in the selected table
    pub selected_rows: usize,

    /// Rows that survived cleaning
    pub cleaned_rows: usize,
}

impl ExtractionOutcome {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// False when cleaning removed every row and no file was produced
    pub fn has_output(&self) -> bool {
        !self.files.is_empty()
    }

    /// Closing line shown to the user
    pub fn summary(&self) -> String {
        if self.has_output() {
            format!("Created {} output files.", self.file_count())
        } else {
            "No output files created: no rows remained after removing duplicates and rows with missing values.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::default_columns;

    fn outcome(files: Vec<OutputFile>) -> ExtractionOutcome {
        ExtractionOutcome {
            duplicates: AnomalyReport::new(AnomalyKind::Duplicates, default_columns(), Vec::new()),
            missing_values: AnomalyReport::new(
                AnomalyKind::MissingValues,
                default_columns(),
                Vec::new(),
            ),
            selected_rows: 0,
            cleaned_rows: files.iter().map(|f| f.line_count).sum(),
            files,
        }
    }

    #[test]
    fn test_none_found_messages() {
        let report = AnomalyReport::new(AnomalyKind::Duplicates, default_columns(), Vec::new());
        assert!(report.is_none_found());
        assert_eq!(report.message(), "No duplicates found.");

        let row = DeviceRow::new(3, [Some("S1".into()), None, None, None]);
        let report = AnomalyReport::new(AnomalyKind::MissingValues, default_columns(), vec![row]);
        assert!(!report.is_none_found());
        assert_eq!(report.message(), "Rows with missing values found:");
    }

    #[test]
    fn test_summary_is_explicit_for_zero_files() {
        let empty = outcome(Vec::new());
        assert!(!empty.has_output());
        assert!(empty.summary().starts_with("No output files created"));

        let one = outcome(vec![OutputFile {
            file_name: "M_SN_IMEI1_IMEI2_EID_010124_1.txt".into(),
            content: "S1,I1,I2,E1".into(),
            line_count: 1,
        }]);
        assert_eq!(one.summary(), "Created 1 output files.");
    }
}
