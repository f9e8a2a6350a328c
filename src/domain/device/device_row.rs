// ============================================================
// DEVICE ROW
// ============================================================
// One projected row: Serial Number, IMEI, IMEI2, EID

use serde::{Deserialize, Serialize};

/// Number of identifier fields carried per row
pub const FIELD_COUNT: usize = 4;

/// Ordered column names to project onto
pub type RequiredColumns = [String; FIELD_COUNT];

/// Source headers for the four identifier fields, in output order
pub const DEFAULT_COLUMNS: [&str; FIELD_COUNT] = ["Serial Number", "IMEI", "IMEI2", "EID"];

/// A row of the selected table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRow {
    /// 1-based worksheet row the values came from
    pub row_number: usize,

    /// Canonical field texts in column order; `None` marks an absent value
    pub values: [Option<String>; FIELD_COUNT],
}

impl DeviceRow {
    pub fn new(row_number: usize, values: [Option<String>; FIELD_COUNT]) -> Self {
        Self { row_number, values }
    }

    /// True when any of the four fields is absent
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }

    /// Comma-joined line for a complete row, `None` if a field is absent
    pub fn to_line(&self) -> Option<String> {
        let fields = self
            .values
            .iter()
            .map(|value| value.as_deref())
            .collect::<Option<Vec<&str>>>()?;
        Some(fields.join(","))
    }
}

/// The fixed column set as owned strings
pub fn default_columns() -> RequiredColumns {
    DEFAULT_COLUMNS.map(str::to_string)
}
