// ============================================================
// SPREADSHEET INFRASTRUCTURE LAYER
// ============================================================
// Format dispatch and calamine-backed readers for .xls / .xlsx uploads

mod calamine_reader;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::device::SourceTable;
use crate::domain::error::Result;

pub use calamine_reader::{XlsReader, XlsxReader};

/// Workbook container format, decided by the upload's file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    /// Legacy binary workbook (BIFF inside a compound file)
    Xls,
    /// Zip-based Office Open XML workbook
    Xlsx,
}

impl SpreadsheetFormat {
    /// `.xlsx` selects the XML reader; every other extension falls back to the
    /// legacy binary reader.
    pub fn from_file_name(file_name: &str) -> Self {
        match file_extension(file_name).as_deref() {
            Some("xlsx") => SpreadsheetFormat::Xlsx,
            _ => SpreadsheetFormat::Xls,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xls => "xls",
            SpreadsheetFormat::Xlsx => "xlsx",
        }
    }
}

/// Lowercased extension of `file_name`, without the dot
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Turns workbook bytes into the first worksheet's header and data rows
pub trait SpreadsheetReader: Send + Sync {
    fn format(&self) -> SpreadsheetFormat;

    fn read_table(&self, bytes: &[u8]) -> Result<SourceTable>;
}

/// Reader for a given format
pub fn reader_for(format: SpreadsheetFormat) -> &'static dyn SpreadsheetReader {
    match format {
        SpreadsheetFormat::Xls => &XlsReader,
        SpreadsheetFormat::Xlsx => &XlsxReader,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SpreadsheetFormat::from_file_name("devices.xlsx"),
            SpreadsheetFormat::Xlsx
        );
        assert_eq!(
            SpreadsheetFormat::from_file_name("DEVICES.XLSX"),
            SpreadsheetFormat::Xlsx
        );
        assert_eq!(
            SpreadsheetFormat::from_file_name("devices.xls"),
            SpreadsheetFormat::Xls
        );
        assert_eq!(
            SpreadsheetFormat::from_file_name("devices"),
            SpreadsheetFormat::Xls
        );
    }

    #[test]
    fn test_reader_dispatch() {
        assert_eq!(
            reader_for(SpreadsheetFormat::Xlsx).format(),
            SpreadsheetFormat::Xlsx
        );
        assert_eq!(reader_for(SpreadsheetFormat::Xls).format(), SpreadsheetFormat::Xls);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.b.Xls").as_deref(), Some("xls"));
        assert_eq!(file_extension("noext"), None);
    }
}
