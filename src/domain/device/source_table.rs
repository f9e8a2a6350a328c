// ============================================================
// SOURCE TABLE
// ============================================================
// Uniform "rows of named columns" produced by every spreadsheet reader

use serde::{Deserialize, Serialize};

use super::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One data row of the source sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    /// 1-based row number in the worksheet (the header row is usually 1)
    pub row_number: usize,

    /// Cells in column order; may be shorter than the header row
    pub cells: Vec<CellValue>,
}

impl SourceRow {
    pub fn new(row_number: usize, cells: Vec<CellValue>) -> Self {
        Self { row_number, cells }
    }

    /// Cell at `index`, treating cells past the end of the row as empty
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    /// True when every cell is absent
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_absent)
    }
}

/// First worksheet of a spreadsheet: a header row plus data rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>, rows: Vec<SourceRow>) -> Self {
        Self { headers, rows }
    }

    /// Position of the first header that matches `name` exactly
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lookup_is_exact_and_first_wins() {
        let table = SourceTable::new(
            vec!["IMEI".into(), "imei2".into(), "IMEI".into()],
            Vec::new(),
        );
        assert_eq!(table.column_index("IMEI"), Some(0));
        assert_eq!(table.column_index("IMEI2"), None);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let row = SourceRow::new(2, vec![CellValue::Text("S1".into())]);
        assert_eq!(row.cell(0), &CellValue::Text("S1".into()));
        assert_eq!(row.cell(3), &CellValue::Empty);
    }

    #[test]
    fn test_blank_row_detection() {
        let blank = SourceRow::new(
            5,
            vec![CellValue::Empty, CellValue::Text(String::new())],
        );
        assert!(blank.is_blank());
        assert!(!SourceRow::new(6, vec![CellValue::Empty, CellValue::Text("  ".into())]).is_blank());
        assert!(!SourceRow::new(6, vec![CellValue::Int(1)]).is_blank());
    }
}
