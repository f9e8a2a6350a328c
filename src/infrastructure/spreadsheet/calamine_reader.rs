use std::fmt::Display;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use tracing::{debug, warn};

use super::{SpreadsheetFormat, SpreadsheetReader};
use crate::domain::device::{CellValue, SourceRow, SourceTable};
use crate::domain::error::{AppError, Result};

/// Date-formatted cells render as `2024-01-02 00:00:00`
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads `.xlsx` workbooks
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReader;

/// Reads legacy `.xls` workbooks
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsReader;

impl SpreadsheetReader for XlsxReader {
    fn format(&self) -> SpreadsheetFormat {
        SpreadsheetFormat::Xlsx
    }

    fn read_table(&self, bytes: &[u8]) -> Result<SourceTable> {
        guarded(self.format(), || read_first_sheet::<Xlsx<_>>(bytes, self.format()))
    }
}

impl SpreadsheetReader for XlsReader {
    fn format(&self) -> SpreadsheetFormat {
        SpreadsheetFormat::Xls
    }

    fn read_table(&self, bytes: &[u8]) -> Result<SourceTable> {
        guarded(self.format(), || read_first_sheet::<Xls<_>>(bytes, self.format()))
    }
}

/// calamine has panicked on malformed BIFF input before; a broken upload must
/// surface as a parse error rather than take the worker down.
fn guarded<F>(format: SpreadsheetFormat, read: F) -> Result<SourceTable>
where
    F: FnOnce() -> Result<SourceTable>,
{
    panic::catch_unwind(AssertUnwindSafe(read)).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!(format = format.label(), detail = %detail, "Spreadsheet reader panicked");
        Err(AppError::ParseError(format!(
            "The file could not be read as {}: {}",
            format.label(),
            detail
        )))
    })
}

fn read_first_sheet<'a, R>(bytes: &'a [u8], format: SpreadsheetFormat) -> Result<SourceTable>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: Display,
{
    let mut workbook: R = open_workbook_from_rs(Cursor::new(bytes)).map_err(|e| {
        AppError::ParseError(format!(
            "An error occurred while reading the {} file: {}",
            format.label(),
            e
        ))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
        .map_err(|e| {
            AppError::ParseError(format!("Failed to read worksheet range: {}", e))
        })?;

    let table = range_to_table(&range);
    debug!(
        format = format.label(),
        columns = table.headers.len(),
        rows = table.len(),
        "Worksheet loaded"
    );
    Ok(table)
}

/// First row becomes the header, the rest become data rows. Fully blank rows
/// are dropped.
fn range_to_table(range: &Range<Data>) -> SourceTable {
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows().enumerate();

    let Some((_, header_cells)) = rows.next() else {
        return SourceTable::default();
    };

    let headers = header_cells
        .iter()
        .map(|cell| to_cell_value(cell).header_text())
        .collect();

    let data_rows = rows
        .map(|(offset, cells)| {
            SourceRow::new(
                first_row + offset + 1,
                cells.iter().map(to_cell_value).collect(),
            )
        })
        .filter(|row| !row.is_blank())
        .collect();

    SourceTable::new(headers, data_rows)
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(v) => CellValue::Int(*v),
        Data::Float(v) => CellValue::Float(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(datetime) => CellValue::Temporal(datetime.format(DATETIME_FORMAT).to_string()),
            None => CellValue::Temporal(dt.to_string()),
        },
        other => CellValue::Temporal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    const LEGACY_WORKBOOK: &[u8] = include_bytes!("fixtures/devices.xls");

    fn workbook_bytes(rows: &[Vec<Option<&str>>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if let Some(value) = value {
                    worksheet
                        .write_string(r as u32, c as u16, *value)
                        .unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_headers_and_rows() {
        let bytes = workbook_bytes(&[
            vec![Some("Serial Number"), Some("IMEI"), Some("IMEI2"), Some("EID")],
            vec![Some("S1"), Some("I1"), Some("I2"), Some("E1")],
            vec![Some("S2"), Some("I3"), None, Some("E2")],
        ]);

        let table = XlsxReader.read_table(&bytes).unwrap();
        assert_eq!(table.headers, vec!["Serial Number", "IMEI", "IMEI2", "EID"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(table.rows[0].cell(0), &CellValue::Text("S1".into()));
        assert!(table.rows[1].cell(2).is_absent());
    }

    #[test]
    fn test_numeric_cells_keep_canonical_text() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "IMEI").unwrap();
        worksheet.write_number(1, 0, 356938035643809.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = XlsxReader.read_table(&bytes).unwrap();
        assert_eq!(
            table.rows[0].cell(0).canonical_text().as_deref(),
            Some("356938035643809")
        );
    }

    #[test]
    fn test_date_cells_render_as_datetime() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let date = ExcelDateTime::from_ymd(2024, 1, 2).unwrap();
        worksheet.write_string(0, 0, "EID").unwrap();
        worksheet
            .write_datetime_with_format(1, 0, &date, &date_format)
            .unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = XlsxReader.read_table(&bytes).unwrap();
        assert_eq!(
            table.rows[0].cell(0),
            &CellValue::Temporal("2024-01-02 00:00:00".into())
        );
        assert_eq!(
            table.rows[0].cell(0).canonical_text().as_deref(),
            Some("2024-01-02 00:00:00")
        );
    }

    #[test]
    fn test_legacy_workbook_reads_headers_and_rows() {
        let table = XlsReader.read_table(LEGACY_WORKBOOK).unwrap();
        assert_eq!(table.headers, vec!["Serial Number", "IMEI", "IMEI2", "EID"]);

        let numbers: Vec<usize> = table.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 4]);

        let first: Vec<Option<String>> = (0..4)
            .map(|i| table.rows[0].cell(i).canonical_text())
            .collect();
        assert_eq!(
            first,
            vec![
                Some("SN-001".to_string()),
                Some("356938035643809".to_string()),
                Some("356938035643817".to_string()),
                Some("89049032000001000000000000000001".to_string()),
            ]
        );
        assert_eq!(
            table.rows[1].cell(1).canonical_text().as_deref(),
            Some("356938035643825")
        );
        assert!(table.rows[1].cell(3).is_absent());
    }

    #[test]
    fn test_legacy_workbook_through_xlsx_reader_fails() {
        assert!(matches!(
            XlsxReader.read_table(LEGACY_WORKBOOK),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn test_blank_rows_skipped_row_numbers_kept() {
        let bytes = workbook_bytes(&[
            vec![Some("IMEI")],
            vec![Some("A")],
            vec![None],
            vec![Some("B")],
        ]);

        let table = XlsxReader.read_table(&bytes).unwrap();
        let numbers: Vec<usize> = table.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_garbage_bytes_are_parse_errors() {
        let garbage = b"definitely not a workbook";
        assert!(matches!(
            XlsxReader.read_table(garbage),
            Err(AppError::ParseError(_))
        ));
        assert!(matches!(
            XlsReader.read_table(garbage),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn test_xlsx_bytes_through_xls_reader_fail() {
        let bytes = workbook_bytes(&[vec![Some("IMEI")], vec![Some("A")]]);
        assert!(matches!(
            XlsReader.read_table(&bytes),
            Err(AppError::ParseError(_))
        ));
    }
}
