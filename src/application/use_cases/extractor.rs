// ============================================================
// DEVICE IDENTIFIER EXTRACTOR USE CASE
// ============================================================
// Parse → select columns → report anomalies → clean → serialize → chunk

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::chunking::build_output_files;
use crate::domain::device::{
    AnomalyKind, AnomalyReport, DeviceRow, ExtractionConfig, ExtractionOutcome,
    RequiredColumns, SourceTable, FIELD_COUNT,
};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::spreadsheet::{reader_for, SpreadsheetFormat};

/// One uploaded workbook plus the user's prompt answers
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub bytes: &'a [u8],
    pub format: SpreadsheetFormat,
    pub model_name: &'a str,
    pub today_date: &'a str,
}

impl<'a> ExtractionRequest<'a> {
    /// Build a request, choosing the reader from the upload's file name
    pub fn from_upload(
        file_name: &str,
        bytes: &'a [u8],
        model_name: &'a str,
        today_date: &'a str,
    ) -> Self {
        Self {
            bytes,
            format: SpreadsheetFormat::from_file_name(file_name),
            model_name,
            today_date,
        }
    }
}

/// Extraction use case. Holds only its configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct DeviceExtractor {
    config: ExtractionConfig,
}

impl DeviceExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Read the workbook and run the whole pipeline.
    ///
    /// Fails before producing any file when the bytes are not a workbook of the
    /// declared format or a required column is missing.
    pub fn execute(&self, request: &ExtractionRequest<'_>) -> Result<ExtractionOutcome> {
        self.validate()?;

        let start = Instant::now();
        let table = reader_for(request.format)
            .read_table(request.bytes)
            .map_err(|e| {
                warn!(format = request.format.label(), error = %e, "Failed to read workbook");
                e
            })?;

        let outcome = self.process_table(&table, request.model_name, request.today_date)?;

        info!(
            format = request.format.label(),
            source_rows = table.len(),
            cleaned_rows = outcome.cleaned_rows,
            files = outcome.file_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extraction finished"
        );
        Ok(outcome)
    }

    /// Run everything after parsing on an already loaded table
    pub fn process_table(
        &self,
        table: &SourceTable,
        model_name: &str,
        today_date: &str,
    ) -> Result<ExtractionOutcome> {
        self.validate()?;

        let columns = &self.config.columns;
        let selected = select_columns(table, columns)?;

        let duplicates = find_duplicates(&selected);
        let missing = find_missing(&selected);
        debug!(
            selected = selected.len(),
            duplicates = duplicates.len(),
            missing = missing.len(),
            "Anomalies collected"
        );

        let cleaned = clean_rows(&selected);
        let lines = serialize_rows(&cleaned);
        let files = build_output_files(&lines, self.config.max_lines, model_name, today_date);

        if files.is_empty() {
            warn!(
                selected = selected.len(),
                "No rows left after cleaning; no output files created"
            );
        }

        Ok(ExtractionOutcome {
            duplicates: AnomalyReport::new(AnomalyKind::Duplicates, columns.clone(), duplicates),
            missing_values: AnomalyReport::new(
                AnomalyKind::MissingValues,
                columns.clone(),
                missing,
            ),
            files,
            selected_rows: selected.len(),
            cleaned_rows: lines.len(),
        })
    }

    fn validate(&self) -> Result<()> {
        self.config.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid extraction config: {}", e))
        })
    }
}

/// Project the table onto `columns`, in that order.
///
/// Header matching is exact and case-sensitive; every absent column is named
/// in the error.
pub fn select_columns(table: &SourceTable, columns: &RequiredColumns) -> Result<Vec<DeviceRow>> {
    let mut indices = [0usize; FIELD_COUNT];
    let mut absent = Vec::new();
    for (slot, name) in indices.iter_mut().zip(columns.iter()) {
        match table.column_index(name) {
            Some(index) => *slot = index,
            None => absent.push(name.as_str()),
        }
    }

    if !absent.is_empty() {
        return Err(AppError::SchemaError(format!(
            "Missing required column(s): {}",
            absent.join(", ")
        )));
    }

    Ok(table
        .rows
        .iter()
        .map(|row| {
            DeviceRow::new(
                row.row_number,
                indices.map(|index| row.cell(index).canonical_text()),
            )
        })
        .collect())
}

/// Rows that repeat an earlier row exactly; the first occurrence is never included
pub fn find_duplicates(rows: &[DeviceRow]) -> Vec<DeviceRow> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|row| !seen.insert(&row.values))
        .cloned()
        .collect()
}

/// Rows with at least one absent field, duplicates included
pub fn find_missing(rows: &[DeviceRow]) -> Vec<DeviceRow> {
    rows.iter().filter(|row| row.has_missing()).cloned().collect()
}

/// First occurrences only, then without rows that have an absent field
pub fn clean_rows(rows: &[DeviceRow]) -> Vec<&DeviceRow> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|row| seen.insert(&row.values))
        .filter(|row| !row.has_missing())
        .collect()
}

/// Comma-joined line per cleaned row
pub fn serialize_rows(rows: &[&DeviceRow]) -> Vec<String> {
    rows.iter().filter_map(|row| row.to_line()).collect()
}
