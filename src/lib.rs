mod app;
mod application;
mod domain;
mod infrastructure;
mod interfaces;

pub use application::use_cases::extractor::{DeviceExtractor, ExtractionRequest};
pub use application::use_cases::report::render_report;
pub use domain::device::{
    default_columns, AnomalyKind, AnomalyReport, CellValue, DeviceRow, ExtractionConfig,
    ExtractionOutcome, OutputFile, RequiredColumns, SourceRow, SourceTable, DEFAULT_COLUMNS,
    DEFAULT_MAX_LINES,
};
pub use domain::error::{AppError, Result};
pub use infrastructure::config::Settings;
pub use infrastructure::spreadsheet::{reader_for, SpreadsheetFormat, SpreadsheetReader};

pub use app::run;
