// ============================================================
// DEVICE IDENTIFIER DOMAIN LAYER
// ============================================================
// Core types for the Serial Number / IMEI / IMEI2 / EID extraction
// No I/O, no async, no external dependencies beyond serde

mod cell_value;
mod device_row;
mod extraction_config;
mod extraction_outcome;
mod source_table;

pub use cell_value::CellValue;
pub use device_row::{default_columns, DeviceRow, RequiredColumns, DEFAULT_COLUMNS, FIELD_COUNT};
pub use extraction_config::{ExtractionConfig, DEFAULT_MAX_LINES};
pub use extraction_outcome::{AnomalyKind, AnomalyReport, ExtractionOutcome, OutputFile};
pub use source_table::{SourceRow, SourceTable};
