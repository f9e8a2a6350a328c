// ============================================================
// ANOMALY REPORT RENDERING
// ============================================================
// Plain-text rendering of the duplicate / missing-value listings

use crate::domain::device::{AnomalyReport, FIELD_COUNT};

/// Placeholder shown for an absent field
pub const MISSING_PLACEHOLDER: &str = "<missing>";

const ROW_HEADER: &str = "Row";

/// Render a report as its message, followed by an aligned table when rows exist.
///
/// An empty set renders as the single "none found" line, never as an empty table.
pub fn render_report(report: &AnomalyReport) -> String {
    if report.is_none_found() {
        return report.message().to_string();
    }

    let mut table: Vec<[String; FIELD_COUNT + 1]> = Vec::with_capacity(report.rows.len() + 1);
    table.push(std::array::from_fn(|i| {
        if i == 0 {
            ROW_HEADER.to_string()
        } else {
            report.columns[i - 1].clone()
        }
    }));
    for row in &report.rows {
        table.push(std::array::from_fn(|i| {
            if i == 0 {
                row.row_number.to_string()
            } else {
                row.values[i - 1]
                    .clone()
                    .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string())
            }
        }));
    }

    let mut widths = [0usize; FIELD_COUNT + 1];
    for cells in &table {
        for (width, cell) in widths.iter_mut().zip(cells.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::from(report.message());
    for cells in &table {
        out.push('\n');
        let line = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(line.trim_end());
    }
    out
}
