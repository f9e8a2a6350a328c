// ============================================================
// CELL VALUE
// ============================================================
// Reader-independent cell representation and its canonical text

use serde::{Deserialize, Serialize};

/// Largest magnitude at which every integral f64 is exactly representable (2^53)
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// A single spreadsheet cell, independent of the file format it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Dates, times and durations, already rendered by the reader
    Temporal(String),
    /// Cell error such as `#N/A` or `#REF!`
    Error(String),
}

impl CellValue {
    /// Whether the cell counts as an absent value.
    ///
    /// Empty cells, empty strings and cell errors are absent. Whitespace-only
    /// text is a value.
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Empty | CellValue::Error(_) => true,
            CellValue::Text(text) | CellValue::Temporal(text) => text.is_empty(),
            CellValue::Int(_) | CellValue::Bool(_) => false,
            CellValue::Float(v) => v.is_nan(),
        }
    }

    /// Canonical textual form, or `None` for absent values.
    ///
    /// Integral floats render without a fractional part so that an identifier
    /// stored as a number and the same identifier stored as text serialize
    /// identically.
    pub fn canonical_text(&self) -> Option<String> {
        if self.is_absent() {
            return None;
        }

        let text = match self {
            CellValue::Text(text) | CellValue::Temporal(text) => text.clone(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Float(v) => format_float(*v),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::Empty | CellValue::Error(_) => return None,
        };
        Some(text)
    }

    /// Header text of a cell (trimmed; empty for absent cells)
    pub fn header_text(&self) -> String {
        self.canonical_text()
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_FLOAT_INT {
        // Exact: integral and within the contiguous integer range of f64.
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_float_matches_text() {
        let numeric = CellValue::Float(356938035643809.0);
        let text = CellValue::Text("356938035643809".to_string());
        assert_eq!(numeric.canonical_text(), text.canonical_text());
        assert_eq!(numeric.canonical_text().as_deref(), Some("356938035643809"));
    }

    #[test]
    fn test_fractional_float_keeps_fraction() {
        assert_eq!(CellValue::Float(12.5).canonical_text().as_deref(), Some("12.5"));
    }

    #[test]
    fn test_huge_float_uses_float_form() {
        let value = CellValue::Float(1e20);
        assert_eq!(value.canonical_text().as_deref(), Some("100000000000000000000"));
        let value = CellValue::Float(f64::INFINITY);
        assert_eq!(value.canonical_text().as_deref(), Some("inf"));
    }

    #[test]
    fn test_absent_values() {
        assert!(CellValue::Empty.is_absent());
        assert!(CellValue::Text(String::new()).is_absent());
        assert!(CellValue::Error("#N/A".to_string()).is_absent());
        assert!(CellValue::Float(f64::NAN).is_absent());
        assert!(!CellValue::Int(0).is_absent());
        assert_eq!(CellValue::Empty.canonical_text(), None);
    }

    #[test]
    fn test_whitespace_text_is_a_value() {
        let value = CellValue::Text("   ".to_string());
        assert!(!value.is_absent());
        assert_eq!(value.canonical_text().as_deref(), Some("   "));
        assert_eq!(value.header_text(), "");
    }

    #[test]
    fn test_text_kept_verbatim() {
        let value = CellValue::Text(" 89014103211118510720".to_string());
        assert_eq!(
            value.canonical_text().as_deref(),
            Some(" 89014103211118510720")
        );
        assert_eq!(value.header_text(), "89014103211118510720");
    }

    #[test]
    fn test_bool_and_int() {
        assert_eq!(CellValue::Bool(true).canonical_text().as_deref(), Some("True"));
        assert_eq!(CellValue::Int(-42).canonical_text().as_deref(), Some("-42"));
    }
}
