// ==========================================
// Kitchen AI - Type Coercer
// ==========================================
// Raw cell text -> semantic value. Never fails:
// unparsable cells fall back to the column's default.
// ==========================================

use crate::domain::types::{FieldValue, RawRow, ValueType};
use crate::importer::contract::ColumnSpec;

pub struct TypeCoercer;

impl TypeCoercer {
    /// Trimmed cell text, `None` when absent or blank
    pub fn cell<'a>(&self, row: &'a RawRow, header: &str) -> Option<&'a str> {
        row.get(header)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn coerce(&self, raw: Option<&str>, spec: &ColumnSpec) -> FieldValue {
        let raw = raw.unwrap_or("");
        match spec.value_type {
            ValueType::Text => FieldValue::Text(self.coerce_text(raw)),
            ValueType::Currency => FieldValue::Number(self.coerce_currency(raw, spec.fallback)),
            ValueType::Percent => FieldValue::Number(self.coerce_percent(raw, spec.fallback)),
            ValueType::Integer => FieldValue::Number(self.coerce_number(raw, spec.fallback)),
            ValueType::BooleanFlag => FieldValue::Flag(self.coerce_flag(raw)),
        }
    }

    pub fn coerce_text(&self, raw: &str) -> String {
        raw.trim().to_string()
    }

    /// `"$1,234.50"` -> 1234.5
    pub fn coerce_currency(&self, raw: &str, fallback: f64) -> f64 {
        let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
        self.parse_finite(&cleaned).unwrap_or(fallback)
    }

    /// `"85%"` -> 85
    pub fn coerce_percent(&self, raw: &str, fallback: f64) -> f64 {
        let cleaned = raw.replace('%', "");
        self.parse_finite(&cleaned).unwrap_or(fallback)
    }

    pub fn coerce_number(&self, raw: &str, fallback: f64) -> f64 {
        self.parse_finite(raw).unwrap_or(fallback)
    }

    /// `"1"`, `"true"` (any case) or a legacy numeric flag > 0
    pub fn coerce_flag(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed == "1" || trimmed.eq_ignore_ascii_case("true") {
            return true;
        }
        self.parse_finite(trimmed).map(|n| n > 0.0).unwrap_or(false)
    }

    fn parse_finite(&self, raw: &str) -> Option<f64> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        let coercer = TypeCoercer;
        assert_eq!(coercer.coerce_currency("$1,234.50", 0.0), 1234.5);
        assert_eq!(coercer.coerce_currency(" 12 ", 0.0), 12.0);
        assert_eq!(coercer.coerce_currency("abc", 0.0), 0.0);
        assert_eq!(coercer.coerce_currency("", 0.0), 0.0);
    }

    #[test]
    fn test_percent() {
        let coercer = TypeCoercer;
        assert_eq!(coercer.coerce_percent("85%", 0.0), 85.0);
        assert_eq!(coercer.coerce_percent("n/a", 100.0), 100.0);
        assert_eq!(coercer.coerce_percent("", 100.0), 100.0);
    }

    #[test]
    fn test_number_rejects_non_finite() {
        let coercer = TypeCoercer;
        assert_eq!(coercer.coerce_number("2.5", 0.0), 2.5);
        assert_eq!(coercer.coerce_number("NaN", 0.0), 0.0);
        assert_eq!(coercer.coerce_number("inf", 0.0), 0.0);
    }

    #[test]
    fn test_flags() {
        let coercer = TypeCoercer;
        for raw in ["1", "true", "TRUE", " True ", "2"] {
            assert!(coercer.coerce_flag(raw), "{raw:?} should be true");
        }
        for raw in ["", "0", "false", "FALSE", "yes", "-1"] {
            assert!(!coercer.coerce_flag(raw), "{raw:?} should be false");
        }
    }

    #[test]
    fn test_coerce_dispatch() {
        let coercer = TypeCoercer;
        let yield_col = ColumnSpec::required("Yield %", "yield_percent", ValueType::Percent)
            .fallback(100.0);
        assert_eq!(coercer.coerce(None, &yield_col), FieldValue::Number(100.0));

        let name = ColumnSpec::required("Product Name", "product", ValueType::Text);
        assert_eq!(
            coercer.coerce(Some("  Beef "), &name),
            FieldValue::text("Beef")
        );
    }

    #[test]
    fn test_cell_blank_is_none() {
        let coercer = TypeCoercer;
        let mut row = RawRow::new();
        row.insert("Vendor".into(), "   ".into());
        row.insert("Case Price".into(), " $10 ".into());
        assert_eq!(coercer.cell(&row, "Vendor"), None);
        assert_eq!(coercer.cell(&row, "Missing"), None);
        assert_eq!(coercer.cell(&row, "Case Price"), Some("$10"));
    }
}
