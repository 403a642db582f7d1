// ==========================================
// Kitchen AI - Untyped Dataset Intake
// ==========================================
// JSON array of objects -> RawRow list, with the structural checks
// (array / mapping / non-empty) that typed rows get for free.
// ==========================================

use crate::domain::types::RawRow;
use crate::importer::error::StructuralError;
use serde_json::Value;

pub struct RawDataset;

impl RawDataset {
    /// Numbers and booleans become their text form; null cells are left out
    /// so they read as blank.
    pub fn from_json(value: &Value) -> Result<Vec<RawRow>, StructuralError> {
        let items = value.as_array().ok_or(StructuralError::NotAnArray)?;
        if items.is_empty() {
            return Err(StructuralError::NoRows);
        }

        items
            .iter()
            .enumerate()
            .map(|(index, item)| -> Result<RawRow, StructuralError> {
                let object = item
                    .as_object()
                    .ok_or(StructuralError::RowNotAMapping { index })?;
                Ok(object
                    .iter()
                    .filter_map(|(header, cell)| {
                        cell_text(cell).map(|text| (header.clone(), text))
                    })
                    .collect())
            })
            .collect()
    }

    pub fn from_json_str(input: &str) -> Result<Vec<RawRow>, StructuralError> {
        let value: Value = serde_json::from_str(input).map_err(|_| StructuralError::NotAnArray)?;
        Self::from_json(&value)
    }
}

fn cell_text(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
