// ==========================================
// Kitchen AI - Domain Types
// ==========================================
// Shared value types for the import pipeline:
// entity kinds, column value types, coerced field values
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// A parsed spreadsheet row: source header -> raw cell text.
///
/// A missing key and an empty cell are both treated as blank.
pub type RawRow = HashMap<String, String>;

/// A coerced row: target field -> typed value, ready for storage.
pub type Row = BTreeMap<String, FieldValue>;

// ==========================================
// Entity Kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    MasterIngredient,
    InventoryCount,
    PreparedItem,
    FoodRelationship,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::MasterIngredient,
        EntityKind::InventoryCount,
        EntityKind::PreparedItem,
        EntityKind::FoodRelationship,
    ];

    /// Identifier used on the command line and in file names
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::MasterIngredient => "master-ingredient",
            EntityKind::InventoryCount => "inventory-count",
            EntityKind::PreparedItem => "prepared-item",
            EntityKind::FoodRelationship => "food-relationship",
        }
    }

    /// Human readable name used in user-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::MasterIngredient => "master ingredient",
            EntityKind::InventoryCount => "inventory count",
            EntityKind::PreparedItem => "prepared item",
            EntityKind::FoodRelationship => "food relationship",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown entity '{}', expected one of: master-ingredient, inventory-count, prepared-item, food-relationship",
                    s
                )
            })
    }
}

// ==========================================
// Column Value Type
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Text,
    Currency,
    Percent,
    Integer,
    BooleanFlag,
}

impl ValueType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Currency | ValueType::Percent | ValueType::Integer
        )
    }
}

// ==========================================
// Column Section
// ==========================================
// Groups contract entries in the validation report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnSection {
    Core,
    Allergen,
    Custom,
}

impl ColumnSection {
    pub const ORDERED: [ColumnSection; 3] = [
        ColumnSection::Core,
        ColumnSection::Allergen,
        ColumnSection::Custom,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            ColumnSection::Core => "Required Core Fields Missing",
            ColumnSection::Allergen => "Allergen Fields Missing",
            ColumnSection::Custom => "Custom Allergen Fields Missing",
        }
    }
}

// ==========================================
// Field Value
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Text view; non-text values render as empty
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s.as_str(),
            _ => "",
        }
    }

    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Flag(true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Number(n) => *n > 0.0,
            _ => false,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

// ==========================================
// Row accessors
// ==========================================

pub fn row_text(row: &Row, field: &str) -> String {
    row.get(field)
        .map(|v| v.as_text().to_string())
        .unwrap_or_default()
}

pub fn row_number(row: &Row, field: &str) -> f64 {
    row.get(field).map(FieldValue::as_number).unwrap_or(0.0)
}
