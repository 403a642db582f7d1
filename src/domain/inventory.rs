// ==========================================
// Kitchen AI - Inventory Count
// ==========================================
// One counted line per master ingredient per count date
// ==========================================

use crate::domain::types::{row_number, row_text, FieldValue, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryCount {
    pub id: String,
    pub organization_id: String,
    pub master_ingredient_id: String,
    pub count_date: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_value: f64,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub updated_at: String,
}

impl InventoryCount {
    pub fn from_row(row: &Row) -> Self {
        let quantity = row_number(row, "quantity");
        let unit_cost = row_number(row, "unit_cost");

        Self {
            id: row_text(row, "id"),
            organization_id: row_text(row, "organization_id"),
            master_ingredient_id: row_text(row, "master_ingredient_id"),
            count_date: row_text(row, "count_date"),
            quantity,
            unit_cost,
            total_value: quantity * unit_cost,
            location: non_empty(row_text(row, "location")),
            notes: non_empty(row_text(row, "notes")),
            updated_at: row_text(row, "updated_at"),
        }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone().into());
        row.insert("organization_id".into(), self.organization_id.clone().into());
        row.insert(
            "master_ingredient_id".into(),
            self.master_ingredient_id.clone().into(),
        );
        row.insert("count_date".into(), self.count_date.clone().into());
        row.insert("quantity".into(), self.quantity.into());
        row.insert("unit_cost".into(), self.unit_cost.into());
        row.insert("total_value".into(), self.total_value.into());
        row.insert("location".into(), FieldValue::from(self.location.clone()));
        row.insert("notes".into(), FieldValue::from(self.notes.clone()));
        row.insert("updated_at".into(), self.updated_at.clone().into());
        row
    }
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}
