// ==========================================
// Kitchen AI - Prepared Item
// ==========================================
// In-house prep (sauces, portioned proteins, ...) with
// station, container and recipe-unit costing
// ==========================================

use crate::domain::allergen::AllergenFlags;
use crate::domain::types::{row_number, row_text, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedItem {
    pub id: String,
    pub organization_id: String,
    pub item_id: String,
    pub category: String,
    pub product: String,
    pub station: String,
    pub sub_category: String,
    pub storage_area: String,
    pub container: String,
    pub container_type: String,
    pub shelf_life: String,
    pub recipe_unit: String,
    pub cost_per_recipe_unit: f64,
    pub yield_percent: f64,
    pub final_cost: f64,
    pub allergens: AllergenFlags,
    pub updated_at: String,
}

impl PreparedItem {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row_text(row, "id"),
            organization_id: row_text(row, "organization_id"),
            item_id: row_text(row, "item_id"),
            category: row_text(row, "category"),
            product: row_text(row, "product"),
            station: row_text(row, "station"),
            sub_category: row_text(row, "sub_category"),
            storage_area: row_text(row, "storage_area"),
            container: row_text(row, "container"),
            container_type: row_text(row, "container_type"),
            shelf_life: row_text(row, "shelf_life"),
            recipe_unit: row_text(row, "recipe_unit"),
            cost_per_recipe_unit: row_number(row, "cost_per_recipe_unit"),
            yield_percent: row_number(row, "yield_percent"),
            final_cost: row_number(row, "final_cost"),
            allergens: AllergenFlags::from_row(row),
            updated_at: row_text(row, "updated_at"),
        }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone().into());
        row.insert("organization_id".into(), self.organization_id.clone().into());
        row.insert("item_id".into(), self.item_id.clone().into());
        row.insert("category".into(), self.category.clone().into());
        row.insert("product".into(), self.product.clone().into());
        row.insert("station".into(), self.station.clone().into());
        row.insert("sub_category".into(), self.sub_category.clone().into());
        row.insert("storage_area".into(), self.storage_area.clone().into());
        row.insert("container".into(), self.container.clone().into());
        row.insert("container_type".into(), self.container_type.clone().into());
        row.insert("shelf_life".into(), self.shelf_life.clone().into());
        row.insert("recipe_unit".into(), self.recipe_unit.clone().into());
        row.insert(
            "cost_per_recipe_unit".into(),
            self.cost_per_recipe_unit.into(),
        );
        row.insert("yield_percent".into(), self.yield_percent.into());
        row.insert("final_cost".into(), self.final_cost.into());
        self.allergens.write_row(&mut row);
        row.insert("updated_at".into(), self.updated_at.clone().into());
        row
    }
}
