// ==========================================
// Kitchen AI - Master Ingredient
// ==========================================
// Catalog entry for a purchasable ingredient, keyed per
// organization by vendor item code
// ==========================================

use crate::domain::allergen::AllergenFlags;
use crate::domain::types::{row_number, row_text, FieldValue, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterIngredient {
    pub id: String,
    pub organization_id: String,

    // Catalog identity
    pub item_code: String,
    pub product: String,
    pub major_group: String,
    pub category: String,
    pub sub_category: String,
    pub vendor: String,

    // Purchasing
    pub case_size: String,
    pub units_per_case: f64,
    pub case_price: f64,
    pub unit_of_measure: String,

    // Recipe costing
    pub recipe_units_per_case: f64,
    pub recipe_unit_type: String,
    pub yield_percent: f64,
    pub storage_area: String,
    pub image_url: Option<String>,

    // Derived
    pub unit_price: f64,
    pub cost_per_recipe_unit: f64,

    pub allergens: AllergenFlags,
    pub updated_at: String,
}

impl MasterIngredient {
    /// Build from a coerced row; derived prices are computed here
    pub fn from_row(row: &Row) -> Self {
        let case_price = row_number(row, "case_price");
        let units_per_case = row_number(row, "units_per_case");
        let recipe_units_per_case = row_number(row, "recipe_units_per_case");
        let image_url = Some(row_text(row, "image_url")).filter(|s| !s.is_empty());

        Self {
            id: row_text(row, "id"),
            organization_id: row_text(row, "organization_id"),
            item_code: row_text(row, "item_code"),
            product: row_text(row, "product"),
            major_group: row_text(row, "major_group"),
            category: row_text(row, "category"),
            sub_category: row_text(row, "sub_category"),
            vendor: row_text(row, "vendor"),
            case_size: row_text(row, "case_size"),
            units_per_case,
            case_price,
            unit_of_measure: row_text(row, "unit_of_measure"),
            recipe_units_per_case,
            recipe_unit_type: row_text(row, "recipe_unit_type"),
            yield_percent: row_number(row, "yield_percent"),
            storage_area: row_text(row, "storage_area"),
            image_url,
            unit_price: per_unit(case_price, units_per_case),
            cost_per_recipe_unit: per_unit(case_price, recipe_units_per_case),
            allergens: AllergenFlags::from_row(row),
            updated_at: row_text(row, "updated_at"),
        }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone().into());
        row.insert("organization_id".into(), self.organization_id.clone().into());
        row.insert("item_code".into(), self.item_code.clone().into());
        row.insert("product".into(), self.product.clone().into());
        row.insert("major_group".into(), self.major_group.clone().into());
        row.insert("category".into(), self.category.clone().into());
        row.insert("sub_category".into(), self.sub_category.clone().into());
        row.insert("vendor".into(), self.vendor.clone().into());
        row.insert("case_size".into(), self.case_size.clone().into());
        row.insert("units_per_case".into(), self.units_per_case.into());
        row.insert("case_price".into(), self.case_price.into());
        row.insert("unit_of_measure".into(), self.unit_of_measure.clone().into());
        row.insert(
            "recipe_units_per_case".into(),
            self.recipe_units_per_case.into(),
        );
        row.insert("recipe_unit_type".into(), self.recipe_unit_type.clone().into());
        row.insert("yield_percent".into(), self.yield_percent.into());
        row.insert("storage_area".into(), self.storage_area.clone().into());
        row.insert("image_url".into(), FieldValue::from(self.image_url.clone()));
        row.insert("unit_price".into(), self.unit_price.into());
        row.insert(
            "cost_per_recipe_unit".into(),
            self.cost_per_recipe_unit.into(),
        );
        self.allergens.write_row(&mut row);
        row.insert("updated_at".into(), self.updated_at.clone().into());
        row
    }
}

/// price / count, 0 when the count is not positive
pub(crate) fn per_unit(price: f64, count: f64) -> f64 {
    if count > 0.0 {
        price / count
    } else {
        0.0
    }
}
