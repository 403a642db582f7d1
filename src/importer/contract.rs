// ==========================================
// Kitchen AI - Column Contracts
// ==========================================
// Declarative header -> field tables per importable entity.
// Drives the validator, the normalizer and the template generator.
// ==========================================

use crate::domain::allergen::{Allergen, CustomAllergen, ALLERGEN_NOTES_FIELD, CUSTOM_ALLERGEN_SLOTS};
use crate::domain::types::{ColumnSection, EntityKind, ValueType};
use serde::Serialize;
use std::collections::HashSet;

// ==========================================
// ColumnSpec - one contract entry
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    /// Exact (case-sensitive) spreadsheet header
    pub source_header: String,
    /// Persisted field name
    pub target_field: String,
    pub required: bool,
    pub value_type: ValueType,
    pub section: ColumnSection,
    /// Value used when a numeric cell cannot be parsed
    pub fallback: f64,
    /// Sample value written to the template's example row
    pub example: String,
}

impl ColumnSpec {
    fn new(header: &str, field: &str, required: bool, value_type: ValueType) -> Self {
        Self {
            source_header: header.to_string(),
            target_field: field.to_string(),
            required,
            value_type,
            section: ColumnSection::Core,
            fallback: 0.0,
            example: String::new(),
        }
    }

    pub fn required(header: &str, field: &str, value_type: ValueType) -> Self {
        Self::new(header, field, true, value_type)
    }

    pub fn optional(header: &str, field: &str, value_type: ValueType) -> Self {
        Self::new(header, field, false, value_type)
    }

    pub fn fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn example(mut self, example: &str) -> Self {
        self.example = example.to_string();
        self
    }

    pub fn section(mut self, section: ColumnSection) -> Self {
        self.section = section;
        self
    }
}

// ==========================================
// ColumnContract
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnContract {
    pub entity: EntityKind,
    pub columns: Vec<ColumnSpec>,
    /// Target field checked by the structural-emptiness filter
    pub name_field: &'static str,
    /// Identifying fields; a blank one drops the row like a blank name
    pub key_fields: &'static [&'static str],
    /// Prefix of generated record ids
    pub id_prefix: &'static str,
    /// Destination table; `None` for multi-table imports
    pub table: Option<&'static str>,
    /// Upsert conflict key on the destination table
    pub conflict_key: &'static [&'static str],
}

impl ColumnContract {
    pub fn for_entity(entity: EntityKind) -> Self {
        match entity {
            EntityKind::MasterIngredient => master_ingredient(),
            EntityKind::InventoryCount => inventory_count(),
            EntityKind::PreparedItem => prepared_item(),
            EntityKind::FoodRelationship => food_relationship(),
        }
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.required)
    }

    pub fn column_for_header(&self, header: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.source_header == header)
    }

    pub fn column_for_field(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.target_field == field)
    }

    /// Header row in contract order
    pub fn headers(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.source_header.as_str())
            .collect()
    }

    /// Header of the structural-emptiness field
    pub fn name_header(&self) -> Option<&str> {
        self.column_for_field(self.name_field)
            .map(|c| c.source_header.as_str())
    }

    /// Headers of the name field and every key field, deduplicated
    pub fn identifying_headers(&self) -> Vec<&str> {
        let mut headers: Vec<&str> = Vec::new();
        for field in std::iter::once(&self.name_field).chain(self.key_fields.iter()) {
            if let Some(column) = self.column_for_field(field) {
                if !headers.contains(&column.source_header.as_str()) {
                    headers.push(column.source_header.as_str());
                }
            }
        }
        headers
    }

    /// Uniqueness of headers and target fields, presence of the name and key fields
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut headers = HashSet::new();
        let mut fields = HashSet::new();
        for column in &self.columns {
            if !headers.insert(column.source_header.as_str()) {
                return Err(format!(
                    "{}: duplicate source header '{}'",
                    self.entity, column.source_header
                ));
            }
            if !fields.insert(column.target_field.as_str()) {
                return Err(format!(
                    "{}: duplicate target field '{}'",
                    self.entity, column.target_field
                ));
            }
        }
        if !fields.contains(self.name_field) {
            return Err(format!(
                "{}: name field '{}' not in contract",
                self.entity, self.name_field
            ));
        }
        if let Some(missing) = self.key_fields.iter().find(|f| !fields.contains(*f)) {
            return Err(format!(
                "{}: key field '{}' not in contract",
                self.entity, missing
            ));
        }
        Ok(())
    }
}

// ==========================================
// Allergen sub-contract (shared)
// ==========================================

/// Allergen flags, custom allergen pairs and the notes column
pub fn allergen_columns() -> Vec<ColumnSpec> {
    let mut columns: Vec<ColumnSpec> = Allergen::ALL
        .iter()
        .map(|a| {
            ColumnSpec::required(a.header(), &a.field(), ValueType::BooleanFlag)
                .section(ColumnSection::Allergen)
                .example(if *a == Allergen::Milk { "1" } else { "0" })
        })
        .collect();

    for slot in 1..=CUSTOM_ALLERGEN_SLOTS {
        let (name_header, active_header) = CustomAllergen::headers(slot);
        let (name_field, active_field) = CustomAllergen::fields(slot);
        columns.push(
            ColumnSpec::required(&name_header, &name_field, ValueType::Text)
                .section(ColumnSection::Custom),
        );
        columns.push(
            ColumnSpec::required(&active_header, &active_field, ValueType::BooleanFlag)
                .section(ColumnSection::Custom)
                .example("0"),
        );
    }

    columns.push(
        ColumnSpec::optional("Allergen Notes", ALLERGEN_NOTES_FIELD, ValueType::Text)
            .section(ColumnSection::Allergen),
    );
    columns
}

// ==========================================
// Entity contracts
// ==========================================

pub fn master_ingredient() -> ColumnContract {
    use ValueType::*;
    let mut columns = vec![
        ColumnSpec::required("Item Code", "item_code", Text).example("B1"),
        ColumnSpec::required("Product Name", "product", Text).example("Beef Tenderloin"),
        ColumnSpec::required("Major Group", "major_group", Text).example("Food"),
        ColumnSpec::required("Category", "category", Text).example("Proteins"),
        ColumnSpec::required("Sub-Category", "sub_category", Text).example("Beef"),
        ColumnSpec::required("Vendor", "vendor", Text).example("Sysco"),
        ColumnSpec::required("Case Size", "case_size", Text).example("2 x 5 kg"),
        ColumnSpec::required("Units/Case", "units_per_case", Integer).example("2"),
        ColumnSpec::required("Case Price", "case_price", Currency).example("$245.00"),
        ColumnSpec::required("Unit of Measure", "unit_of_measure", Text).example("kg"),
        ColumnSpec::required("Recipe Units/Case", "recipe_units_per_case", Integer)
            .example("40"),
        ColumnSpec::required("Recipe Unit Type", "recipe_unit_type", Text).example("250 g"),
        ColumnSpec::required("Yield %", "yield_percent", Percent)
            .fallback(100.0)
            .example("85%"),
        ColumnSpec::required("Storage Area", "storage_area", Text).example("Walk-in Cooler"),
        ColumnSpec::optional("Image URL", "image_url", Text),
    ];
    columns.extend(allergen_columns());

    ColumnContract {
        entity: EntityKind::MasterIngredient,
        columns,
        name_field: "product",
        key_fields: &["item_code"],
        id_prefix: "mi",
        table: Some("master_ingredients"),
        conflict_key: &["organization_id", "item_code"],
    }
}

pub fn inventory_count() -> ColumnContract {
    use ValueType::*;
    ColumnContract {
        entity: EntityKind::InventoryCount,
        columns: vec![
            ColumnSpec::required("Item ID", "master_ingredient_id", Text).example("B1"),
            ColumnSpec::required("Quantity", "quantity", Integer).example("12"),
            ColumnSpec::required("Unit Cost", "unit_cost", Currency).example("$24.50"),
            ColumnSpec::optional("Location", "location", Text).example("Walk-in Cooler"),
            ColumnSpec::optional("Notes", "notes", Text),
        ],
        name_field: "master_ingredient_id",
        key_fields: &["master_ingredient_id"],
        id_prefix: "inv",
        table: Some("inventory_counts"),
        conflict_key: &["organization_id", "master_ingredient_id", "count_date"],
    }
}

pub fn prepared_item() -> ColumnContract {
    use ValueType::*;
    let mut columns = vec![
        ColumnSpec::required("Item ID", "item_id", Text).example("P100"),
        ColumnSpec::required("CATEGORY", "category", Text).example("Sauces"),
        ColumnSpec::required("PRODUCT", "product", Text).example("Demi-Glace"),
        ColumnSpec::required("STATION", "station", Text).example("Sauce"),
        ColumnSpec::required("SUB CATEGORY", "sub_category", Text).example("Mother Sauces"),
        ColumnSpec::required("STORAGE AREA", "storage_area", Text).example("Walk-in Cooler"),
        ColumnSpec::required("CONTAINER", "container", Text).example("Cambro 4qt"),
        ColumnSpec::required("CONTAINER TYPE", "container_type", Text).example("Round"),
        ColumnSpec::required("SHELF LIFE", "shelf_life", Text).example("5 days"),
        ColumnSpec::required("RECIPE UNIT (R/U)", "recipe_unit", Text).example("1 L"),
        ColumnSpec::required("COST PER R/U", "cost_per_recipe_unit", Currency)
            .example("$6.40"),
        ColumnSpec::required("YIELD %", "yield_percent", Percent)
            .fallback(100.0)
            .example("90%"),
        ColumnSpec::required("FINAL $", "final_cost", Currency).example("$7.11"),
    ];
    columns.extend(allergen_columns());

    ColumnContract {
        entity: EntityKind::PreparedItem,
        columns,
        name_field: "product",
        key_fields: &["item_id"],
        id_prefix: "prep",
        table: Some("prepared_items"),
        conflict_key: &["organization_id", "item_id"],
    }
}

pub fn food_relationship() -> ColumnContract {
    use ValueType::*;
    ColumnContract {
        entity: EntityKind::FoodRelationship,
        columns: vec![
            ColumnSpec::required("Type", "type", Text).example("group"),
            ColumnSpec::required("Name", "name", Text).example("Food"),
            ColumnSpec::optional("Description", "description", Text)
                .example("All edible inventory"),
            ColumnSpec::optional("Parent", "parent", Text),
            ColumnSpec::optional("Icon", "icon", Text).example("Utensils"),
            ColumnSpec::optional("Color", "color", Text).example("primary"),
        ],
        name_field: "name",
        key_fields: &[],
        id_prefix: "fr",
        table: None,
        conflict_key: &[],
    }
}
