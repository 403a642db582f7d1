// ==========================================
// Kitchen AI - Row Normalizer
// ==========================================
// Raw rows -> coerced rows -> typed records.
// Pure: no storage access, input order preserved.
// ==========================================

use crate::domain::import::{ImportContext, NormalizedRecord};
use crate::domain::ingredient::MasterIngredient;
use crate::domain::inventory::InventoryCount;
use crate::domain::prepared_item::PreparedItem;
use crate::domain::types::{EntityKind, FieldValue, RawRow, Row};
use crate::importer::coercer::TypeCoercer;
use crate::importer::contract::ColumnContract;
use tracing::debug;

pub struct RowNormalizer {
    coercer: TypeCoercer,
}

impl Default for RowNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RowNormalizer {
    pub fn new() -> Self {
        Self {
            coercer: TypeCoercer,
        }
    }

    /// `{prefix}-{captured_at_millis}-{ordinal}`, unique within one batch
    pub fn record_id(prefix: &str, ctx: &ImportContext, ordinal: usize) -> String {
        format!(
            "{}-{}-{}",
            prefix,
            ctx.captured_at.timestamp_millis(),
            ordinal
        )
    }

    /// Padding rows: name or key cell blank, whitespace-only or the literal "0"
    pub fn is_structurally_empty(&self, row: &RawRow, contract: &ColumnContract) -> bool {
        contract
            .identifying_headers()
            .into_iter()
            .any(|header| match self.coercer.cell(row, header) {
                None => true,
                Some(value) => value == "0",
            })
    }

    /// Coerce every contract column of the kept rows and stamp id,
    /// organization and `updated_at`.
    pub fn normalize_rows(
        &self,
        rows: &[RawRow],
        contract: &ColumnContract,
        ctx: &ImportContext,
    ) -> Vec<Row> {
        let updated_at = ctx.updated_at();
        let normalized: Vec<Row> = rows
            .iter()
            .enumerate()
            .filter(|(_, raw)| !self.is_structurally_empty(raw, contract))
            .map(|(ordinal, raw)| {
                let mut row = Row::new();
                for column in &contract.columns {
                    let cell = self.coercer.cell(raw, &column.source_header);
                    row.insert(
                        column.target_field.clone(),
                        self.coercer.coerce(cell, column),
                    );
                }
                row.insert(
                    "id".into(),
                    FieldValue::Text(Self::record_id(contract.id_prefix, ctx, ordinal)),
                );
                row.insert(
                    "organization_id".into(),
                    FieldValue::text(ctx.organization_id.clone()),
                );
                if contract.entity == EntityKind::InventoryCount {
                    row.insert(
                        "count_date".into(),
                        FieldValue::Text(ctx.count_date.format("%Y-%m-%d").to_string()),
                    );
                }
                row.insert("updated_at".into(), FieldValue::text(updated_at.clone()));
                row
            })
            .collect();

        debug!(
            entity = %contract.entity,
            input = rows.len(),
            kept = normalized.len(),
            "rows normalized"
        );
        normalized
    }

    /// Typed records for the single-table entities.
    ///
    /// Food-relationship rows are handled by the hierarchy importer and yield nothing here.
    pub fn normalize(
        &self,
        rows: &[RawRow],
        contract: &ColumnContract,
        ctx: &ImportContext,
    ) -> Vec<NormalizedRecord> {
        self.normalize_rows(rows, contract, ctx)
            .iter()
            .filter_map(|row| Self::to_record(contract.entity, row))
            .collect()
    }

    pub fn to_record(entity: EntityKind, row: &Row) -> Option<NormalizedRecord> {
        match entity {
            EntityKind::MasterIngredient => Some(NormalizedRecord::MasterIngredient(
                MasterIngredient::from_row(row),
            )),
            EntityKind::InventoryCount => Some(NormalizedRecord::InventoryCount(
                InventoryCount::from_row(row),
            )),
            EntityKind::PreparedItem => {
                Some(NormalizedRecord::PreparedItem(PreparedItem::from_row(row)))
            }
            EntityKind::FoodRelationship => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allergen::Allergen;
    use crate::importer::contract::{inventory_count, master_ingredient, prepared_item};
    use chrono::{TimeZone, Utc};

    fn ctx() -> ImportContext {
        ImportContext::at("org-1", Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    }

    fn ingredient_row(code: &str, name: &str) -> RawRow {
        let mut row: RawRow = master_ingredient()
            .headers()
            .into_iter()
            .map(|h| (h.to_string(), String::new()))
            .collect();
        row.insert("Item Code".into(), code.into());
        row.insert("Product Name".into(), name.into());
        row
    }

    #[test]
    fn test_scenario_single_beef_record() {
        let rows = vec![ingredient_row("B1", "Beef")];
        let records = RowNormalizer::new().normalize(&rows, &master_ingredient(), &ctx());

        assert_eq!(records.len(), 1);
        match &records[0] {
            NormalizedRecord::MasterIngredient(item) => {
                assert_eq!(item.product, "Beef");
                assert_eq!(item.item_code, "B1");
                assert_eq!(item.organization_id, "org-1");
                assert_eq!(item.updated_at, "2025-03-01T12:00:00+00:00");
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_padding_rows_are_dropped() {
        let rows = vec![
            ingredient_row("X0", "0"),
            ingredient_row("C1", "Chicken"),
            ingredient_row("X1", ""),
            ingredient_row("X2", "   "),
        ];
        let records = RowNormalizer::new().normalize(&rows, &master_ingredient(), &ctx());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "Chicken");
    }

    #[test]
    fn test_blank_key_rows_are_dropped() {
        let rows = vec![
            ingredient_row("", "Beef"),
            ingredient_row("  ", "Pork"),
            ingredient_row("0", "Lamb"),
            ingredient_row("V1", "Veal"),
        ];
        let records = RowNormalizer::new().normalize(&rows, &master_ingredient(), &ctx());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "Veal");
    }

    #[test]
    fn test_prepared_item_without_item_id_is_padding() {
        let contract = prepared_item();
        let mut row: RawRow = contract
            .headers()
            .into_iter()
            .map(|h| (h.to_string(), String::new()))
            .collect();
        row.insert("PRODUCT".into(), "Demi-Glace".into());

        let normalizer = RowNormalizer::new();
        assert!(normalizer.is_structurally_empty(&row, &contract));
        row.insert("Item ID".into(), "P100".into());
        assert!(!normalizer.is_structurally_empty(&row, &contract));
    }

    #[test]
    fn test_order_preserved_and_ids_unique() {
        let rows = vec![
            ingredient_row("A", "Apple"),
            ingredient_row("Z", ""),
            ingredient_row("B", "Basil"),
            ingredient_row("C", "Carrot"),
        ];
        let records = RowNormalizer::new().normalize(&rows, &master_ingredient(), &ctx());

        let names: Vec<&str> = records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Apple", "Basil", "Carrot"]);

        let ts = ctx().captured_at.timestamp_millis();
        assert_eq!(records[0].id(), format!("mi-{}-0", ts));
        assert_eq!(records[1].id(), format!("mi-{}-2", ts));
        assert_eq!(records[2].id(), format!("mi-{}-3", ts));
    }

    #[test]
    fn test_coercion_defaults_apply() {
        let mut row = ingredient_row("B1", "Beef");
        row.insert("Case Price".into(), "$1,234.50".into());
        row.insert("Units/Case".into(), "abc".into());
        row.insert("Yield %".into(), "".into());
        row.insert("Peanut".into(), "TRUE".into());
        row.insert("Milk".into(), "0".into());
        row.insert("Custom Allergen 1".into(), "Lupin".into());
        row.insert("Custom Allergen 1 Active".into(), "1".into());

        let records = RowNormalizer::new().normalize(&[row], &master_ingredient(), &ctx());
        let NormalizedRecord::MasterIngredient(item) = &records[0] else {
            panic!("expected master ingredient");
        };

        assert_eq!(item.case_price, 1234.5);
        assert_eq!(item.units_per_case, 0.0);
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.yield_percent, 100.0);
        assert!(item.allergens.contains(Allergen::Peanut));
        assert!(!item.allergens.contains(Allergen::Milk));
        assert_eq!(item.allergens.custom[0].name, "Lupin");
        assert!(item.allergens.custom[0].active);
        assert!(!item.allergens.custom[2].active);
    }

    #[test]
    fn test_inventory_count_gets_count_date() {
        let mut row = RawRow::new();
        row.insert("Item ID".into(), "B1".into());
        row.insert("Quantity".into(), "4".into());
        row.insert("Unit Cost".into(), "$2.50".into());

        let rows = RowNormalizer::new().normalize_rows(&[row], &inventory_count(), &ctx());

        assert_eq!(rows[0].get("count_date"), Some(&FieldValue::text("2025-03-01")));
        let record = RowNormalizer::to_record(EntityKind::InventoryCount, &rows[0]).unwrap();
        let NormalizedRecord::InventoryCount(count) = record else {
            panic!("expected inventory count");
        };
        assert_eq!(count.total_value, 10.0);
    }
}
