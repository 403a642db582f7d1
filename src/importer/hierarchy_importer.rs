// ==========================================
// Kitchen AI - Food Relationship Hierarchy Importer
// ==========================================
// Three passes over one sheet:
//   1. groups
//   2. categories, parent resolved against stored groups by name
//   3. sub-categories, parent resolved against stored categories by name
// Unresolvable parents are skipped with a warning, never fatal.
// Header checks belong to the caller (ImportPipeline runs RowValidator first).
// ==========================================

use crate::domain::food_relationship::{FoodNode, HierarchyImportSummary, HierarchyLevel, SkippedRow};
use crate::domain::import::ImportContext;
use crate::domain::types::{row_text, RawRow, Row};
use crate::importer::batch_upsert::{BatchUpsertDriver, DEFAULT_CHUNK_SIZE};
use crate::importer::coercer::TypeCoercer;
use crate::importer::contract::{food_relationship, ColumnContract};
use crate::importer::error::ImportResult;
use crate::importer::normalizer::RowNormalizer;
use crate::repository::StoragePort;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// One sheet row after text coercion
#[derive(Debug, Clone)]
struct HierarchyRow {
    ordinal: usize,
    level: HierarchyLevel,
    name: String,
    description: String,
    parent: String,
    icon: String,
    color: String,
}

pub struct HierarchyImporter<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
    chunk_size: usize,
    contract: ColumnContract,
}

impl<'a, S: StoragePort + ?Sized> HierarchyImporter<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            chunk_size: DEFAULT_CHUNK_SIZE,
            contract: food_relationship(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[instrument(skip(self, rows, ctx), fields(rows = rows.len(), org = %ctx.organization_id))]
    pub async fn import(
        &self,
        rows: &[RawRow],
        ctx: &ImportContext,
    ) -> ImportResult<HierarchyImportSummary> {
        let mut summary = HierarchyImportSummary::default();
        let parsed = self.parse_rows(rows, &mut summary);

        // === Pass 1: groups ===
        let groups: Vec<FoodNode> = self
            .rows_at(&parsed, HierarchyLevel::Group)
            .enumerate()
            .map(|(order, row)| self.node(row, HierarchyLevel::Group, None, order, ctx))
            .collect();
        summary.groups = self.commit(HierarchyLevel::Group, &groups).await?;

        // === Pass 2: categories ===
        let group_ids = self.name_index(HierarchyLevel::Group, ctx).await?;
        let categories =
            self.resolve_level(&parsed, HierarchyLevel::Category, &group_ids, ctx, &mut summary);
        summary.categories = self.commit(HierarchyLevel::Category, &categories).await?;

        // === Pass 3: sub-categories ===
        let category_ids = self.name_index(HierarchyLevel::Category, ctx).await?;
        let sub_categories = self.resolve_level(
            &parsed,
            HierarchyLevel::SubCategory,
            &category_ids,
            ctx,
            &mut summary,
        );
        summary.sub_categories = self
            .commit(HierarchyLevel::SubCategory, &sub_categories)
            .await?;

        info!(
            groups = summary.groups,
            categories = summary.categories,
            sub_categories = summary.sub_categories,
            skipped = summary.skipped.len(),
            "food relationship import complete"
        );
        Ok(summary)
    }

    /// Drop padding rows, coerce text, reject unknown `Type` values
    fn parse_rows(&self, rows: &[RawRow], summary: &mut HierarchyImportSummary) -> Vec<HierarchyRow> {
        let coercer = TypeCoercer;
        let normalizer = RowNormalizer::new();
        let text = |row: &RawRow, header: &str| coercer.coerce_text(coercer.cell(row, header).unwrap_or(""));

        let mut parsed = Vec::new();
        for (ordinal, row) in rows.iter().enumerate() {
            if normalizer.is_structurally_empty(row, &self.contract) {
                continue;
            }
            let name = text(row, "Name");
            let raw_type = text(row, "Type");
            match raw_type.parse::<HierarchyLevel>() {
                Ok(level) => parsed.push(HierarchyRow {
                    ordinal,
                    level,
                    name,
                    description: text(row, "Description"),
                    parent: text(row, "Parent"),
                    icon: text(row, "Icon"),
                    color: text(row, "Color"),
                }),
                Err(reason) => {
                    warn!(row_number = ordinal + 1, name = %name, %reason, "hierarchy row skipped");
                    summary.skipped.push(SkippedRow {
                        row_number: ordinal + 1,
                        name,
                        reason,
                    });
                }
            }
        }
        parsed
    }

    fn rows_at<'r>(
        &self,
        parsed: &'r [HierarchyRow],
        level: HierarchyLevel,
    ) -> impl Iterator<Item = &'r HierarchyRow> {
        parsed.iter().filter(move |r| r.level == level)
    }

    fn node(
        &self,
        row: &HierarchyRow,
        level: HierarchyLevel,
        parent_id: Option<String>,
        sort_order: usize,
        ctx: &ImportContext,
    ) -> FoodNode {
        FoodNode {
            id: RowNormalizer::record_id(level.id_prefix(), ctx, row.ordinal),
            organization_id: ctx.organization_id.clone(),
            level,
            name: row.name.clone(),
            description: row.description.clone(),
            icon: row.icon.clone(),
            color: row.color.clone(),
            parent_id,
            sort_order: sort_order as i64,
            updated_at: ctx.updated_at(),
        }
    }

    /// Build nodes of `level` whose parent name resolves; skip the rest
    fn resolve_level(
        &self,
        parsed: &[HierarchyRow],
        level: HierarchyLevel,
        parents: &HashMap<String, String>,
        ctx: &ImportContext,
        summary: &mut HierarchyImportSummary,
    ) -> Vec<FoodNode> {
        let mut nodes = Vec::new();
        for row in self.rows_at(parsed, level) {
            match parents.get(&name_key(&row.parent)) {
                Some(parent_id) => {
                    let order = nodes.len();
                    nodes.push(self.node(row, level, Some(parent_id.clone()), order, ctx));
                }
                None => {
                    let reason = format!("parent '{}' not found for {}", row.parent, level);
                    warn!(
                        row_number = row.ordinal + 1,
                        name = %row.name,
                        parent = %row.parent,
                        "hierarchy row skipped: unresolved parent"
                    );
                    summary.skipped.push(SkippedRow {
                        row_number: row.ordinal + 1,
                        name: row.name.clone(),
                        reason,
                    });
                }
            }
        }
        nodes
    }

    async fn commit(&self, level: HierarchyLevel, nodes: &[FoodNode]) -> ImportResult<usize> {
        let rows: Vec<Row> = nodes.iter().map(FoodNode::to_row).collect();
        BatchUpsertDriver::new(self.storage)
            .with_chunk_size(self.chunk_size)
            .commit(level.table(), &rows, level.conflict_key())
            .await
    }

    /// Stored names of `level` -> id; first stored row wins on duplicate names
    async fn name_index(
        &self,
        level: HierarchyLevel,
        ctx: &ImportContext,
    ) -> ImportResult<HashMap<String, String>> {
        let stored = self.storage.query(level.table(), &ctx.organization_id).await?;
        let mut index = HashMap::new();
        for row in &stored {
            index
                .entry(name_key(&row_text(row, "name")))
                .or_insert_with(|| row_text(row, "id"));
        }
        Ok(index)
    }
}

/// Parent references match names case-insensitively, ignoring outer whitespace
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
