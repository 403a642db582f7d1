// ==========================================
// Kitchen AI - Import Pipeline
// ==========================================
// Parse -> Preview -> Validate -> Normalize -> Commit
// One ImportSession per run; each run leaves an import_batches audit row.
// Stages run one after another, storage calls are awaited one at a time.
// ==========================================

use crate::domain::food_relationship::HierarchyImportSummary;
use crate::domain::import::{ImportContext, ImportOutcome, ImportState, NormalizedRecord};
use crate::domain::types::{EntityKind, FieldValue, RawRow, Row};
use crate::importer::batch_upsert::{BatchUpsertDriver, DEFAULT_CHUNK_SIZE};
use crate::importer::contract::ColumnContract;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::hierarchy_importer::HierarchyImporter;
use crate::importer::importer_trait::SpreadsheetImporter;
use crate::importer::normalizer::RowNormalizer;
use crate::importer::session::ImportSession;
use crate::importer::validator::RowValidator;
use crate::repository::StoragePort;
use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Audit table written once per run
pub const IMPORT_BATCHES_TABLE: &str = "import_batches";

pub struct ImportPipeline<S: StoragePort> {
    storage: S,
    chunk_size: usize,
    default_sheet: Option<String>,
    parser: UniversalFileParser,
    validator: RowValidator,
    normalizer: RowNormalizer,
}

/// Counters collected while a run advances
struct RunTally {
    total_rows: usize,
    skipped_rows: usize,
    committed: usize,
    hierarchy: Option<HierarchyImportSummary>,
}

impl RunTally {
    fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            skipped_rows: 0,
            committed: 0,
            hierarchy: None,
        }
    }
}

impl<S: StoragePort> ImportPipeline<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_sheet: None,
            parser: UniversalFileParser,
            validator: RowValidator,
            normalizer: RowNormalizer::new(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sheet used by `import_file` when the caller names none
    pub fn with_default_sheet(mut self, sheet: Option<String>) -> Self {
        self.default_sheet = sheet;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Validate and normalize without touching storage
    pub fn preview(
        &self,
        entity: EntityKind,
        rows: &[RawRow],
        ctx: &ImportContext,
    ) -> ImportResult<Vec<NormalizedRecord>> {
        let contract = ColumnContract::for_entity(entity);
        self.validator.validate(rows, &contract)?;
        Ok(self.normalizer.normalize(rows, &contract, ctx))
    }

    // ==========================================
    // Run driver
    // ==========================================

    /// Drive a session that already reached SheetParsed to a terminal state
    async fn run(
        &self,
        mut session: ImportSession,
        rows: &[RawRow],
        ctx: &ImportContext,
        file_name: Option<String>,
    ) -> ImportResult<ImportOutcome> {
        let started = Instant::now();
        let entity = session.entity();
        let mut tally = RunTally::new(rows.len());

        let result = self.advance(&mut session, rows, ctx, &mut tally).await;

        let elapsed = started.elapsed();
        let outcome = Self::outcome(&session, tally, elapsed);
        self.record_batch(&outcome, file_name, ctx, result.as_ref().err())
            .await;

        match result {
            Ok(()) => {
                info!(
                    batch_id = %outcome.batch_id,
                    entity = %entity,
                    committed = outcome.committed,
                    skipped = outcome.skipped_rows,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "import committed"
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    batch_id = %outcome.batch_id,
                    entity = %entity,
                    state = %outcome.state,
                    error = %err,
                    "import failed"
                );
                Err(err)
            }
        }
    }

    fn outcome(session: &ImportSession, tally: RunTally, elapsed: Duration) -> ImportOutcome {
        ImportOutcome {
            batch_id: session.batch_id().to_string(),
            entity: session.entity(),
            total_rows: tally.total_rows,
            skipped_rows: tally.skipped_rows,
            committed: tally.committed,
            state: session.state(),
            hierarchy: tally.hierarchy,
            elapsed,
        }
    }

    async fn advance(
        &self,
        session: &mut ImportSession,
        rows: &[RawRow],
        ctx: &ImportContext,
        tally: &mut RunTally,
    ) -> ImportResult<()> {
        let entity = session.entity();
        let contract = ColumnContract::for_entity(entity);

        // ===== Preview / Validate =====
        // shape failures stop at Previewing; only header checks reach ValidationFailed
        session.transition(ImportState::Previewing)?;
        self.validator.check_structure(rows)?;
        session.transition(ImportState::Validating)?;
        if let Err(err) = self.validator.validate(rows, &contract) {
            session.transition(ImportState::ValidationFailed)?;
            return Err(err);
        }

        // ===== Normalize =====
        session.transition(ImportState::Normalizing)?;
        if entity == EntityKind::FoodRelationship {
            session.transition(ImportState::Committing)?;
            let importer = HierarchyImporter::new(&self.storage).with_chunk_size(self.chunk_size);
            return match importer.import(rows, ctx).await {
                Ok(summary) => {
                    tally.committed = summary.committed();
                    tally.skipped_rows = summary.skipped.len();
                    tally.hierarchy = Some(summary);
                    session.transition(ImportState::CommitSucceeded)
                }
                Err(err) => {
                    session.transition(ImportState::CommitFailed)?;
                    Err(err)
                }
            };
        }

        let records = self.normalizer.normalize(rows, &contract, ctx);
        tally.skipped_rows = rows.len() - records.len();
        let table = contract.table.ok_or_else(|| {
            ImportError::InternalError(format!("{} has no destination table", entity))
        })?;
        let storage_rows: Vec<Row> = records.iter().map(NormalizedRecord::to_row).collect();

        // ===== Commit =====
        session.transition(ImportState::Committing)?;
        let driver = BatchUpsertDriver::new(&self.storage).with_chunk_size(self.chunk_size);
        match driver.commit(table, &storage_rows, contract.conflict_key).await {
            Ok(committed) => {
                tally.committed = committed;
                session.transition(ImportState::CommitSucceeded)
            }
            Err(err) => {
                if let ImportError::Persistence { committed, .. } = &err {
                    tally.committed = *committed;
                }
                session.transition(ImportState::CommitFailed)?;
                Err(err)
            }
        }
    }

    /// Audit row; a failed write is logged and never masks the run result
    async fn record_batch(
        &self,
        outcome: &ImportOutcome,
        file_name: Option<String>,
        ctx: &ImportContext,
        failure: Option<&ImportError>,
    ) {
        let mut row = Row::new();
        row.insert("id".into(), FieldValue::text(outcome.batch_id.clone()));
        row.insert(
            "organization_id".into(),
            FieldValue::text(ctx.organization_id.clone()),
        );
        row.insert("entity".into(), FieldValue::text(outcome.entity.as_str()));
        row.insert("file_name".into(), FieldValue::from(file_name));
        row.insert("total_rows".into(), FieldValue::Number(outcome.total_rows as f64));
        row.insert(
            "skipped_rows".into(),
            FieldValue::Number(outcome.skipped_rows as f64),
        );
        row.insert(
            "committed_rows".into(),
            FieldValue::Number(outcome.committed as f64),
        );
        row.insert("state".into(), FieldValue::Text(outcome.state.to_string()));
        row.insert(
            "error_kind".into(),
            FieldValue::from(failure.map(|e| e.kind().to_string())),
        );
        row.insert(
            "error".into(),
            FieldValue::from(failure.map(|e| e.to_string())),
        );
        row.insert(
            "elapsed_ms".into(),
            FieldValue::Number(outcome.elapsed.as_millis() as f64),
        );
        row.insert("updated_at".into(), FieldValue::text(ctx.updated_at()));

        if let Err(e) = self.storage.insert(IMPORT_BATCHES_TABLE, row).await {
            warn!(batch_id = %outcome.batch_id, error = %e, "import batch audit row not written");
        }
    }
}

#[async_trait]
impl<S: StoragePort> SpreadsheetImporter for ImportPipeline<S> {
    #[instrument(skip(self, rows, ctx), fields(rows = rows.len()))]
    async fn import_rows(
        &self,
        entity: EntityKind,
        rows: &[RawRow],
        ctx: &ImportContext,
    ) -> ImportResult<ImportOutcome> {
        let session = ImportSession::with_parsed_rows(entity)?;
        self.run(session, rows, ctx, None).await
    }

    #[instrument(skip(self, ctx), fields(file = %file_path.display()))]
    async fn import_file(
        &self,
        entity: EntityKind,
        file_path: &Path,
        sheet: Option<&str>,
        ctx: &ImportContext,
    ) -> ImportResult<ImportOutcome> {
        let mut session = ImportSession::new(entity);
        session.transition(ImportState::FileSelected)?;

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        let sheet = sheet.or(self.default_sheet.as_deref());
        let started = Instant::now();
        let rows = match self.parser.parse(file_path, sheet) {
            Ok(rows) => rows,
            Err(err) => {
                let outcome = Self::outcome(&session, RunTally::new(0), started.elapsed());
                self.record_batch(&outcome, file_name, ctx, Some(&err)).await;
                error!(
                    batch_id = %outcome.batch_id,
                    entity = %entity,
                    error = %err,
                    "import failed: file not parsed"
                );
                return Err(err);
            }
        };
        session.transition(ImportState::SheetParsed)?;
        info!(batch_id = %session.batch_id(), rows = rows.len(), "sheet parsed");

        self.run(session, &rows, ctx, file_name).await
    }

    async fn import_hierarchy(
        &self,
        rows: &[RawRow],
        ctx: &ImportContext,
    ) -> ImportResult<HierarchyImportSummary> {
        let outcome = self
            .import_rows(EntityKind::FoodRelationship, rows, ctx)
            .await?;
        Ok(outcome.hierarchy.unwrap_or_default())
    }
}
