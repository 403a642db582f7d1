// ==========================================
// Kitchen AI - Importer Traits
// ==========================================
// Interfaces only. Implementations:
//   FileParser        -> CsvParser, ExcelParser
//   SpreadsheetImporter -> ImportPipeline
// ==========================================

use crate::domain::food_relationship::HierarchyImportSummary;
use crate::domain::import::{ImportContext, ImportOutcome};
use crate::domain::types::{EntityKind, RawRow};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// Sheet names in workbook order
    fn sheet_names(&self, file_path: &Path) -> ImportResult<Vec<String>>;

    /// Parse one sheet into header -> cell text rows
    ///
    /// # Arguments
    /// - file_path: spreadsheet on disk
    /// - sheet: sheet name, first sheet when None
    ///
    /// # Returns
    /// - Ok(rows): fully blank rows already dropped
    /// - Err: FileNotFound, UnsupportedFormat, SheetNotFound, parse errors
    fn parse_to_raw_records(
        &self,
        file_path: &Path,
        sheet: Option<&str>,
    ) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// SpreadsheetImporter Trait
// ==========================================
#[async_trait]
pub trait SpreadsheetImporter: Send + Sync {
    /// Validate, normalize and commit already-parsed rows
    async fn import_rows(
        &self,
        entity: EntityKind,
        rows: &[RawRow],
        ctx: &ImportContext,
    ) -> ImportResult<ImportOutcome>;

    /// Parse a file, then the same as `import_rows`
    async fn import_file(
        &self,
        entity: EntityKind,
        file_path: &Path,
        sheet: Option<&str>,
        ctx: &ImportContext,
    ) -> ImportResult<ImportOutcome>;

    /// Group / category / sub-category sheet
    async fn import_hierarchy(
        &self,
        rows: &[RawRow],
        ctx: &ImportContext,
    ) -> ImportResult<HierarchyImportSummary>;
}
