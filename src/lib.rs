// ==========================================
// Kitchen AI - Spreadsheet Import Library
// ==========================================
// Validation and normalization of kitchen spreadsheets
// (master ingredients, inventory counts, prepared items,
// food category hierarchy) into the SQLite store.
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain - records and value types
pub mod domain;

// Repository - storage port and adapters
pub mod repository;

// Import - contracts, validation, normalization, commit
pub mod importer;

// Configuration - config_kv
pub mod config;

// SQLite connection setup and schema
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    AllergenFlags, EntityKind, FieldValue, HierarchyImportSummary, ImportContext, ImportOutcome,
    ImportState, NormalizedRecord, RawRow, Row,
};

pub use importer::{
    ColumnContract, ImportError, ImportPipeline, ImportResult, ImportSession, RawDataset,
    RowNormalizer, RowValidator, SpreadsheetImporter, TemplateGenerator, UniversalFileParser,
    ValidationReport,
};

pub use repository::{InMemoryStore, RepositoryError, SqliteStore, StoragePort};

pub use config::{ConfigManager, ImportConfigReader, ImportSettings, StaticConfig};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Kitchen AI Import";
