// ==========================================
// Kitchen AI - Import Layer
// ==========================================
// Spreadsheet rows -> validated, normalized, persisted records
// Sources: Excel, CSV, JSON datasets
// ==========================================

pub mod batch_upsert;
pub mod coercer;
pub mod contract;
pub mod dataset;
pub mod error;
pub mod file_parser;
pub mod hierarchy_importer;
pub mod importer_trait;
pub mod normalizer;
pub mod pipeline;
pub mod session;
pub mod template;
pub mod validator;

pub use batch_upsert::{BatchUpsertDriver, DEFAULT_CHUNK_SIZE};
pub use coercer::TypeCoercer;
pub use contract::{ColumnContract, ColumnSpec};
pub use dataset::RawDataset;
pub use error::{ImportError, ImportResult, StructuralError};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use hierarchy_importer::HierarchyImporter;
pub use normalizer::RowNormalizer;
pub use pipeline::ImportPipeline;
pub use session::ImportSession;
pub use template::TemplateGenerator;
pub use validator::{RowValidator, ValidationReport, Violation, ViolationKind};

pub use importer_trait::{FileParser, SpreadsheetImporter};
