// ==========================================
// Kitchen AI - Import Error Types
// ==========================================
// Tooling: thiserror derive
// ==========================================

use crate::domain::import::ImportState;
use crate::importer::validator::ValidationReport;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Input is not a non-empty sequence of row mappings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("import data is not an array of rows")]
    NotAnArray,

    #[error("row {index} is not a mapping of column headers to values")]
    RowNotAMapping { index: usize },

    #[error("import data contains no rows")]
    NoRows,
}

/// Import pipeline error
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Input shape =====
    #[error("invalid import data: {0}")]
    Structural(#[from] StructuralError),

    #[error("{0}")]
    Validation(ValidationReport),

    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx/.xlsm/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== Persistence =====
    #[error("{context}: {source} ({committed} rows committed before the failure)")]
    Persistence {
        context: String,
        committed: usize,
        #[source]
        source: RepositoryError,
    },

    #[error("storage query failed: {0}")]
    Storage(#[from] RepositoryError),

    // ===== Session =====
    #[error("invalid import state transition: {from} -> {to}")]
    InvalidTransition { from: ImportState, to: ImportState },

    // ===== Configuration =====
    #[error("config value invalid (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ImportError {
    /// True for "fix your file" failures, false for "try again" failures.
    /// Structural failures belong to "try again".
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            ImportError::Validation(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::SheetNotFound(_)
        )
    }

    /// Failure class recorded on the import_batches audit row
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::Structural(_) => "structural",
            ImportError::Validation(_) => "validation",
            ImportError::FileNotFound(_)
            | ImportError::UnsupportedFormat(_)
            | ImportError::SheetNotFound(_)
            | ImportError::FileReadError(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_) => "file",
            ImportError::Persistence { .. } | ImportError::Storage(_) => "persistence",
            ImportError::InvalidTransition { .. } => "session",
            ImportError::ConfigValueError { .. } => "config",
            ImportError::InternalError(_) => "internal",
        }
    }

    pub fn validation_report(&self) -> Option<&ValidationReport> {
        match self {
            ImportError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;
