// ==========================================
// Kitchen AI - Import Domain Objects
// ==========================================
// Import context, normalized record sum type,
// per-invocation state and outcome
// ==========================================

use crate::domain::food_relationship::HierarchyImportSummary;
use crate::domain::ingredient::MasterIngredient;
use crate::domain::inventory::InventoryCount;
use crate::domain::prepared_item::PreparedItem;
use crate::domain::types::{EntityKind, Row};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ==========================================
// ImportContext
// ==========================================
// Passed explicitly into every stage; nothing is read from ambient state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportContext {
    pub organization_id: String,
    /// Capture time, used for generated ids and `updated_at`
    pub captured_at: DateTime<Utc>,
    /// Business date applied to inventory counts
    pub count_date: NaiveDate,
}

impl ImportContext {
    pub fn new(organization_id: impl Into<String>) -> Self {
        let captured_at = Utc::now();
        Self {
            organization_id: organization_id.into(),
            captured_at,
            count_date: captured_at.date_naive(),
        }
    }

    pub fn at(organization_id: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            organization_id: organization_id.into(),
            captured_at,
            count_date: captured_at.date_naive(),
        }
    }

    pub fn with_count_date(mut self, count_date: NaiveDate) -> Self {
        self.count_date = count_date;
        self
    }

    /// ISO-8601 timestamp stamped on every record of the batch
    pub fn updated_at(&self) -> String {
        self.captured_at.to_rfc3339()
    }
}

// ==========================================
// NormalizedRecord
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "kebab-case")]
pub enum NormalizedRecord {
    MasterIngredient(MasterIngredient),
    InventoryCount(InventoryCount),
    PreparedItem(PreparedItem),
}

impl NormalizedRecord {
    pub fn entity(&self) -> EntityKind {
        match self {
            NormalizedRecord::MasterIngredient(_) => EntityKind::MasterIngredient,
            NormalizedRecord::InventoryCount(_) => EntityKind::InventoryCount,
            NormalizedRecord::PreparedItem(_) => EntityKind::PreparedItem,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            NormalizedRecord::MasterIngredient(r) => &r.id,
            NormalizedRecord::InventoryCount(r) => &r.id,
            NormalizedRecord::PreparedItem(r) => &r.id,
        }
    }

    /// Display name used in previews
    pub fn name(&self) -> &str {
        match self {
            NormalizedRecord::MasterIngredient(r) => &r.product,
            NormalizedRecord::InventoryCount(r) => &r.master_ingredient_id,
            NormalizedRecord::PreparedItem(r) => &r.product,
        }
    }

    pub fn to_row(&self) -> Row {
        match self {
            NormalizedRecord::MasterIngredient(r) => r.to_row(),
            NormalizedRecord::InventoryCount(r) => r.to_row(),
            NormalizedRecord::PreparedItem(r) => r.to_row(),
        }
    }
}

// ==========================================
// ImportState
// ==========================================
// Idle -> FileSelected -> SheetParsed -> Previewing -> Validating
//   -> (ValidationFailed -> Previewing) | Normalizing -> Committing
//   -> CommitFailed | CommitSucceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportState {
    Idle,
    FileSelected,
    SheetParsed,
    Previewing,
    Validating,
    ValidationFailed,
    Normalizing,
    Committing,
    CommitFailed,
    CommitSucceeded,
}

impl ImportState {
    pub fn can_transition_to(&self, next: ImportState) -> bool {
        use ImportState::*;
        matches!(
            (self, next),
            (Idle, FileSelected)
                | (FileSelected, SheetParsed)
                | (SheetParsed, Previewing)
                | (Previewing, Validating)
                | (Validating, ValidationFailed)
                | (Validating, Normalizing)
                | (ValidationFailed, Previewing)
                | (Normalizing, Committing)
                | (Committing, CommitFailed)
                | (Committing, CommitSucceeded)
                // a new file may be picked before commit starts or once the run ended
                | (Previewing, FileSelected)
                | (ValidationFailed, FileSelected)
                | (CommitFailed, FileSelected)
                | (CommitSucceeded, FileSelected)
        )
    }

    /// No further progress without re-selecting a file
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportState::CommitFailed | ImportState::CommitSucceeded)
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportState::Idle => "IDLE",
            ImportState::FileSelected => "FILE_SELECTED",
            ImportState::SheetParsed => "SHEET_PARSED",
            ImportState::Previewing => "PREVIEWING",
            ImportState::Validating => "VALIDATING",
            ImportState::ValidationFailed => "VALIDATION_FAILED",
            ImportState::Normalizing => "NORMALIZING",
            ImportState::Committing => "COMMITTING",
            ImportState::CommitFailed => "COMMIT_FAILED",
            ImportState::CommitSucceeded => "COMMIT_SUCCEEDED",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// ImportOutcome
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub entity: EntityKind,
    /// Rows handed to the pipeline
    pub total_rows: usize,
    /// Rows dropped as structurally empty (or unresolvable, for hierarchies)
    pub skipped_rows: usize,
    /// Rows written to storage
    pub committed: usize,
    pub state: ImportState,
    pub hierarchy: Option<HierarchyImportSummary>,
    #[serde(skip)]
    pub elapsed: Duration,
}
