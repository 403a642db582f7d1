// ==========================================
// Kitchen AI - Row Validator
// ==========================================
// Header presence check against a column contract.
// Collects every missing required column before failing.
// ==========================================

use crate::domain::types::{ColumnSection, EntityKind, RawRow};
use crate::importer::contract::ColumnContract;
use crate::importer::error::{ImportError, ImportResult, StructuralError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    MissingColumn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub column: String,
    pub description: String,
    pub section: ColumnSection,
}

// ==========================================
// ValidationReport
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub entity: EntityKind,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            violations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn missing_in(&self, section: ColumnSection) -> Vec<&str> {
        self.violations
            .iter()
            .filter(|v| v.section == section)
            .map(|v| v.column.as_str())
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.entity.display_name();
        writeln!(f, "Missing required columns for {} import.", entity)?;

        for section in ColumnSection::ORDERED {
            let missing = self.missing_in(section);
            if missing.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}:", section.heading())?;
            for column in missing {
                writeln!(f, "  - {}", column)?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "Download the {} template and copy its header row into your file.",
            entity
        )
    }
}

// ==========================================
// RowValidator
// ==========================================
pub struct RowValidator;

impl RowValidator {
    /// Fails with a structural error on empty input, otherwise with a single
    /// report listing every missing required column.
    ///
    /// Only the first row's key set is inspected as the sheet header.
    pub fn validate(&self, rows: &[RawRow], contract: &ColumnContract) -> ImportResult<()> {
        self.check_structure(rows)?;
        let first = rows.first().ok_or(StructuralError::NoRows)?;
        let headers: HashSet<&str> = first.keys().map(String::as_str).collect();

        let report = self.check_headers(&headers, contract);
        if report.is_empty() {
            debug!(
                entity = %contract.entity,
                rows = rows.len(),
                "header row satisfies column contract"
            );
            return Ok(());
        }

        warn!(
            entity = %contract.entity,
            missing = report.len(),
            "import rejected: required columns missing"
        );
        Err(ImportError::Validation(report))
    }

    /// Shape check alone: at least one row to take the header from
    pub fn check_structure(&self, rows: &[RawRow]) -> ImportResult<()> {
        if rows.is_empty() {
            return Err(StructuralError::NoRows.into());
        }
        Ok(())
    }

    /// Report for an explicit header set; never fails
    pub fn check_headers(&self, headers: &HashSet<&str>, contract: &ColumnContract) -> ValidationReport {
        let mut report = ValidationReport::new(contract.entity);

        // section order first, contract order within a section
        for section in ColumnSection::ORDERED {
            for column in contract
                .required_columns()
                .filter(|c| c.section == section)
            {
                if !headers.contains(column.source_header.as_str()) {
                    report.violations.push(Violation {
                        kind: ViolationKind::MissingColumn,
                        column: column.source_header.clone(),
                        description: format!(
                            "required column '{}' (maps to {}) is missing",
                            column.source_header, column.target_field
                        ),
                        section,
                    });
                }
            }
        }

        report
    }
}
