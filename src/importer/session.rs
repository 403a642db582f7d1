// ==========================================
// Kitchen AI - Import Session
// ==========================================
// One run of the import flow, from file pick to commit result.
// Every move goes through ImportState::can_transition_to.
// ==========================================

use crate::domain::import::ImportState;
use crate::domain::types::EntityKind;
use crate::importer::error::{ImportError, ImportResult};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ImportSession {
    batch_id: String,
    entity: EntityKind,
    state: ImportState,
    history: Vec<ImportState>,
}

impl ImportSession {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            batch_id: Uuid::new_v4().to_string(),
            entity,
            state: ImportState::Idle,
            history: vec![ImportState::Idle],
        }
    }

    /// Session for rows that already arrived parsed (Idle -> FileSelected -> SheetParsed)
    pub fn with_parsed_rows(entity: EntityKind) -> ImportResult<Self> {
        let mut session = Self::new(entity);
        session.transition(ImportState::FileSelected)?;
        session.transition(ImportState::SheetParsed)?;
        Ok(session)
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Every state visited, oldest first
    pub fn history(&self) -> &[ImportState] {
        &self.history
    }

    pub fn transition(&mut self, to: ImportState) -> ImportResult<()> {
        if !self.state.can_transition_to(to) {
            return Err(ImportError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!(batch_id = %self.batch_id, from = %self.state, %to, "import state change");
        self.state = to;
        self.history.push(to);
        Ok(())
    }

    /// Pick a new file: back to FileSelected under a fresh batch id
    pub fn restart(&mut self) -> ImportResult<()> {
        self.transition(ImportState::FileSelected)?;
        self.batch_id = Uuid::new_v4().to_string();
        Ok(())
    }
}
