// ==========================================
// Kitchen AI - Storage Port
// ==========================================
// Abstract backend the pipeline writes through.
// Implementations: SqliteStore (rusqlite), InMemoryStore (tests / dry runs)
// Rule: no business logic here, rows in / rows out
// ==========================================

use crate::domain::types::Row;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Plain insert of one row
    async fn insert(&self, table: &str, row: Row) -> RepositoryResult<()>;

    /// Insert-or-update keyed on `conflict_key`.
    ///
    /// On conflict every column except `id` and the key columns is
    /// overwritten, so the stored id of an existing row is kept.
    ///
    /// # Returns
    /// - number of rows written (inserted + updated)
    async fn upsert_batch(
        &self,
        table: &str,
        rows: &[Row],
        conflict_key: &[&str],
    ) -> RepositoryResult<usize>;

    /// All rows of `table` owned by `organization_id`
    async fn query(&self, table: &str, organization_id: &str) -> RepositoryResult<Vec<Row>>;
}

#[async_trait]
impl<T: StoragePort + ?Sized> StoragePort for Arc<T> {
    async fn insert(&self, table: &str, row: Row) -> RepositoryResult<()> {
        (**self).insert(table, row).await
    }

    async fn upsert_batch(
        &self,
        table: &str,
        rows: &[Row],
        conflict_key: &[&str],
    ) -> RepositoryResult<usize> {
        (**self).upsert_batch(table, rows, conflict_key).await
    }

    async fn query(&self, table: &str, organization_id: &str) -> RepositoryResult<Vec<Row>> {
        (**self).query(table, organization_id).await
    }
}

/// Column / table names are interpolated into SQL; allow `[a-z0-9_]` only
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
