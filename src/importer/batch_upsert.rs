// ==========================================
// Kitchen AI - Batch Upsert Driver
// ==========================================
// Chunked, sequential, idempotent commit.
// A failing chunk aborts the rest; earlier chunks stay committed.
// ==========================================

use crate::domain::types::Row;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::StoragePort;
use tracing::{debug, error, info, instrument};

/// Rows per upsert request
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Context attached to commit failures
pub const PERSISTENCE_CONTEXT: &str = "Import error";

pub struct BatchUpsertDriver<'a, S: StoragePort + ?Sized> {
    storage: &'a S,
    chunk_size: usize,
}

impl<'a, S: StoragePort + ?Sized> BatchUpsertDriver<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Zero is clamped to 1
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Upsert `rows` into `table` keyed on `conflict_key`.
    ///
    /// # Returns
    /// - Ok(n): rows written across all chunks
    /// - Err(ImportError::Persistence): first failing chunk, with the
    ///   number of rows committed before it
    #[instrument(skip(self, rows, conflict_key), fields(rows = rows.len(), chunk_size = self.chunk_size))]
    pub async fn commit(
        &self,
        table: &str,
        rows: &[Row],
        conflict_key: &[&str],
    ) -> ImportResult<usize> {
        let mut committed = 0;

        for (idx, chunk) in rows.chunks(self.chunk_size).enumerate() {
            debug!(chunk = idx + 1, size = chunk.len(), "submitting chunk");
            match self.storage.upsert_batch(table, chunk, conflict_key).await {
                Ok(written) => committed += written,
                Err(source) => {
                    error!(
                        chunk = idx + 1,
                        committed,
                        error = %source,
                        "chunk upsert failed, remaining chunks skipped"
                    );
                    return Err(ImportError::Persistence {
                        context: PERSISTENCE_CONTEXT.to_string(),
                        committed,
                        source,
                    });
                }
            }
        }

        info!(table, committed, "batch upsert complete");
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FieldValue;
    use crate::repository::InMemoryStore;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("id".into(), FieldValue::Text(format!("mi-1-{}", i)));
                row.insert("organization_id".into(), FieldValue::text("org-1"));
                row.insert("item_code".into(), FieldValue::Text(format!("C{}", i)));
                row
            })
            .collect()
    }

    const KEY: [&str; 2] = ["organization_id", "item_code"];

    #[tokio::test]
    async fn test_250_rows_make_three_calls() {
        let store = InMemoryStore::new();
        let committed = BatchUpsertDriver::new(&store)
            .commit("master_ingredients", &rows(250), &KEY)
            .await
            .unwrap();

        assert_eq!(committed, 250);
        assert_eq!(store.upsert_calls(), vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let store = InMemoryStore::new();
        let driver = BatchUpsertDriver::new(&store);
        driver.commit("master_ingredients", &rows(120), &KEY).await.unwrap();
        driver.commit("master_ingredients", &rows(120), &KEY).await.unwrap();

        assert_eq!(store.count("master_ingredients"), 120);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_chunks() {
        let store = InMemoryStore::new();
        store.fail_on_upsert_call(2);

        let err = BatchUpsertDriver::new(&store)
            .commit("master_ingredients", &rows(250), &KEY)
            .await
            .unwrap_err();

        match err {
            ImportError::Persistence {
                context, committed, ..
            } => {
                assert_eq!(context, "Import error");
                assert_eq!(committed, 100);
            }
            other => panic!("unexpected error {:?}", other),
        }
        // third chunk never submitted, first chunk kept
        assert_eq!(store.upsert_calls(), vec![100, 100]);
        assert_eq!(store.count("master_ingredients"), 100);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_clamped() {
        let store = InMemoryStore::new();
        let driver = BatchUpsertDriver::new(&store).with_chunk_size(0);
        assert_eq!(driver.chunk_size(), 1);
        driver.commit("master_ingredients", &rows(3), &KEY).await.unwrap();
        assert_eq!(store.upsert_calls(), vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let store = InMemoryStore::new();
        let committed = BatchUpsertDriver::new(&store)
            .commit("master_ingredients", &[], &KEY)
            .await
            .unwrap();
        assert_eq!(committed, 0);
        assert!(store.upsert_calls().is_empty());
    }
}
