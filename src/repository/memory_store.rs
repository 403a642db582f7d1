// ==========================================
// Kitchen AI - In-Memory Storage Adapter
// ==========================================
// Same upsert semantics as SqliteStore, kept in BTreeMaps.
// Records every upsert call and can inject a failure.
// ==========================================

use crate::domain::types::{FieldValue, Row};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage_port::StoragePort;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    tables: BTreeMap<String, Vec<Row>>,
    /// Row count of every upsert call, in call order
    upsert_calls: Vec<usize>,
    /// 1-based upsert call that fails
    fail_on_call: Option<usize>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the n-th (1-based) upsert call fail without writing
    pub fn fail_on_upsert_call(&self, call: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_on_call = Some(call);
        }
    }

    pub fn upsert_calls(&self) -> Vec<usize> {
        self.state
            .lock()
            .map(|s| s.upsert_calls.clone())
            .unwrap_or_default()
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state
            .lock()
            .map(|s| s.tables.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn count(&self, table: &str) -> usize {
        self.rows(table).len()
    }
}

fn same_key(a: &Row, b: &Row, conflict_key: &[&str]) -> bool {
    conflict_key
        .iter()
        .all(|k| a.get(*k).unwrap_or(&FieldValue::Null) == b.get(*k).unwrap_or(&FieldValue::Null))
}

#[async_trait]
impl StoragePort for InMemoryStore {
    async fn insert(&self, table: &str, row: Row) -> RepositoryResult<()> {
        let mut state = self.state.lock()?;
        state.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn upsert_batch(
        &self,
        table: &str,
        rows: &[Row],
        conflict_key: &[&str],
    ) -> RepositoryResult<usize> {
        if conflict_key.is_empty() {
            return Err(RepositoryError::EmptyConflictKey(table.to_string()));
        }

        let mut state = self.state.lock()?;
        state.upsert_calls.push(rows.len());
        if state.fail_on_call == Some(state.upsert_calls.len()) {
            return Err(RepositoryError::DatabaseQueryError(format!(
                "injected failure on upsert call {}",
                state.upsert_calls.len()
            )));
        }

        let stored = state.tables.entry(table.to_string()).or_default();
        for row in rows {
            match stored.iter_mut().find(|existing| same_key(existing, row, conflict_key)) {
                Some(existing) => {
                    for (column, value) in row {
                        if column != "id" && !conflict_key.contains(&column.as_str()) {
                            existing.insert(column.clone(), value.clone());
                        }
                    }
                }
                None => stored.push(row.clone()),
            }
        }
        Ok(rows.len())
    }

    async fn query(&self, table: &str, organization_id: &str) -> RepositoryResult<Vec<Row>> {
        let state = self.state.lock()?;
        Ok(state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| {
                        r.get("organization_id").map(|v| v.as_text()) == Some(organization_id)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, code: &str, price: f64) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), FieldValue::text(id));
        row.insert("organization_id".into(), FieldValue::text("org-1"));
        row.insert("item_code".into(), FieldValue::text(code));
        row.insert("case_price".into(), FieldValue::Number(price));
        row
    }

    #[tokio::test]
    async fn test_upsert_keeps_existing_id() {
        let store = InMemoryStore::new();
        let key = ["organization_id", "item_code"];
        store
            .upsert_batch("master_ingredients", &[item("a", "B1", 10.0)], &key)
            .await
            .unwrap();
        store
            .upsert_batch("master_ingredients", &[item("b", "B1", 12.0)], &key)
            .await
            .unwrap();

        let rows = store.rows("master_ingredients");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&FieldValue::text("a")));
        assert_eq!(rows[0].get("case_price"), Some(&FieldValue::Number(12.0)));
        assert_eq!(store.upsert_calls(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_injected_failure_writes_nothing() {
        let store = InMemoryStore::new();
        store.fail_on_upsert_call(1);
        let result = store
            .upsert_batch("master_ingredients", &[item("a", "B1", 10.0)], &["item_code"])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count("master_ingredients"), 0);
    }
}
