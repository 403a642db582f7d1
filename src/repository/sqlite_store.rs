// ==========================================
// Kitchen AI - SQLite Storage Adapter
// ==========================================
// StoragePort over rusqlite.
// Upsert: INSERT ... ON CONFLICT(<key>) DO UPDATE SET, one transaction per call
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection, IMPORT_TABLES};
use crate::domain::types::{FieldValue, Row};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage_port::{is_valid_identifier, StoragePort};
use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::sync::{Arc, Mutex};
use tracing::debug;

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Null => ToSqlOutput::Owned(Value::Null),
            FieldValue::Flag(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            FieldValue::Number(n) => ToSqlOutput::Owned(Value::Real(*n)),
            FieldValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn field_from_sql(value: ValueRef<'_>) -> FieldValue {
    match value {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(i) => FieldValue::Number(i as f64),
        ValueRef::Real(r) => FieldValue::Number(r),
        ValueRef::Text(t) => FieldValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => FieldValue::Null,
    }
}

// ==========================================
// SqliteStore
// ==========================================
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database and bootstrap the schema
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Private in-memory database, used by tests and `--dry-run`
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection (e.g. with ConfigManager)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn.lock()?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Row count of a table, all organizations
    pub fn count(&self, table: &str) -> RepositoryResult<usize> {
        check_table(table)?;
        let conn = self.conn.lock()?;
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(n as usize)
    }
}

fn check_table(table: &str) -> RepositoryResult<()> {
    if IMPORT_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(RepositoryError::UnknownTable(table.to_string()))
    }
}

fn check_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> RepositoryResult<()> {
    for column in columns {
        if !is_valid_identifier(column) {
            return Err(RepositoryError::InvalidColumn(column.to_string()));
        }
    }
    Ok(())
}

/// INSERT ... ON CONFLICT statement for one column layout
fn upsert_sql(table: &str, columns: &[&str], conflict_key: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let updates: Vec<String> = columns
        .iter()
        .filter(|c| *c != &"id" && !conflict_key.contains(*c))
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();

    let on_conflict = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
        table,
        columns.join(", "),
        placeholders.join(", "),
        conflict_key.join(", "),
        on_conflict
    )
}

#[async_trait]
impl StoragePort for SqliteStore {
    async fn insert(&self, table: &str, row: Row) -> RepositoryResult<()> {
        check_table(table)?;
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        check_columns(columns.iter().copied())?;

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );

        let conn = self.conn.lock()?;
        conn.execute(&sql, params_from_iter(row.values()))?;
        Ok(())
    }

    async fn upsert_batch(
        &self,
        table: &str,
        rows: &[Row],
        conflict_key: &[&str],
    ) -> RepositoryResult<usize> {
        check_table(table)?;
        if conflict_key.is_empty() {
            return Err(RepositoryError::EmptyConflictKey(table.to_string()));
        }
        check_columns(conflict_key.iter().copied())?;
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut written = 0;
        for row in rows {
            let columns: Vec<&str> = row.keys().map(String::as_str).collect();
            check_columns(columns.iter().copied())?;
            let sql = upsert_sql(table, &columns, conflict_key);
            let mut stmt = tx.prepare_cached(&sql)?;
            written += stmt.execute(params_from_iter(row.values()))?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!(table, rows = rows.len(), written, "sqlite upsert committed");
        Ok(written)
    }

    async fn query(&self, table: &str, organization_id: &str) -> RepositoryResult<Vec<Row>> {
        check_table(table)?;
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE organization_id = ?1 ORDER BY rowid",
            table
        ))?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let rows = stmt.query_map([organization_id], |sql_row| {
            let mut row = Row::new();
            for (idx, name) in names.iter().enumerate() {
                row.insert(name.clone(), field_from_sql(sql_row.get_ref(idx)?));
            }
            Ok(row)
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str, color: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), FieldValue::text(id));
        row.insert("organization_id".into(), FieldValue::text("org-1"));
        row.insert("name".into(), FieldValue::text(name));
        row.insert("color".into(), FieldValue::text(color));
        row.insert("updated_at".into(), FieldValue::text("2025-03-01T00:00:00+00:00"));
        row
    }

    #[test]
    fn test_upsert_sql_skips_id_and_key() {
        let sql = upsert_sql(
            "food_category_groups",
            &["color", "id", "name", "organization_id"],
            &["organization_id", "name"],
        );
        assert_eq!(
            sql,
            "INSERT INTO food_category_groups (color, id, name, organization_id) \
             VALUES (?1, ?2, ?3, ?4) ON CONFLICT(organization_id, name) \
             DO UPDATE SET color = excluded.color"
        );
    }

    #[tokio::test]
    async fn test_upsert_updates_instead_of_duplicating() {
        let store = SqliteStore::in_memory().unwrap();
        let key = ["organization_id", "name"];

        store
            .upsert_batch("food_category_groups", &[group("fg-1", "Food", "red")], &key)
            .await
            .unwrap();
        store
            .upsert_batch("food_category_groups", &[group("fg-2", "Food", "blue")], &key)
            .await
            .unwrap();

        let rows = store.query("food_category_groups", "org-1").await.unwrap();
        assert_eq!(rows.len(), 1);
        // existing id survives, payload is updated
        assert_eq!(rows[0].get("id"), Some(&FieldValue::text("fg-1")));
        assert_eq!(rows[0].get("color"), Some(&FieldValue::text("blue")));
    }

    #[tokio::test]
    async fn test_unknown_table_and_bad_column_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let err = store.query("users", "org-1").await.unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownTable(_)));

        let mut row = group("fg-1", "Food", "red");
        row.insert("bad column".into(), FieldValue::Null);
        let err = store
            .upsert_batch("food_category_groups", &[row], &["organization_id", "name"])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidColumn(_)));
    }

    #[tokio::test]
    async fn test_query_filters_by_organization() {
        let store = SqliteStore::in_memory().unwrap();
        let mut other = group("fg-9", "Beverage", "green");
        other.insert("organization_id".into(), FieldValue::text("org-2"));

        store
            .upsert_batch(
                "food_category_groups",
                &[group("fg-1", "Food", "red"), other],
                &["organization_id", "name"],
            )
            .await
            .unwrap();

        assert_eq!(store.query("food_category_groups", "org-1").await.unwrap().len(), 1);
        assert_eq!(store.count("food_category_groups").unwrap(), 2);
    }
}
