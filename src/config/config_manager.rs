// ==========================================
// Kitchen AI - Config Manager
// ==========================================
// Storage: config_kv table (scope_id, key, value), scope 'global'
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::batch_upsert::DEFAULT_CHUNK_SIZE;
use crate::importer::error::ImportError;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

const GLOBAL_SCOPE: &str = "global";

/// Organization used when none is configured
pub const DEFAULT_ORGANIZATION_ID: &str = "default";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open the database at `db_path`; the schema is created if missing
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share a connection already owned by a SqliteStore
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// Global scope value, None when the key is unset
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![GLOBAL_SCOPE, key, value],
        )?;
        debug!(key, value, "config value stored");
        Ok(())
    }

    /// Every global key/value pair, ordered by key
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map([GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }
}

fn invalid(key: &str, value: &str, message: &str) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(ImportError::ConfigValueError {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    })
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_batch_size(&self) -> ConfigResult<usize> {
        match self.get_global_config_value(config_keys::BATCH_SIZE)? {
            None => Ok(DEFAULT_CHUNK_SIZE),
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid(
                    config_keys::BATCH_SIZE,
                    &raw,
                    "expected a positive integer",
                )),
            },
        }
    }

    async fn get_organization_id(&self) -> ConfigResult<String> {
        let value = self
            .get_global_config_value(config_keys::ORGANIZATION_ID)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(value.unwrap_or_else(|| DEFAULT_ORGANIZATION_ID.to_string()))
    }

    async fn get_default_sheet(&self) -> ConfigResult<Option<String>> {
        Ok(self
            .get_global_config_value(config_keys::DEFAULT_SHEET)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

// ==========================================
// StaticConfig
// ==========================================
// Fixed values, no storage. Used for `--dry-run` and tests.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub batch_size: usize,
    pub organization_id: String,
    pub default_sheet: Option<String>,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_CHUNK_SIZE,
            organization_id: DEFAULT_ORGANIZATION_ID.to_string(),
            default_sheet: None,
        }
    }
}

#[async_trait]
impl ImportConfigReader for StaticConfig {
    async fn get_batch_size(&self) -> ConfigResult<usize> {
        Ok(self.batch_size.max(1))
    }

    async fn get_organization_id(&self) -> ConfigResult<String> {
        Ok(self.organization_id.clone())
    }

    async fn get_default_sheet(&self) -> ConfigResult<Option<String>> {
        Ok(self.default_sheet.clone())
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    pub const BATCH_SIZE: &str = "import/batch_size";
    pub const ORGANIZATION_ID: &str = "import/organization_id";
    pub const DEFAULT_SHEET: &str = "import/default_sheet";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::import_config_trait::ImportSettings;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(file.path().to_str().unwrap()).unwrap();
        (file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let (_file, manager) = manager();
        let settings = ImportSettings::load(&manager).await.unwrap();
        assert_eq!(
            settings,
            ImportSettings {
                batch_size: 100,
                organization_id: "default".to_string(),
                default_sheet: None,
            }
        );
    }

    #[tokio::test]
    async fn test_stored_values_override_defaults() {
        let (_file, manager) = manager();
        manager.set_global_config_value(config_keys::BATCH_SIZE, "25").unwrap();
        manager
            .set_global_config_value(config_keys::ORGANIZATION_ID, "org-7")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_SHEET, "Inventory")
            .unwrap();

        assert_eq!(manager.get_batch_size().await.unwrap(), 25);
        assert_eq!(manager.get_organization_id().await.unwrap(), "org-7");
        assert_eq!(
            manager.get_default_sheet().await.unwrap().as_deref(),
            Some("Inventory")
        );
        assert_eq!(manager.get_config_snapshot().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_batch_size_rejected() {
        let (_file, manager) = manager();
        manager.set_global_config_value(config_keys::BATCH_SIZE, "0").unwrap();
        let err = manager.get_batch_size().await.unwrap_err();
        assert!(err.to_string().contains("import/batch_size"));
    }

    #[tokio::test]
    async fn test_static_config() {
        let config = StaticConfig {
            batch_size: 0,
            ..StaticConfig::default()
        };
        assert_eq!(config.get_batch_size().await.unwrap(), 1);
        assert_eq!(config.get_organization_id().await.unwrap(), "default");
    }
}
