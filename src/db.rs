// ==========================================
// Kitchen AI - SQLite Connection & Schema
// ==========================================
// Goals:
// - every Connection::open goes through the same PRAGMA setup
// - one idempotent schema bootstrap for the import destinations
// ==========================================

use crate::domain::allergen::{Allergen, CustomAllergen, ALLERGEN_NOTES_FIELD, CUSTOM_ALLERGEN_SLOTS};
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// Tables the import pipeline may write to
pub const IMPORT_TABLES: [&str; 7] = [
    "master_ingredients",
    "inventory_counts",
    "prepared_items",
    "food_category_groups",
    "food_categories",
    "food_sub_categories",
    "import_batches",
];

/// Apply the shared PRAGMA setup.
///
/// foreign_keys and busy_timeout are per-connection settings.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection with the shared setup applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Allergen column definitions shared by ingredient and prepared item tables
fn allergen_column_ddl() -> String {
    let mut columns: Vec<String> = Allergen::ALL
        .iter()
        .map(|a| format!("{} INTEGER NOT NULL DEFAULT 0", a.field()))
        .collect();
    for slot in 1..=CUSTOM_ALLERGEN_SLOTS {
        let (name_field, active_field) = CustomAllergen::fields(slot);
        columns.push(format!("{} TEXT NOT NULL DEFAULT ''", name_field));
        columns.push(format!("{} INTEGER NOT NULL DEFAULT 0", active_field));
    }
    columns.push(format!("{} TEXT NOT NULL DEFAULT ''", ALLERGEN_NOTES_FIELD));
    columns.join(",\n            ")
}

/// Create all import tables (idempotent)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    let allergens = allergen_column_ddl();

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS master_ingredients (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            item_code TEXT NOT NULL,
            product TEXT NOT NULL,
            major_group TEXT,
            category TEXT,
            sub_category TEXT,
            vendor TEXT,
            case_size TEXT,
            units_per_case REAL NOT NULL DEFAULT 0,
            case_price REAL NOT NULL DEFAULT 0,
            unit_of_measure TEXT,
            recipe_units_per_case REAL NOT NULL DEFAULT 0,
            recipe_unit_type TEXT,
            yield_percent REAL NOT NULL DEFAULT 100,
            storage_area TEXT,
            image_url TEXT,
            unit_price REAL NOT NULL DEFAULT 0,
            cost_per_recipe_unit REAL NOT NULL DEFAULT 0,
            {allergens},
            updated_at TEXT NOT NULL,
            UNIQUE (organization_id, item_code)
        );

        CREATE TABLE IF NOT EXISTS inventory_counts (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            master_ingredient_id TEXT NOT NULL,
            count_date TEXT NOT NULL,
            quantity REAL NOT NULL DEFAULT 0,
            unit_cost REAL NOT NULL DEFAULT 0,
            total_value REAL NOT NULL DEFAULT 0,
            location TEXT,
            notes TEXT,
            updated_at TEXT NOT NULL,
            UNIQUE (organization_id, master_ingredient_id, count_date)
        );

        CREATE TABLE IF NOT EXISTS prepared_items (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            item_id TEXT NOT NULL,
            category TEXT,
            product TEXT NOT NULL,
            station TEXT,
            sub_category TEXT,
            storage_area TEXT,
            container TEXT,
            container_type TEXT,
            shelf_life TEXT,
            recipe_unit TEXT,
            cost_per_recipe_unit REAL NOT NULL DEFAULT 0,
            yield_percent REAL NOT NULL DEFAULT 100,
            final_cost REAL NOT NULL DEFAULT 0,
            {allergens},
            updated_at TEXT NOT NULL,
            UNIQUE (organization_id, item_id)
        );

        CREATE TABLE IF NOT EXISTS food_category_groups (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            color TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            UNIQUE (organization_id, name)
        );

        CREATE TABLE IF NOT EXISTS food_categories (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            group_id TEXT NOT NULL REFERENCES food_category_groups(id),
            name TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            color TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            UNIQUE (organization_id, group_id, name)
        );

        CREATE TABLE IF NOT EXISTS food_sub_categories (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            category_id TEXT NOT NULL REFERENCES food_categories(id),
            name TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            color TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            UNIQUE (organization_id, category_id, name)
        );

        CREATE TABLE IF NOT EXISTS import_batches (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            entity TEXT NOT NULL,
            file_name TEXT,
            total_rows INTEGER NOT NULL DEFAULT 0,
            skipped_rows INTEGER NOT NULL DEFAULT 0,
            committed_rows INTEGER NOT NULL DEFAULT 0,
            state TEXT NOT NULL,
            error_kind TEXT,
            error TEXT,
            elapsed_ms INTEGER,
            updated_at TEXT NOT NULL
        );
        "#
    ))?;
    add_batch_error_kind(conn)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// v2: import_batches.error_kind, added in place on v1 databases
fn add_batch_error_kind(conn: &Connection) -> rusqlite::Result<()> {
    let columns = {
        let mut stmt = conn.prepare("PRAGMA table_info(import_batches)")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        names
    };
    if !columns.iter().any(|c| c == "error_kind") {
        conn.execute("ALTER TABLE import_batches ADD COLUMN error_kind TEXT", [])?;
    }
    Ok(())
}

/// Env var that pins the database file
pub const DB_PATH_ENV: &str = "KITCHEN_AI_DB_PATH";

/// Database path: `KITCHEN_AI_DB_PATH`, else `<data_dir>/kitchen-ai/kitchen_ai.db`,
/// else `./kitchen_ai.db`
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./kitchen_ai.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("kitchen-ai");
        // fall back to the working directory if the data dir is not writable
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("kitchen_ai.db");
        }
    }
    path.to_string_lossy().to_string()
}
