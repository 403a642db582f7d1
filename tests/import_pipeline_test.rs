// ==========================================
// Import pipeline integration tests
// ==========================================
// File -> validate -> normalize -> SQLite, end to end
// ==========================================


use kitchen_ai_import::config::{config_keys, ConfigManager, ImportSettings};
use kitchen_ai_import::domain::types::{row_number, row_text};
use kitchen_ai_import::importer::{ImportPipeline, SpreadsheetImporter, TemplateGenerator};
use kitchen_ai_import::{
    logging, EntityKind, ImportContext, ImportError, ImportState, InMemoryStore, RawDataset,
    SqliteStore, StoragePort,
};
use serde_json::json;
use std::sync::Arc;
use test_helpers::{create_test_db, entity_row, ingredient, write_entity_csv};

fn sqlite_pipeline(db_path: &str) -> ImportPipeline<SqliteStore> {
    ImportPipeline::new(SqliteStore::new(db_path).unwrap())
}

#[tokio::test]
async fn test_master_ingredient_csv_import() {
    logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = sqlite_pipeline(&db_path);
    let file = write_entity_csv(
        EntityKind::MasterIngredient,
        &[
            ingredient("B1", "Beef", "$1,234.50"),
            ingredient("B2", "0", "$10.00"),
            ingredient("C1", "Chicken", "abc"),
        ],
    );

    let outcome = pipeline
        .import_file(
            EntityKind::MasterIngredient,
            file.path(),
            None,
            &ImportContext::new("org-1"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.state, ImportState::CommitSucceeded);
    assert_eq!(outcome.total_rows, 3);
    assert_eq!(outcome.skipped_rows, 1);
    assert_eq!(outcome.committed, 2);

    let rows = pipeline
        .storage()
        .query("master_ingredients", "org-1")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(row_text(&rows[0], "product"), "Beef");
    assert_eq!(row_number(&rows[0], "case_price"), 1234.5);
    // example row: 2 units per case, 40 recipe units per case
    assert_eq!(row_number(&rows[0], "unit_price"), 617.25);
    assert_eq!(row_text(&rows[1], "product"), "Chicken");
    assert_eq!(row_number(&rows[1], "case_price"), 0.0);
}

#[tokio::test]
async fn test_reimport_same_file_is_idempotent() {
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = sqlite_pipeline(&db_path);
    let file = write_entity_csv(
        EntityKind::MasterIngredient,
        &[ingredient("B1", "Beef", "$20"), ingredient("P1", "Pork", "$15")],
    );

    pipeline
        .import_file(EntityKind::MasterIngredient, file.path(), None, &ImportContext::new("org-1"))
        .await
        .unwrap();
    let first_ids: Vec<String> = pipeline
        .storage()
        .query("master_ingredients", "org-1")
        .await
        .unwrap()
        .iter()
        .map(|r| row_text(r, "id"))
        .collect();

    pipeline
        .import_file(EntityKind::MasterIngredient, file.path(), None, &ImportContext::new("org-1"))
        .await
        .unwrap();
    let rows = pipeline
        .storage()
        .query("master_ingredients", "org-1")
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let second_ids: Vec<String> = rows.iter().map(|r| row_text(r, "id")).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(pipeline.storage().count("import_batches").unwrap(), 2);
}

#[tokio::test]
async fn test_missing_core_columns_rejected_before_storage() {
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = sqlite_pipeline(&db_path);
    let mut row = ingredient("B1", "Beef", "$20");
    row.remove("Vendor");
    row.remove("Case Price");

    let err = pipeline
        .import_rows(EntityKind::MasterIngredient, &[row], &ImportContext::new("org-1"))
        .await
        .unwrap_err();

    assert!(err.is_user_fixable());
    let report = err.validation_report().unwrap();
    assert_eq!(report.len(), 2);
    let message = err.to_string();
    assert!(message.contains("Required Core Fields Missing:\n  - Vendor\n  - Case Price"));
    assert!(!message.contains("Allergen Fields Missing"));
    assert_eq!(pipeline.storage().count("master_ingredients").unwrap(), 0);
}

#[tokio::test]
async fn test_violations_reported_across_sections() {
    let pipeline = ImportPipeline::new(InMemoryStore::new());
    let mut row = entity_row(EntityKind::PreparedItem, &[]);
    for header in ["STATION", "Sesame", "Custom Allergen 2 Active"] {
        row.remove(header);
    }

    let err = pipeline
        .preview(EntityKind::PreparedItem, &[row], &ImportContext::new("org-1"))
        .unwrap_err();

    let report = err.validation_report().unwrap();
    assert_eq!(report.len(), 3);
    let message = report.to_string();
    assert!(message.starts_with("Missing required columns for prepared item import."));
    assert!(message.contains("Allergen Fields Missing:\n  - Sesame"));
    assert!(message.contains("Custom Allergen Fields Missing:\n  - Custom Allergen 2 Active"));
}

#[tokio::test]
async fn test_250_rows_committed_in_three_chunks() {
    let store = Arc::new(InMemoryStore::new());
    let pipeline = ImportPipeline::new(Arc::clone(&store));
    let rows: Vec<_> = (0..250)
        .map(|i| ingredient(&format!("I{:03}", i), &format!("Item {}", i), "$5"))
        .collect();

    let outcome = pipeline
        .import_rows(EntityKind::MasterIngredient, &rows, &ImportContext::new("org-1"))
        .await
        .unwrap();

    assert_eq!(outcome.committed, 250);
    assert_eq!(store.upsert_calls(), vec![100, 100, 50]);

    // input order survives normalization and chunking
    let stored = store.rows("master_ingredients");
    let codes: Vec<String> = stored.iter().map(|r| row_text(r, "item_code")).collect();
    let expected: Vec<String> = (0..250).map(|i| format!("I{:03}", i)).collect();
    assert_eq!(codes, expected);
}

#[tokio::test]
async fn test_batch_size_from_config() {
    let (_db, db_path) = create_test_db().unwrap();
    let config = ConfigManager::new(&db_path).unwrap();
    config.set_global_config_value(config_keys::BATCH_SIZE, "40").unwrap();
    let settings = ImportSettings::load(&config).await.unwrap();

    let store = Arc::new(InMemoryStore::new());
    let pipeline = ImportPipeline::new(Arc::clone(&store)).with_chunk_size(settings.batch_size);
    let rows: Vec<_> = (0..90)
        .map(|i| ingredient(&format!("I{}", i), "Item", "$5"))
        .collect();

    pipeline
        .import_rows(EntityKind::MasterIngredient, &rows, &ImportContext::new("org-1"))
        .await
        .unwrap();
    assert_eq!(store.upsert_calls(), vec![40, 40, 10]);
}

#[tokio::test]
async fn test_commit_failure_keeps_earlier_chunks() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_on_upsert_call(3);
    let pipeline = ImportPipeline::new(Arc::clone(&store));
    let rows: Vec<_> = (0..250)
        .map(|i| ingredient(&format!("I{}", i), "Item", "$5"))
        .collect();

    let err = pipeline
        .import_rows(EntityKind::MasterIngredient, &rows, &ImportContext::new("org-1"))
        .await
        .unwrap_err();

    match &err {
        ImportError::Persistence { committed, .. } => assert_eq!(*committed, 200),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!err.is_user_fixable());
    assert!(err.to_string().starts_with("Import error: "));
    assert_eq!(store.count("master_ingredients"), 200);
}

#[tokio::test]
async fn test_inventory_count_from_json_dataset() {
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = sqlite_pipeline(&db_path);
    let rows = RawDataset::from_json(&json!([
        {"Item ID": "B1", "Quantity": 4, "Unit Cost": "$2.50", "Location": "Dry Storage"},
        {"Item ID": "", "Quantity": 1, "Unit Cost": "$1.00"},
        {"Item ID": "C1", "Quantity": "n/a", "Unit Cost": 3, "Location": null}
    ]))
    .unwrap();

    let outcome = pipeline
        .import_rows(EntityKind::InventoryCount, &rows, &ImportContext::new("org-1"))
        .await
        .unwrap();
    assert_eq!((outcome.committed, outcome.skipped_rows), (2, 1));

    let stored = pipeline
        .storage()
        .query("inventory_counts", "org-1")
        .await
        .unwrap();
    assert_eq!(row_number(&stored[0], "total_value"), 10.0);
    assert_eq!(row_number(&stored[1], "quantity"), 0.0);
    assert_eq!(row_number(&stored[1], "total_value"), 0.0);
}

#[tokio::test]
async fn test_json_dataset_structural_errors() {
    let pipeline = ImportPipeline::new(InMemoryStore::new());
    let err = pipeline
        .import_rows(EntityKind::PreparedItem, &[], &ImportContext::new("org-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Structural(_)));

    // shape problems are "try again", not "fix your file"
    assert!(!err.is_user_fixable());
    let structural = RawDataset::from_json(&json!("rows")).unwrap_err();
    assert!(!ImportError::from(structural).is_user_fixable());
}

#[tokio::test]
async fn test_every_template_imports_cleanly() {
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = sqlite_pipeline(&db_path);
    let dir = tempfile::tempdir().unwrap();

    for entity in EntityKind::ALL {
        let path = dir.path().join(format!("{}.csv", entity.as_str()));
        TemplateGenerator.write_file(entity, &path).unwrap();

        let outcome = pipeline
            .import_file(entity, &path, None, &ImportContext::new("org-1"))
            .await
            .unwrap();
        assert_eq!(outcome.committed, 1, "{}", entity);
        assert_eq!(outcome.state, ImportState::CommitSucceeded);
    }
}

#[tokio::test]
async fn test_unknown_sheet_and_format_errors() {
    let pipeline = ImportPipeline::new(InMemoryStore::new());
    let err = pipeline
        .import_file(
            EntityKind::MasterIngredient,
            std::path::Path::new("missing.xlsx"),
            Some("Sheet9"),
            &ImportContext::new("org-1"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));

    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let err = pipeline
        .import_file(EntityKind::MasterIngredient, file.path(), None, &ImportContext::new("org-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

#[tokio::test]
async fn test_parse_failures_leave_audit_rows() {
    let store = Arc::new(InMemoryStore::new());
    let pipeline = ImportPipeline::new(Arc::clone(&store));
    let ctx = ImportContext::new("org-1");

    let missing = pipeline
        .import_file(
            EntityKind::MasterIngredient,
            std::path::Path::new("missing.xlsx"),
            Some("Sheet9"),
            &ctx,
        )
        .await
        .unwrap_err();
    let text = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let unsupported = pipeline
        .import_file(EntityKind::PreparedItem, text.path(), None, &ctx)
        .await
        .unwrap_err();

    let audit = store.rows("import_batches");
    assert_eq!(audit.len(), 2);
    for (row, err) in audit.iter().zip([&missing, &unsupported]) {
        assert_eq!(row_text(row, "state"), "FILE_SELECTED");
        assert_eq!(row_text(row, "error_kind"), "file");
        assert_eq!(row_text(row, "error"), err.to_string());
        assert_eq!(row_number(row, "committed_rows"), 0.0);
    }
    assert_eq!(row_text(&audit[0], "file_name"), "missing.xlsx");
    assert_eq!(row_text(&audit[1], "entity"), EntityKind::PreparedItem.as_str());
}

#[tokio::test]
async fn test_blank_identifier_rows_skipped_not_collapsed() {
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = sqlite_pipeline(&db_path);
    let ctx = ImportContext::new("org-1");

    let ingredients = vec![
        ingredient("", "Beef", "$20"),
        ingredient("", "Pork", "$15"),
        ingredient("L1", "Lamb", "$30"),
    ];
    let outcome = pipeline
        .import_rows(EntityKind::MasterIngredient, &ingredients, &ctx)
        .await
        .unwrap();
    assert_eq!((outcome.committed, outcome.skipped_rows), (1, 2));

    let prepared = vec![
        entity_row(EntityKind::PreparedItem, &[("Item ID", ""), ("PRODUCT", "Stock")]),
        entity_row(EntityKind::PreparedItem, &[("Item ID", "   "), ("PRODUCT", "Jus")]),
    ];
    let outcome = pipeline
        .import_rows(EntityKind::PreparedItem, &prepared, &ctx)
        .await
        .unwrap();
    assert_eq!((outcome.committed, outcome.skipped_rows), (0, 2));

    let store = pipeline.storage();
    assert_eq!(store.count("master_ingredients").unwrap(), 1);
    assert_eq!(store.count("prepared_items").unwrap(), 0);
}
