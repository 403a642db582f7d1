// ==========================================
// Food relationship hierarchy integration tests
// ==========================================
// groups -> categories -> sub-categories against SQLite,
// foreign keys enforced
// ==========================================


use kitchen_ai_import::domain::types::row_text;
use kitchen_ai_import::importer::{ImportPipeline, SpreadsheetImporter};
use kitchen_ai_import::{logging, EntityKind, ImportContext, SqliteStore, StoragePort};
use test_helpers::{create_test_db, hierarchy_row, write_entity_csv};

#[tokio::test]
async fn test_unresolved_sub_category_skipped_rest_imported() {
    logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = ImportPipeline::new(SqliteStore::new(&db_path).unwrap());
    let rows = vec![
        hierarchy_row("group", "Food", ""),
        hierarchy_row("group", "Beverage", ""),
        hierarchy_row("category", "Proteins", "Food"),
        hierarchy_row("category", "Coffee", "Beverage"),
        hierarchy_row("subcategory", "Beef", "Proteins"),
        hierarchy_row("subcategory", "Espresso", "Coffee"),
        hierarchy_row("subcategory", "Kale", "Vegetables"),
    ];

    let summary = pipeline
        .import_hierarchy(&rows, &ImportContext::new("org-1"))
        .await
        .unwrap();

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.categories, 2);
    assert_eq!(summary.sub_categories, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "Kale");
    assert!(summary.skipped[0].reason.contains("Vegetables"));

    let store = pipeline.storage();
    let categories = store.query("food_categories", "org-1").await.unwrap();
    let proteins = categories
        .iter()
        .find(|r| row_text(r, "name") == "Proteins")
        .unwrap();
    let groups = store.query("food_category_groups", "org-1").await.unwrap();
    let food = groups.iter().find(|r| row_text(r, "name") == "Food").unwrap();
    assert_eq!(row_text(proteins, "group_id"), row_text(food, "id"));
}

#[tokio::test]
async fn test_hierarchy_file_reimport_is_idempotent() {
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = ImportPipeline::new(SqliteStore::new(&db_path).unwrap());
    let file = write_entity_csv(
        EntityKind::FoodRelationship,
        &[
            hierarchy_row("group", "Food", ""),
            hierarchy_row("category", "Dairy", "Food"),
            hierarchy_row("sub-category", "Cheese", "Dairy"),
        ],
    );

    for _ in 0..2 {
        let outcome = pipeline
            .import_file(
                EntityKind::FoodRelationship,
                file.path(),
                None,
                &ImportContext::new("org-1"),
            )
            .await
            .unwrap();
        assert_eq!(outcome.committed, 3);
    }

    let store = pipeline.storage();
    assert_eq!(store.count("food_category_groups").unwrap(), 1);
    assert_eq!(store.count("food_categories").unwrap(), 1);
    assert_eq!(store.count("food_sub_categories").unwrap(), 1);
}

#[tokio::test]
async fn test_categories_attach_to_previously_imported_groups() {
    let (_db, db_path) = create_test_db().unwrap();
    let pipeline = ImportPipeline::new(SqliteStore::new(&db_path).unwrap());
    let ctx = ImportContext::new("org-1");

    pipeline
        .import_hierarchy(&[hierarchy_row("group", "Food", "")], &ctx)
        .await
        .unwrap();
    let summary = pipeline
        .import_hierarchy(&[hierarchy_row("category", "Produce", "FOOD")], &ctx)
        .await
        .unwrap();

    assert_eq!(summary.categories, 1);
    assert!(summary.skipped.is_empty());

    // other organizations never resolve against this group
    let summary = pipeline
        .import_hierarchy(
            &[hierarchy_row("category", "Produce", "Food")],
            &ImportContext::new("org-2"),
        )
        .await
        .unwrap();
    assert_eq!(summary.categories, 0);
    assert_eq!(summary.skipped.len(), 1);
}
