// ==========================================
// Kitchen AI - Domain Layer
// ==========================================
// Entities produced by the import pipeline and
// the value types shared across stages
// ==========================================

pub mod allergen;
pub mod food_relationship;
pub mod import;
pub mod ingredient;
pub mod inventory;
pub mod prepared_item;
pub mod types;

pub use allergen::{Allergen, AllergenFlags, CustomAllergen};
pub use food_relationship::{FoodNode, HierarchyImportSummary, HierarchyLevel, SkippedRow};
pub use import::{ImportContext, ImportOutcome, ImportState, NormalizedRecord};
pub use ingredient::MasterIngredient;
pub use inventory::InventoryCount;
pub use prepared_item::PreparedItem;
pub use types::{ColumnSection, EntityKind, FieldValue, RawRow, Row, ValueType};
