// ==========================================
// Kitchen AI - Food Relationship Hierarchy
// ==========================================
// Three-level catalog taxonomy:
// group -> category -> sub-category, linked by parent id
// ==========================================

use crate::domain::types::{FieldValue, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    Group,
    Category,
    SubCategory,
}

impl HierarchyLevel {
    /// Destination table of this level
    pub fn table(&self) -> &'static str {
        match self {
            HierarchyLevel::Group => "food_category_groups",
            HierarchyLevel::Category => "food_categories",
            HierarchyLevel::SubCategory => "food_sub_categories",
        }
    }

    /// Column holding the parent id; groups have none
    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            HierarchyLevel::Group => None,
            HierarchyLevel::Category => Some("group_id"),
            HierarchyLevel::SubCategory => Some("category_id"),
        }
    }

    pub fn conflict_key(&self) -> &'static [&'static str] {
        match self {
            HierarchyLevel::Group => &["organization_id", "name"],
            HierarchyLevel::Category => &["organization_id", "group_id", "name"],
            HierarchyLevel::SubCategory => &["organization_id", "category_id", "name"],
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            HierarchyLevel::Group => "fg",
            HierarchyLevel::Category => "fc",
            HierarchyLevel::SubCategory => "fs",
        }
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyLevel::Group => write!(f, "group"),
            HierarchyLevel::Category => write!(f, "category"),
            HierarchyLevel::SubCategory => write!(f, "subcategory"),
        }
    }
}

impl FromStr for HierarchyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "group" => Ok(HierarchyLevel::Group),
            "category" => Ok(HierarchyLevel::Category),
            "subcategory" | "sub-category" | "sub_category" | "sub category" => {
                Ok(HierarchyLevel::SubCategory)
            }
            other => Err(format!("unknown hierarchy type '{}'", other)),
        }
    }
}

// ==========================================
// FoodNode - one group / category / sub-category
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNode {
    pub id: String,
    pub organization_id: String,
    pub level: HierarchyLevel,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub parent_id: Option<String>,
    pub sort_order: i64,
    pub updated_at: String,
}

impl FoodNode {
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone().into());
        row.insert("organization_id".into(), self.organization_id.clone().into());
        row.insert("name".into(), self.name.clone().into());
        row.insert("description".into(), self.description.clone().into());
        row.insert("icon".into(), self.icon.clone().into());
        row.insert("color".into(), self.color.clone().into());
        row.insert(
            "sort_order".into(),
            FieldValue::Number(self.sort_order as f64),
        );
        if let Some(parent_field) = self.level.parent_field() {
            row.insert(parent_field.into(), FieldValue::from(self.parent_id.clone()));
        }
        row.insert("updated_at".into(), self.updated_at.clone().into());
        row
    }
}

// ==========================================
// Hierarchy import summary
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based data row number (header excluded)
    pub row_number: usize,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyImportSummary {
    pub groups: usize,
    pub categories: usize,
    pub sub_categories: usize,
    pub skipped: Vec<SkippedRow>,
}

impl HierarchyImportSummary {
    pub fn committed(&self) -> usize {
        self.groups + self.categories + self.sub_categories
    }
}
