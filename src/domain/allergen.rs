// ==========================================
// Kitchen AI - Allergen Flag Set
// ==========================================
// Fixed allergen enumeration + 3 custom slots + free-text notes,
// shared by master ingredients and prepared items
// ==========================================

use crate::domain::types::{FieldValue, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of custom allergen slots carried by every record
pub const CUSTOM_ALLERGEN_SLOTS: usize = 3;

/// Target field holding the free-text allergen notes
pub const ALLERGEN_NOTES_FIELD: &str = "allergen_notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allergen {
    Peanut,
    Crustacean,
    TreeNut,
    Shellfish,
    Sesame,
    Soy,
    Fish,
    Wheat,
    Milk,
    Sulphite,
    Egg,
    Gluten,
    Mustard,
    Celery,
    Garlic,
    Onion,
    Nitrite,
    Mushroom,
    HotPepper,
    Citrus,
    Pork,
}

impl Allergen {
    pub const ALL: [Allergen; 21] = [
        Allergen::Peanut,
        Allergen::Crustacean,
        Allergen::TreeNut,
        Allergen::Shellfish,
        Allergen::Sesame,
        Allergen::Soy,
        Allergen::Fish,
        Allergen::Wheat,
        Allergen::Milk,
        Allergen::Sulphite,
        Allergen::Egg,
        Allergen::Gluten,
        Allergen::Mustard,
        Allergen::Celery,
        Allergen::Garlic,
        Allergen::Onion,
        Allergen::Nitrite,
        Allergen::Mushroom,
        Allergen::HotPepper,
        Allergen::Citrus,
        Allergen::Pork,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Allergen::Peanut => "peanut",
            Allergen::Crustacean => "crustacean",
            Allergen::TreeNut => "treenut",
            Allergen::Shellfish => "shellfish",
            Allergen::Sesame => "sesame",
            Allergen::Soy => "soy",
            Allergen::Fish => "fish",
            Allergen::Wheat => "wheat",
            Allergen::Milk => "milk",
            Allergen::Sulphite => "sulphite",
            Allergen::Egg => "egg",
            Allergen::Gluten => "gluten",
            Allergen::Mustard => "mustard",
            Allergen::Celery => "celery",
            Allergen::Garlic => "garlic",
            Allergen::Onion => "onion",
            Allergen::Nitrite => "nitrite",
            Allergen::Mushroom => "mushroom",
            Allergen::HotPepper => "hot_pepper",
            Allergen::Citrus => "citrus",
            Allergen::Pork => "pork",
        }
    }

    /// Spreadsheet header for this allergen
    pub fn header(&self) -> &'static str {
        match self {
            Allergen::Peanut => "Peanut",
            Allergen::Crustacean => "Crustacean",
            Allergen::TreeNut => "Tree Nut",
            Allergen::Shellfish => "Shellfish",
            Allergen::Sesame => "Sesame",
            Allergen::Soy => "Soy",
            Allergen::Fish => "Fish",
            Allergen::Wheat => "Wheat",
            Allergen::Milk => "Milk",
            Allergen::Sulphite => "Sulphite",
            Allergen::Egg => "Egg",
            Allergen::Gluten => "Gluten",
            Allergen::Mustard => "Mustard",
            Allergen::Celery => "Celery",
            Allergen::Garlic => "Garlic",
            Allergen::Onion => "Onion",
            Allergen::Nitrite => "Nitrite",
            Allergen::Mushroom => "Mushroom",
            Allergen::HotPepper => "Hot Pepper",
            Allergen::Citrus => "Citrus",
            Allergen::Pork => "Pork",
        }
    }

    /// Persisted column name, e.g. `allergen_tree_nut`
    pub fn field(&self) -> String {
        format!("allergen_{}", self.key())
    }
}

// ==========================================
// Custom Allergen Slot
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomAllergen {
    pub name: String,
    pub active: bool,
}

impl CustomAllergen {
    /// 1-based slot field names: (name, active)
    pub fn fields(slot: usize) -> (String, String) {
        (
            format!("allergen_custom{}_name", slot),
            format!("allergen_custom{}_active", slot),
        )
    }

    /// 1-based slot headers: (name, active)
    pub fn headers(slot: usize) -> (String, String) {
        (
            format!("Custom Allergen {}", slot),
            format!("Custom Allergen {} Active", slot),
        )
    }
}

// ==========================================
// Allergen Flag Set
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergenFlags {
    pub flags: BTreeMap<Allergen, bool>,
    pub custom: [CustomAllergen; CUSTOM_ALLERGEN_SLOTS],
    pub notes: String,
}

impl Default for AllergenFlags {
    fn default() -> Self {
        Self {
            flags: Allergen::ALL.iter().map(|a| (*a, false)).collect(),
            custom: Default::default(),
            notes: String::new(),
        }
    }
}

impl AllergenFlags {
    /// Read the flag set back out of a coerced row.
    ///
    /// Missing fields fall back to inactive / empty.
    pub fn from_row(row: &Row) -> Self {
        let mut flags = Self::default();
        for allergen in Allergen::ALL {
            let active = row
                .get(&allergen.field())
                .map(FieldValue::as_flag)
                .unwrap_or(false);
            flags.flags.insert(allergen, active);
        }

        for (idx, slot) in flags.custom.iter_mut().enumerate() {
            let (name_field, active_field) = CustomAllergen::fields(idx + 1);
            slot.name = row
                .get(&name_field)
                .map(|v| v.as_text().to_string())
                .unwrap_or_default();
            slot.active = row
                .get(&active_field)
                .map(FieldValue::as_flag)
                .unwrap_or(false);
        }

        flags.notes = row
            .get(ALLERGEN_NOTES_FIELD)
            .map(|v| v.as_text().to_string())
            .unwrap_or_default();
        flags
    }

    /// Write every allergen column, custom pairs included, into a storage row
    pub fn write_row(&self, row: &mut Row) {
        for allergen in Allergen::ALL {
            row.insert(allergen.field(), FieldValue::Flag(self.contains(allergen)));
        }
        for (idx, slot) in self.custom.iter().enumerate() {
            let (name_field, active_field) = CustomAllergen::fields(idx + 1);
            row.insert(name_field, FieldValue::text(slot.name.clone()));
            row.insert(active_field, FieldValue::Flag(slot.active));
        }
        row.insert(
            ALLERGEN_NOTES_FIELD.to_string(),
            FieldValue::text(self.notes.clone()),
        );
    }

    pub fn contains(&self, allergen: Allergen) -> bool {
        self.flags.get(&allergen).copied().unwrap_or(false)
    }

    pub fn active(&self) -> Vec<Allergen> {
        self.flags
            .iter()
            .filter(|(_, on)| **on)
            .map(|(a, _)| *a)
            .collect()
    }
}
