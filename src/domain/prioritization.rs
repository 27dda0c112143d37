// ==========================================
// MUCP Planner - prioritization category entities
// ==========================================
// Weighted multi-criteria model: each category resolves a raw
// compartment attribute to a priority rank, either through ascending
// non-overlapping numeric bands or an exact (case-insensitive) text
// table.
// ==========================================

use crate::domain::types::CategoryType;
use serde::{Deserialize, Serialize};

// ==========================================
// NumericBand - (low, high) -> priority
// ==========================================
// Bounds are inclusive; bands within one category never overlap, so
// first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBand {
    pub range_low: f64,
    pub range_high: f64,
    pub priority: u32,
}

impl NumericBand {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.range_low && value <= self.range_high
    }
}

// ==========================================
// TextPriorityValue - value -> priority
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPriorityValue {
    pub text_value: String,
    pub priority: u32,
}

// ==========================================
// Category
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Lower-cased name; matches a column in the priorities table.
    pub name: String,
    pub category_type: CategoryType,
    /// Weight in [0, 1], stored to 3 decimals.
    pub weight: f64,
    /// Numeric bands, ascending by range_low. Empty for text categories.
    pub bands: Vec<NumericBand>,
    /// Text value table. Empty for numeric categories.
    pub text_values: Vec<TextPriorityValue>,
}

impl Category {
    pub fn numeric(name: &str, weight: f64, bands: Vec<NumericBand>) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            category_type: CategoryType::Numeric,
            weight,
            bands,
            text_values: Vec::new(),
        }
    }

    pub fn text(name: &str, weight: f64, text_values: Vec<TextPriorityValue>) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            category_type: CategoryType::Text,
            weight,
            bands: Vec::new(),
            text_values,
        }
    }

    /// True when any two numeric bands of this category overlap.
    pub fn has_overlapping_bands(&self) -> bool {
        for (i, a) in self.bands.iter().enumerate() {
            for b in self.bands.iter().skip(i + 1) {
                if a.range_low <= b.range_high && b.range_low <= a.range_high {
                    return true;
                }
            }
        }
        false
    }
}

// ==========================================
// CompartmentPriorityRow - raw attribute values
// ==========================================
// One row per compartment from the priorities CSV: the raw value for
// each selected category, keyed by the category's column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompartmentPriorityRow {
    pub compt_id: String,
    pub values: std::collections::HashMap<String, String>,
}
