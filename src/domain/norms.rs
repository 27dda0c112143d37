// ==========================================
// MUCP Planner - clearing norm entities
// ==========================================
// A clearing norm converts vegetation density into labor: PPD is the
// density percent one person clears per day on one hectare under a
// given (growth form, treatment method, terrain, size class, process).
// ==========================================

use crate::domain::types::{Process, SizeClass, Terrain};
use serde::{Deserialize, Serialize};

// ==========================================
// NormKey - composite lookup key
// ==========================================
// Growth form and treatment method are stored lower-cased; the key is
// unique within a norm set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormKey {
    pub growth_form: String,
    pub treatment_method: String,
    pub terrain: Terrain,
    pub size_class: SizeClass,
    pub process: Process,
}

impl NormKey {
    pub fn new(
        growth_form: &str,
        treatment_method: &str,
        terrain: Terrain,
        size_class: SizeClass,
        process: Process,
    ) -> Self {
        Self {
            growth_form: growth_form.trim().to_lowercase(),
            treatment_method: treatment_method.trim().to_lowercase(),
            terrain,
            size_class,
            process,
        }
    }

    /// Same key with the size class widened to the wildcard row.
    pub fn with_any_size_class(&self) -> NormKey {
        NormKey {
            size_class: SizeClass::All,
            ..self.clone()
        }
    }
}

// ==========================================
// ClearingNorm
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingNorm {
    pub key: NormKey,
    /// Baseline density percent the norm was measured at.
    pub density: f64,
    /// Density percent cleared per person-day per hectare.
    pub ppd: f64,
}

// ==========================================
// ClearingNormSet
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingNormSet {
    pub name: String,
    pub norms: Vec<ClearingNorm>,
}
