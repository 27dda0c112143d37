// ==========================================
// MUCP Planner - clearing norm resolver
// ==========================================
// Composite-key lookup from (growth form, treatment method, terrain,
// size class, process) to a clearing norm. Exact match first; the one
// permitted fallback is a row keyed size_class=all. Any other miss is
// a gap for that unit and year, never an invented rate.
// ==========================================

use crate::domain::norms::{ClearingNorm, ClearingNormSet, NormKey};
use std::collections::HashMap;

// ==========================================
// NormResolver
// ==========================================
pub struct NormResolver {
    norms: HashMap<NormKey, ClearingNorm>,
}

impl NormResolver {
    /// Builds the lookup map once per run. Later rows win on duplicate
    /// keys; validation has already flagged duplicates.
    pub fn from_set(set: &ClearingNormSet) -> Self {
        let norms = set
            .norms
            .iter()
            .map(|norm| (norm.key.clone(), norm.clone()))
            .collect();
        Self { norms }
    }

    /// Exact lookup, then the size_class=all wildcard row.
    pub fn resolve(&self, key: &NormKey) -> Option<&ClearingNorm> {
        self.norms
            .get(key)
            .or_else(|| self.norms.get(&key.with_any_size_class()))
    }

    /// Person-days to treat `density_percent` over `area_ha` under the
    /// resolved norm. None when the norm is missing or its PPD is 0.
    pub fn person_days(&self, key: &NormKey, area_ha: f64, density_percent: f64) -> Option<f64> {
        let norm = self.resolve(key)?;
        if norm.ppd <= 0.0 {
            return None;
        }
        Some(area_ha * density_percent / norm.ppd)
    }

    pub fn len(&self) -> usize {
        self.norms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.norms.is_empty()
    }
}
