// ==========================================
// MUCP Planner - spatial unit entities
// ==========================================
// Attribute rows from the project's spatial tables. Read-only after
// normalization: the engines annotate compartments with derived data
// (priority, costing model) but never mutate these records.
// ==========================================

use crate::domain::types::Terrain;
use serde::{Deserialize, Serialize};

// ==========================================
// GisMappingRow - compartment membership
// ==========================================
// One row per compartment linking it to its management intervention
// unit (MIU) and broader planning area (NBAL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GisMappingRow {
    pub nbal_id: String,
    pub miu_id: String,
    pub compt_id: String,
    pub area: f64,
}

// ==========================================
// MiuUnit - management intervention unit
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiuUnit {
    pub miu_id: String,
    pub area: f64,
    /// Riparian coverage fraction (0..=1); above 0.5 the unit is
    /// treated as riparian terrain for norm lookups.
    pub riparian_fraction: f64,
}

impl MiuUnit {
    pub fn terrain(&self) -> Terrain {
        if self.riparian_fraction > 0.5 {
            Terrain::Riparian
        } else {
            Terrain::Landscape
        }
    }
}

// ==========================================
// NbalUnit - broader planning area
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NbalUnit {
    pub nbal_id: String,
    pub area: f64,
    pub stage: String,
    pub contract_id: Option<String>,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

// ==========================================
// CompartmentUnit - smallest costed spatial unit
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompartmentUnit {
    pub compt_id: String,
    pub area_ha: f64,
    pub slope: f64,
    pub walk_time: f64,
    pub drive_time: f64,
    /// Costing-group tag from the compartment attribute table; resolved
    /// to a CostingModel through the per-run mapping.
    pub costing: String,
    /// Growth-condition tag.
    pub grow_con: String,
    /// Terrain override from the attribute table; when absent the MIU
    /// riparian fraction decides.
    pub terrain: Option<Terrain>,
}

// ==========================================
// ResolvedCompartment - compartment joined to its membership
// ==========================================
// Built once per run after normalization; input to the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCompartment {
    pub compartment: CompartmentUnit,
    pub miu_id: String,
    pub nbal_id: String,
    pub terrain: Terrain,
}

impl ResolvedCompartment {
    pub fn compt_id(&self) -> &str {
        &self.compartment.compt_id
    }

    pub fn area_ha(&self) -> f64 {
        self.compartment.area_ha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miu_terrain_threshold() {
        let mut miu = MiuUnit {
            miu_id: "M1".to_string(),
            area: 10.0,
            riparian_fraction: 0.4,
        };
        assert_eq!(miu.terrain(), Terrain::Landscape);

        miu.riparian_fraction = 0.6;
        assert_eq!(miu.terrain(), Terrain::Riparian);
    }
}
