// ==========================================
// MUCP Planner - species reference entities
// ==========================================
// Species carry the treatment parameters the scheduler needs: growth
// form (norm lookup), reduction percentages per process, flow factors
// per age class, densification. Default rows (no owning user) can be
// overridden per-user; the merge happens once at normalization time.
// ==========================================

use crate::domain::types::{Process, SizeClass};
use serde::{Deserialize, Serialize};

// ==========================================
// ProvinceFlags - provincial occurrence
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceFlags {
    pub wc: bool,
    pub nc: bool,
    pub kzn: bool,
    pub gtg: bool,
    pub mpl: bool,
    pub fs: bool,
    pub ec: bool,
    pub lmp: bool,
    pub nw: bool,
}

// ==========================================
// SpeciesRecord
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub species_name: String,
    pub genus: String,
    pub english_name: Option<String>,
    pub afrikaans_name: Option<String>,
    /// Lower-cased growth form name; must resolve against the growth
    /// form reference table.
    pub growth_form: String,
    /// Lower-cased treatment method used when clearing this species.
    pub treatment_method: String,
    pub provinces: ProvinceFlags,

    // Treatment parameters
    /// Density reduction achieved by a fully funded initial treatment,
    /// in percent of current density.
    pub initial_reduction: Option<f64>,
    /// Density reduction achieved by a fully funded follow-up
    /// treatment, in percent of current density.
    pub follow_up_reduction: Option<f64>,
    /// Months between treatments; one of {3, 4, 6, 12, 18, 24}.
    pub treatment_frequency: Option<i32>,
    /// Densification factor applied to untreated stands.
    pub densification: Option<i32>,

    // Flow factors by age/condition class (volume per ha per unit density)
    pub flow_optimal: Option<f64>,
    pub flow_sub_optimal: Option<f64>,
    pub flow_young: Option<f64>,
    pub flow_seedling: Option<f64>,
    pub flow_coppice: Option<f64>,
}

impl SpeciesRecord {
    /// Reduction percentage for the given process; 0 when absent.
    pub fn reduction_percent(&self, process: Process) -> f64 {
        match process {
            Process::Initial => self.initial_reduction.unwrap_or(0.0),
            Process::FollowUp => self.follow_up_reduction.unwrap_or(0.0),
        }
    }

    /// Flow factor for a stand of the given size class. Stands under
    /// follow-up treatment regrow as coppice.
    pub fn flow_factor(&self, size_class: SizeClass, coppicing: bool) -> f64 {
        if coppicing {
            return self.flow_coppice.unwrap_or(0.0);
        }
        match size_class {
            SizeClass::Seedling => self.flow_seedling.unwrap_or(0.0),
            SizeClass::Young => self.flow_young.unwrap_or(0.0),
            SizeClass::Adult | SizeClass::All => self.flow_optimal.unwrap_or(0.0),
        }
    }
}

// ==========================================
// LinkedSpeciesRow - species observed on a spatial unit
// ==========================================
// From the MIU/NBAL linked-species workbooks: unit id, species name,
// density class code and stand age in years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedSpeciesRow {
    pub unit_id: String,
    pub species: String,
    /// Density class code 0..=6, mapped to canopy percent through
    /// DENSITY_CLASS_PERCENT.
    pub idenscode: i32,
    /// Stand age in years; decides the size class for norm lookups.
    pub age: f64,
}

/// Canopy density percent for density class codes 0..=6.
pub const DENSITY_CLASS_PERCENT: [f64; 7] = [0.0, 1.0, 5.0, 25.0, 50.0, 75.0, 100.0];

/// Canopy percent for a density class code; None for out-of-range codes.
pub fn density_percent_for_class(idenscode: i32) -> Option<f64> {
    if (0..=6).contains(&idenscode) {
        Some(DENSITY_CLASS_PERCENT[idenscode as usize])
    } else {
        None
    }
}

/// Size class for a stand age given the (seedling, young) age
/// thresholds in years.
pub fn size_class_for_age(age: f64, seedling_max: f64, young_max: f64) -> SizeClass {
    if age <= seedling_max {
        SizeClass::Seedling
    } else if age <= young_max {
        SizeClass::Young
    } else {
        SizeClass::Adult
    }
}
