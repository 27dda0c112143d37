// ==========================================
// MUCP Planner - simulation orchestrator
// ==========================================
// Coordinates the engines for one planning run: resolve the spatial
// joins, score priorities, build the schedulable units, then run the
// optimal scenario and the four budget plans over the year range.
// ==========================================

use crate::domain::compartment::{
    CompartmentUnit, GisMappingRow, MiuUnit, NbalUnit, ResolvedCompartment,
};
use crate::domain::costing::CostingModel;
use crate::domain::norms::ClearingNormSet;
use crate::domain::planning::PlanningRun;
use crate::domain::prioritization::{Category, CompartmentPriorityRow};
use crate::domain::simulation::{SimulationOutput, YearlyBudgets};
use crate::domain::species::{
    density_percent_for_class, size_class_for_age, LinkedSpeciesRow, SpeciesRecord,
};
use crate::domain::types::Scenario;
use crate::engine::costing::CostingEngine;
use crate::engine::norm_resolver::NormResolver;
use crate::engine::scheduler::{BudgetScheduler, PlanUnit};
use crate::engine::scorer::PrioritizationScorer;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

// ==========================================
// AgeThresholds - size class boundaries in years
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct AgeThresholds {
    pub seedling_max_age: f64,
    pub young_max_age: f64,
}

impl Default for AgeThresholds {
    fn default() -> Self {
        Self {
            seedling_max_age: 2.0,
            young_max_age: 5.0,
        }
    }
}

// ==========================================
// NormalizedInputs - everything a run consumes
// ==========================================
// Produced by the import layer in read mode; the orchestrator treats
// it as immutable.
#[derive(Debug, Clone)]
pub struct NormalizedInputs {
    pub gis_mapping: Vec<GisMappingRow>,
    pub mius: Vec<MiuUnit>,
    pub nbals: Vec<NbalUnit>,
    pub compartments: Vec<CompartmentUnit>,
    pub miu_species: Vec<LinkedSpeciesRow>,
    pub nbal_species: Vec<LinkedSpeciesRow>,
    pub species: Vec<SpeciesRecord>,
    pub norm_set: ClearingNormSet,
    pub costing_models: Vec<CostingModel>,
    /// Costing-group tag -> model name, selected per run.
    pub costing_mapping: HashMap<String, String>,
    pub categories: Vec<Category>,
    pub priority_rows: Vec<CompartmentPriorityRow>,
}

// ==========================================
// SimulationRunResult
// ==========================================
#[derive(Debug, Clone)]
pub struct SimulationRunResult {
    pub output: SimulationOutput,
    /// Compartments left out of the run, with the reason.
    pub skipped_units: Vec<(String, String)>,
}

// ==========================================
// SimulationOrchestrator
// ==========================================
pub struct SimulationOrchestrator {
    scorer: PrioritizationScorer,
    scheduler: BudgetScheduler,
}

impl SimulationOrchestrator {
    pub fn new() -> Self {
        Self {
            scorer: PrioritizationScorer::new(),
            scheduler: BudgetScheduler::new(),
        }
    }

    /// Runs the full simulation: 5 scenarios over the year range.
    pub fn run(
        &self,
        run: &PlanningRun,
        inputs: &NormalizedInputs,
        thresholds: AgeThresholds,
    ) -> SimulationRunResult {
        info!(
            planning_id = %run.planning_id,
            compartments = inputs.compartments.len(),
            years = run.years_to_run,
            "starting simulation run"
        );

        // ==========================================
        // step 1: resolve spatial joins
        // ==========================================
        debug!("step 1: resolving compartment membership");
        let mut skipped_units = Vec::new();
        let resolved = self.resolve_compartments(inputs, &mut skipped_units);
        info!(
            resolved_count = resolved.len(),
            skipped_count = skipped_units.len(),
            "compartment membership resolved"
        );

        // ==========================================
        // step 2: prioritization scores
        // ==========================================
        debug!("step 2: scoring priorities");
        let scores = self
            .scorer
            .score_all(&inputs.categories, &inputs.priority_rows);

        // ==========================================
        // step 3: build schedulable units
        // ==========================================
        debug!("step 3: building plan units");
        let mut units = self.build_units(&resolved, inputs, &scores, thresholds, &mut skipped_units);
        BudgetScheduler::sort_units(&mut units);
        info!(units_count = units.len(), "plan units built");

        // ==========================================
        // step 4: propagate plan budgets over the years
        // ==========================================
        let mut escalated_budgets = BTreeMap::new();
        for year in run.year_range() {
            let budgets = YearlyBudgets {
                plan_1: run.plans[0].escalated_amount(run.start_year, year),
                plan_2: run.plans[1].escalated_amount(run.start_year, year),
                plan_3: run.plans[2].escalated_amount(run.start_year, year),
                plan_4: run.plans[3].escalated_amount(run.start_year, year),
            };
            escalated_budgets.insert(year, budgets.rounded());
        }

        // ==========================================
        // step 5: run the 5 scenarios
        // ==========================================
        let norms = NormResolver::from_set(&inputs.norm_set);
        let costing = CostingEngine::new(&inputs.costing_models, &inputs.costing_mapping);

        let mut scenario_years = BTreeMap::new();
        for scenario in Scenario::ALL {
            debug!(scenario = %scenario, "running scenario");
            let years = self
                .scheduler
                .run_scenario(scenario, &units, run, &norms, &costing);
            scenario_years.insert(scenario, years);
        }

        info!(planning_id = %run.planning_id, "simulation run complete");
        SimulationRunResult {
            output: SimulationOutput {
                scenario_years,
                escalated_budgets,
            },
            skipped_units,
        }
    }

    /// Joins each gis_mapping row to its compartment and MIU; the
    /// compartment's own terrain wins over the MIU riparian fraction.
    fn resolve_compartments(
        &self,
        inputs: &NormalizedInputs,
        skipped: &mut Vec<(String, String)>,
    ) -> Vec<ResolvedCompartment> {
        let compartments: HashMap<&str, &CompartmentUnit> = inputs
            .compartments
            .iter()
            .map(|c| (c.compt_id.as_str(), c))
            .collect();
        let mius: HashMap<&str, &MiuUnit> =
            inputs.mius.iter().map(|m| (m.miu_id.as_str(), m)).collect();
        let nbals: HashMap<&str, &NbalUnit> = inputs
            .nbals
            .iter()
            .map(|n| (n.nbal_id.as_str(), n))
            .collect();

        let mut resolved = Vec::with_capacity(inputs.gis_mapping.len());
        for row in &inputs.gis_mapping {
            let Some(compartment) = compartments.get(row.compt_id.as_str()) else {
                warn!(compt_id = %row.compt_id, "no compartment attributes for mapping row");
                skipped.push((row.compt_id.clone(), "missing compartment attributes".to_string()));
                continue;
            };
            let Some(miu) = mius.get(row.miu_id.as_str()) else {
                warn!(compt_id = %row.compt_id, miu_id = %row.miu_id, "no MIU for mapping row");
                skipped.push((row.compt_id.clone(), format!("missing miu {}", row.miu_id)));
                continue;
            };
            if !nbals.contains_key(row.nbal_id.as_str()) {
                warn!(compt_id = %row.compt_id, nbal_id = %row.nbal_id, "no NBAL for mapping row");
                skipped.push((row.compt_id.clone(), format!("missing nbal {}", row.nbal_id)));
                continue;
            }

            let terrain = compartment.terrain.unwrap_or_else(|| miu.terrain());
            resolved.push(ResolvedCompartment {
                compartment: (*compartment).clone(),
                miu_id: row.miu_id.clone(),
                nbal_id: row.nbal_id.clone(),
                terrain,
            });
        }
        resolved
    }

    /// The dominant species of a spatial unit is the linked row with
    /// the highest density class; MIU links win over NBAL links.
    fn dominant_link<'a>(
        &self,
        miu_links: &'a [&LinkedSpeciesRow],
        nbal_links: &'a [&LinkedSpeciesRow],
    ) -> Option<&'a LinkedSpeciesRow> {
        let pick = |links: &'a [&LinkedSpeciesRow]| {
            links
                .iter()
                .max_by(|a, b| {
                    a.idenscode
                        .cmp(&b.idenscode)
                        .then_with(|| b.species.cmp(&a.species))
                })
                .copied()
        };
        pick(miu_links).or_else(|| pick(nbal_links))
    }

    fn build_units(
        &self,
        resolved: &[ResolvedCompartment],
        inputs: &NormalizedInputs,
        scores: &HashMap<String, f64>,
        thresholds: AgeThresholds,
        skipped: &mut Vec<(String, String)>,
    ) -> Vec<PlanUnit> {
        let species_by_name: HashMap<String, &SpeciesRecord> = inputs
            .species
            .iter()
            .map(|s| (s.species_name.to_lowercase(), s))
            .collect();

        let mut miu_links: HashMap<&str, Vec<&LinkedSpeciesRow>> = HashMap::new();
        for link in &inputs.miu_species {
            miu_links.entry(link.unit_id.as_str()).or_default().push(link);
        }
        let mut nbal_links: HashMap<&str, Vec<&LinkedSpeciesRow>> = HashMap::new();
        for link in &inputs.nbal_species {
            nbal_links.entry(link.unit_id.as_str()).or_default().push(link);
        }
        let empty: Vec<&LinkedSpeciesRow> = Vec::new();

        let mut units = Vec::with_capacity(resolved.len());
        for rc in resolved {
            let compt_id = rc.compt_id().to_string();
            let miu = miu_links.get(rc.miu_id.as_str()).unwrap_or(&empty);
            let nbal = nbal_links.get(rc.nbal_id.as_str()).unwrap_or(&empty);

            let Some(link) = self.dominant_link(miu, nbal) else {
                debug!(compt_id = %compt_id, "no linked species, compartment carries no invasion");
                skipped.push((compt_id, "no linked species".to_string()));
                continue;
            };

            let Some(species) = species_by_name.get(&link.species.to_lowercase()) else {
                warn!(compt_id = %compt_id, species = %link.species, "linked species not in reference table");
                skipped.push((compt_id, format!("unknown species {}", link.species)));
                continue;
            };

            let initial_density = density_percent_for_class(link.idenscode).unwrap_or(0.0);
            let size_class = size_class_for_age(
                link.age,
                thresholds.seedling_max_age,
                thresholds.young_max_age,
            );

            units.push(PlanUnit {
                compt_id: compt_id.clone(),
                miu_id: rc.miu_id.clone(),
                nbal_id: rc.nbal_id.clone(),
                area_ha: rc.area_ha(),
                terrain: rc.terrain,
                costing_tag: rc.compartment.costing.clone(),
                priority: scores.get(&compt_id).copied(),
                species: (*species).clone(),
                size_class,
                initial_density,
            });
        }
        units
    }
}

impl Default for SimulationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
