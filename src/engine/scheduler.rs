// ==========================================
// MUCP Planner - multi-year budget scheduler
// ==========================================
// Runs one scenario over the planning years: walks compartments in
// descending priority, prices each treatment, and spends the year's
// budget greedily with no look-ahead. Compartment state advances
// untouched -> partially_cleared -> fully_cleared and never regresses;
// fully cleared compartments keep receiving follow-up treatment on
// their residual density.
// ==========================================
// Input: plan units (scored, resolved) + run parameters + lookups
// Output: per-year simulation row tables for the scenario
// ==========================================

use crate::domain::norms::NormKey;
use crate::domain::planning::PlanningRun;
use crate::domain::simulation::SimulationRow;
use crate::domain::species::SpeciesRecord;
use crate::domain::types::{round2, ClearingState, Process, Scenario, SizeClass, Terrain};
use crate::engine::costing::CostingEngine;
use crate::engine::norm_resolver::NormResolver;
use crate::engine::scorer::compare_priority;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// PlanUnit - one schedulable compartment
// ==========================================
// Joined once by the orchestrator: compartment attributes, membership,
// dominant species, initial density and the composite priority score.
#[derive(Debug, Clone)]
pub struct PlanUnit {
    pub compt_id: String,
    pub miu_id: String,
    pub nbal_id: String,
    pub area_ha: f64,
    pub terrain: Terrain,
    pub costing_tag: String,
    pub priority: Option<f64>,
    pub species: SpeciesRecord,
    pub size_class: SizeClass,
    /// Canopy density percent at the start of the run.
    pub initial_density: f64,
}

// per-scenario per-compartment carry-over state
#[derive(Debug, Clone, Copy)]
struct UnitState {
    state: ClearingState,
    density: f64,
}

// ==========================================
// BudgetScheduler
// ==========================================
pub struct BudgetScheduler {
    // stateless engine
}

impl BudgetScheduler {
    pub fn new() -> Self {
        Self {}
    }

    /// Sorts units into the scheduler traversal order: descending
    /// priority, unscored last, ties by compartment id.
    pub fn sort_units(units: &mut [PlanUnit]) {
        units.sort_by(|a, b| {
            compare_priority(a.priority, &a.compt_id, b.priority, &b.compt_id)
        });
    }

    /// Runs one scenario over the full year range. `units` must
    /// already be in traversal order.
    #[instrument(skip(self, units, run, norms, costing), fields(
        scenario = %scenario,
        units_count = units.len(),
        years = run.years_to_run
    ))]
    pub fn run_scenario(
        &self,
        scenario: Scenario,
        units: &[PlanUnit],
        run: &PlanningRun,
        norms: &NormResolver,
        costing: &CostingEngine,
    ) -> BTreeMap<i32, Vec<SimulationRow>> {
        let mut states: Vec<UnitState> = units
            .iter()
            .map(|unit| UnitState {
                state: ClearingState::Untouched,
                density: unit.initial_density,
            })
            .collect();

        let mut year_tables = BTreeMap::new();
        for year in run.year_range() {
            let budget = scenario
                .plan_index()
                .and_then(|index| run.plan(index))
                .map(|plan| plan.escalated_amount(run.start_year, year));

            let rows = self.run_year(units, &mut states, budget, run, norms, costing);
            year_tables.insert(year, rows);
        }
        year_tables
    }

    /// One budget year: greedy allocation down the priority order.
    /// `budget` None means unlimited (the optimal scenario).
    fn run_year(
        &self,
        units: &[PlanUnit],
        states: &mut [UnitState],
        budget: Option<f64>,
        run: &PlanningRun,
        norms: &NormResolver,
        costing: &CostingEngine,
    ) -> Vec<SimulationRow> {
        let mut remaining = budget;
        let mut exhausted = false;
        let mut rows = Vec::with_capacity(units.len());

        for (unit, state) in units.iter().zip(states.iter_mut()) {
            if exhausted {
                rows.push(self.idle_row(unit, state));
                continue;
            }

            let process = state.state.applicable_process();
            let reduction_percent = unit.species.reduction_percent(process);
            let planned_reduction = state.density * reduction_percent / 100.0;
            if planned_reduction <= 0.0 {
                rows.push(self.idle_row(unit, state));
                continue;
            }

            let key = NormKey::new(
                &unit.species.growth_form,
                &unit.species.treatment_method,
                unit.terrain,
                unit.size_class,
                process,
            );
            let Some(person_days) = norms.person_days(&key, unit.area_ha, planned_reduction)
            else {
                // norm gap: zero row, state retained
                debug!(compt_id = %unit.compt_id, "no clearing norm for unit");
                rows.push(self.idle_row(unit, state));
                continue;
            };

            let bundle = costing.bundle(&unit.costing_tag, process);
            let full_cost = bundle
                .map(|b| CostingEngine::action_cost(&b, person_days, run.working_day_hours));

            match remaining {
                // unlimited budget: every treatment is fully funded,
                // an unmapped costing tag only blanks the cost column
                None => {
                    rows.push(self.treated_row(
                        unit,
                        state,
                        process,
                        person_days,
                        full_cost,
                        planned_reduction,
                        true,
                    ));
                }
                Some(ref mut available) => {
                    let Some(full_cost) = full_cost else {
                        // cannot charge an unknown cost against a
                        // finite budget: skip, state retained
                        debug!(compt_id = %unit.compt_id, tag = %unit.costing_tag, "no costing mapping for unit");
                        rows.push(self.idle_row(unit, state));
                        continue;
                    };

                    if *available <= 0.0 {
                        exhausted = true;
                        rows.push(self.idle_row(unit, state));
                    } else if full_cost <= *available {
                        *available -= full_cost;
                        rows.push(self.treated_row(
                            unit,
                            state,
                            process,
                            person_days,
                            Some(full_cost),
                            planned_reduction,
                            true,
                        ));
                    } else {
                        // partial funding: proportional work, budget
                        // zeroed, allocation stops for the year
                        let fraction = *available / full_cost;
                        let funded_cost = *available;
                        *available = 0.0;
                        exhausted = true;
                        rows.push(self.treated_row(
                            unit,
                            state,
                            process,
                            person_days * fraction,
                            Some(funded_cost),
                            planned_reduction * fraction,
                            false,
                        ));
                    }
                }
            }
        }

        rows
    }

    /// Row for a compartment the year's allocation did not treat.
    fn idle_row(&self, unit: &PlanUnit, state: &UnitState) -> SimulationRow {
        SimulationRow::untouched(
            &unit.compt_id,
            &unit.miu_id,
            &unit.nbal_id,
            unit.priority,
            round2(state.density),
        )
    }

    /// Applies a funded treatment to the carry-over state and builds
    /// the year's row.
    #[allow(clippy::too_many_arguments)]
    fn treated_row(
        &self,
        unit: &PlanUnit,
        state: &mut UnitState,
        process: Process,
        person_days: f64,
        cost: Option<f64>,
        funded_reduction: f64,
        fully_funded: bool,
    ) -> SimulationRow {
        state.density = (state.density - funded_reduction).max(0.0);
        state.state = match (state.state, fully_funded) {
            // fully cleared never regresses
            (ClearingState::FullyCleared, _) => ClearingState::FullyCleared,
            (_, true) => ClearingState::FullyCleared,
            (_, false) => ClearingState::PartiallyCleared,
        };

        let coppicing = process == Process::FollowUp;
        let flow = unit.area_ha
            * (state.density / 100.0)
            * unit.species.flow_factor(unit.size_class, coppicing);

        SimulationRow {
            compt_id: unit.compt_id.clone(),
            miu_id: unit.miu_id.clone(),
            nbal_id: unit.nbal_id.clone(),
            priority: unit.priority,
            person_days: round2(person_days),
            cost: cost.map(round2),
            density: round2(state.density),
            flow: round2(flow),
            cleared_now: true,
            cleared_fully: fully_funded,
        }
    }
}

impl Default for BudgetScheduler {
    fn default() -> Self {
        Self::new()
    }
}
