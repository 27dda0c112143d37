// ==========================================
// MUCP Planner - simulation output entities
// ==========================================
// Derived data only: created by a successful simulation run and
// replaced wholesale on re-run, never patched incrementally.
// ==========================================

use crate::domain::types::{round2, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SimulationRow - one compartment in one (scenario, year)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRow {
    pub compt_id: String,
    pub miu_id: String,
    pub nbal_id: String,
    /// Composite priority score from the scorer; None when the
    /// compartment had no priority attributes.
    pub priority: Option<f64>,
    pub person_days: f64,
    /// None when the compartment's costing tag had no mapping for the
    /// run (row-level gap, never a batch abort).
    pub cost: Option<f64>,
    /// Remaining density percent after this year's treatment.
    pub density: f64,
    pub flow: f64,
    /// True when any clearing work happened on the compartment this year.
    pub cleared_now: bool,
    /// True when this year's planned treatment was fully funded.
    pub cleared_fully: bool,
}

impl SimulationRow {
    /// Zero-valued row for a compartment the scheduler did not reach.
    pub fn untouched(compt_id: &str, miu_id: &str, nbal_id: &str, priority: Option<f64>, density: f64) -> Self {
        Self {
            compt_id: compt_id.to_string(),
            miu_id: miu_id.to_string(),
            nbal_id: nbal_id.to_string(),
            priority,
            person_days: 0.0,
            cost: None,
            density,
            flow: 0.0,
            cleared_now: false,
            cleared_fully: false,
        }
    }
}

// ==========================================
// YearlyBudgets - propagated plan budgets for one year
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyBudgets {
    pub plan_1: f64,
    pub plan_2: f64,
    pub plan_3: f64,
    pub plan_4: f64,
}

impl YearlyBudgets {
    pub fn rounded(&self) -> YearlyBudgets {
        YearlyBudgets {
            plan_1: round2(self.plan_1),
            plan_2: round2(self.plan_2),
            plan_3: round2(self.plan_3),
            plan_4: round2(self.plan_4),
        }
    }

    pub fn by_index(&self, index: usize) -> Option<f64> {
        match index {
            1 => Some(self.plan_1),
            2 => Some(self.plan_2),
            3 => Some(self.plan_3),
            4 => Some(self.plan_4),
            _ => None,
        }
    }
}

// ==========================================
// SimulationOutput - full result of one run
// ==========================================
// BTreeMap keeps years in ascending order for deterministic
// persistence and summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Per scenario, per year, the compartment row table.
    pub scenario_years: BTreeMap<Scenario, BTreeMap<i32, Vec<SimulationRow>>>,
    /// Propagated plan budgets per year, computed once regardless of
    /// which scenario consumes them.
    pub escalated_budgets: BTreeMap<i32, YearlyBudgets>,
}

impl SimulationOutput {
    pub fn rows(&self, scenario: Scenario, year: i32) -> Option<&Vec<SimulationRow>> {
        self.scenario_years.get(&scenario).and_then(|y| y.get(&year))
    }

    /// Total cost for a (scenario, year), null costs counted as 0.
    pub fn total_cost(&self, scenario: Scenario, year: i32) -> f64 {
        self.rows(scenario, year)
            .map(|rows| rows.iter().filter_map(|r| r.cost).sum())
            .unwrap_or(0.0)
    }
}

// ==========================================
// SimulationSummary - transient display aggregate
// ==========================================
// Used when save_results is off: per-year per-scenario totals, with
// the same aggregation rules as the original display path (cost nulls
// as 0, mean over non-zero densities).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub years: Vec<i32>,
    pub per_scenario: BTreeMap<Scenario, BTreeMap<i32, ScenarioYearTotals>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioYearTotals {
    pub cost: f64,
    pub flow: f64,
    pub person_days: f64,
    pub mean_density: f64,
}

impl SimulationSummary {
    pub fn from_output(output: &SimulationOutput) -> Self {
        let mut years: Vec<i32> = output
            .scenario_years
            .values()
            .flat_map(|y| y.keys().copied())
            .collect();
        years.sort_unstable();
        years.dedup();

        let mut per_scenario = BTreeMap::new();
        for (scenario, year_tables) in &output.scenario_years {
            let mut per_year = BTreeMap::new();
            for (year, rows) in year_tables {
                let cost: f64 = rows.iter().filter_map(|r| r.cost).sum();
                let flow: f64 = rows.iter().map(|r| r.flow).sum();
                let person_days: f64 = rows.iter().map(|r| r.person_days).sum();

                let nonzero: Vec<f64> = rows
                    .iter()
                    .map(|r| r.density)
                    .filter(|d| *d != 0.0)
                    .collect();
                let mean_density = if nonzero.is_empty() {
                    0.0
                } else {
                    nonzero.iter().sum::<f64>() / nonzero.len() as f64
                };

                per_year.insert(
                    *year,
                    ScenarioYearTotals {
                        cost,
                        flow,
                        person_days,
                        mean_density,
                    },
                );
            }
            per_scenario.insert(*scenario, per_year);
        }

        Self { years, per_scenario }
    }
}
