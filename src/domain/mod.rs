// ==========================================
// MUCP Planner - domain layer
// ==========================================
// Entities and shared types. Reference data is read-only once
// normalized; only the simulation output types are derived state.
// ==========================================

pub mod compartment;
pub mod costing;
pub mod norms;
pub mod planning;
pub mod prioritization;
pub mod simulation;
pub mod species;
pub mod types;

pub use compartment::{CompartmentUnit, GisMappingRow, MiuUnit, NbalUnit, ResolvedCompartment};
pub use costing::{CostingModel, DailyCostItem, DayRateBundle};
pub use norms::{ClearingNorm, ClearingNormSet, NormKey};
pub use planning::{BudgetPlan, PlanningRun};
pub use prioritization::{Category, CompartmentPriorityRow, NumericBand, TextPriorityValue};
pub use simulation::{
    ScenarioYearTotals, SimulationOutput, SimulationRow, SimulationSummary, YearlyBudgets,
};
pub use species::{LinkedSpeciesRow, ProvinceFlags, SpeciesRecord};
