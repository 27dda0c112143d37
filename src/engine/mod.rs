// ==========================================
// MUCP Planner - engine layer
// ==========================================
// The five computation engines: prioritization scorer, clearing-norm
// resolver, costing engine, multi-year budget scheduler and the
// orchestrator coordinating them per planning run.
// ==========================================

pub mod costing;
pub mod norm_resolver;
pub mod orchestrator;
pub mod scheduler;
pub mod scorer;

pub use costing::CostingEngine;
pub use norm_resolver::NormResolver;
pub use orchestrator::{
    AgeThresholds, NormalizedInputs, SimulationOrchestrator, SimulationRunResult,
};
pub use scheduler::{BudgetScheduler, PlanUnit};
pub use scorer::{compare_priority, PrioritizationScorer};
