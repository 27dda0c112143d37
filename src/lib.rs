// ==========================================
// MUCP Planner - core library
// ==========================================
// Decision-support tool for invasive vegetation clearing: one planning
// run simulates an unconstrained optimal scenario and four capped
// budget plans over a multi-year horizon.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// domain layer - entities and types
pub mod domain;

// repository layer - data access
pub mod repository;

// engine layer - business rules
pub mod engine;

// import layer - external data
pub mod importer;

// configuration layer
pub mod config;

// database infrastructure (connection setup, unified PRAGMA)
pub mod db;

// logging
pub mod logging;

// API layer - business interfaces
pub mod api;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{
    CategoryType, ClearingState, Currency, Process, Scenario, SizeClass, Terrain,
};

pub use domain::{
    BudgetPlan, Category, ClearingNorm, ClearingNormSet, CompartmentUnit, CostingModel,
    PlanningRun, SimulationOutput, SimulationRow, SimulationSummary, SpeciesRecord,
};

pub use engine::{
    AgeThresholds, BudgetScheduler, CostingEngine, NormResolver, NormalizedInputs,
    PrioritizationScorer, SimulationOrchestrator,
};

pub use api::{ApiError, ProjectTables, SimulationApi, SimulationOutcome};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "MUCP Planner";
