// ==========================================
// MUCP Planner - API layer
// ==========================================
// Outer surface over the engines and repositories.
// ==========================================

pub mod error;
pub mod simulation_api;

pub use error::{ApiError, ApiResult};
pub use simulation_api::{ProjectTables, SimulationApi, SimulationOutcome};
