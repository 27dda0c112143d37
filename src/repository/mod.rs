// ==========================================
// MUCP Planner - repository layer
// ==========================================
// SQLite persistence. Repositories carry no business logic beyond the
// results-immutability guard on planning runs.
// ==========================================

pub mod error;
pub mod planning_repo;
pub mod results_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use planning_repo::PlanningRepository;
pub use results_repo::ResultsRepository;
