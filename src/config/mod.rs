// ==========================================
// MUCP Planner - configuration layer
// ==========================================
// System configuration with defaults.
// Storage: config_kv table
// ==========================================

pub mod config_manager;
pub mod planning_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use planning_config_trait::PlanningConfigReader;
