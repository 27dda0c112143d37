// ==========================================
// MUCP Planner - planning configuration trait
// ==========================================
// Read-only configuration interface the engines and API depend on.
// Implemented by ConfigManager over the config_kv table.
// ==========================================

use crate::engine::AgeThresholds;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// PlanningConfigReader Trait
// ==========================================
#[async_trait(?Send)]
pub trait PlanningConfigReader: Send + Sync {
    /// Oldest stand age still classed as seedling, in years.
    ///
    /// Default: 2.0
    async fn get_seedling_max_age(&self) -> Result<f64, Box<dyn Error>>;

    /// Oldest stand age still classed as young, in years.
    ///
    /// Default: 5.0
    async fn get_young_max_age(&self) -> Result<f64, Box<dyn Error>>;

    /// Standard working day length in hours used when a run does not
    /// set its own.
    ///
    /// Default: 8.0
    async fn get_default_working_day_hours(&self) -> Result<f64, Box<dyn Error>>;

    /// Standard working days per year used when a run does not set its
    /// own.
    ///
    /// Default: 220
    async fn get_default_working_year_days(&self) -> Result<u32, Box<dyn Error>>;

    /// Both size-class boundaries in one call.
    async fn get_age_thresholds(&self) -> Result<AgeThresholds, Box<dyn Error>> {
        Ok(AgeThresholds {
            seedling_max_age: self.get_seedling_max_age().await?,
            young_max_age: self.get_young_max_age().await?,
        })
    }
}
