// ==========================================
// MUCP Planner - costing engine
// ==========================================
// Resolves a compartment's costing-group tag to a day-rate bundle and
// prices a treatment. A tag without a mapping is a row-level gap: the
// row carries cost None and the batch continues.
// ==========================================

use crate::domain::costing::{CostingModel, DayRateBundle};
use crate::domain::types::Process;
use std::collections::HashMap;

// ==========================================
// CostingEngine
// ==========================================
pub struct CostingEngine {
    /// Costing-group tag (lower-cased) -> model name (lower-cased).
    mapping: HashMap<String, String>,
    /// Model name (lower-cased) -> model.
    models: HashMap<String, CostingModel>,
}

impl CostingEngine {
    pub fn new(models: &[CostingModel], mapping: &HashMap<String, String>) -> Self {
        let models = models
            .iter()
            .map(|model| (model.name.to_lowercase(), model.clone()))
            .collect();
        let mapping = mapping
            .iter()
            .map(|(tag, name)| (tag.trim().to_lowercase(), name.trim().to_lowercase()))
            .collect();
        Self { mapping, models }
    }

    /// Model mapped to a costing-group tag, if any.
    pub fn model_for_tag(&self, tag: &str) -> Option<&CostingModel> {
        let name = self.mapping.get(&tag.trim().to_lowercase())?;
        self.models.get(name)
    }

    /// Day-rate bundle for a tag and process. None when the tag has no
    /// mapping or the mapped model does not exist.
    pub fn bundle(&self, tag: &str, process: Process) -> Option<DayRateBundle> {
        self.model_for_tag(tag)
            .map(|model| DayRateBundle::from_model(model, process))
    }

    /// Cost of an action: person-days converted to team-days, each
    /// priced at the bundle's full team-day rate.
    pub fn action_cost(bundle: &DayRateBundle, person_days: f64, working_day_hours: f64) -> f64 {
        if bundle.team_size == 0 {
            return 0.0;
        }
        let team_days = person_days / bundle.team_size as f64;
        team_days * bundle.cost_per_team_day(working_day_hours)
    }
}
