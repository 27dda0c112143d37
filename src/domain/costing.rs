// ==========================================
// MUCP Planner - costing model entities
// ==========================================
// A costing model carries the day-rate structure for a clearing team.
// Compartments point at a model indirectly: their costing tag is
// resolved through the per-run mapping.
// ==========================================

use crate::domain::types::Process;
use serde::{Deserialize, Serialize};

// ==========================================
// DailyCostItem - extra per-day cost line
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCostItem {
    pub name: String,
    pub daily_cost: f64,
}

// ==========================================
// CostingModel
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostingModel {
    pub name: String,
    pub initial_team_size: u32,
    pub initial_cost_per_day: f64,
    pub followup_team_size: u32,
    pub followup_cost_per_day: f64,
    pub vehicle_cost_per_day: f64,
    pub fuel_cost_per_hour: f64,
    pub maintenance_level: u32,
    pub daily_cost_items: Vec<DailyCostItem>,
}

impl CostingModel {
    /// Sum of the extra daily cost items only. The base day rates are
    /// NOT included; this mirrors the stored behavior upstream of the
    /// costing table and is pinned by tests.
    pub fn total_cost_per_day(&self) -> f64 {
        self.daily_cost_items.iter().map(|i| i.daily_cost).sum()
    }

    /// Team size applicable to the given process.
    pub fn team_size(&self, process: Process) -> u32 {
        match process {
            Process::Initial => self.initial_team_size,
            Process::FollowUp => self.followup_team_size,
        }
    }

    /// Team day rate applicable to the given process.
    pub fn cost_per_day(&self, process: Process) -> f64 {
        match process {
            Process::Initial => self.initial_cost_per_day,
            Process::FollowUp => self.followup_cost_per_day,
        }
    }
}

// ==========================================
// DayRateBundle - resolved per-compartment rate card
// ==========================================
// Snapshot of everything the scheduler needs to price one treatment
// day for a compartment, selected by process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRateBundle {
    pub team_size: u32,
    pub team_cost_per_day: f64,
    pub vehicle_cost_per_day: f64,
    pub fuel_cost_per_hour: f64,
    pub daily_items_total: f64,
}

impl DayRateBundle {
    pub fn from_model(model: &CostingModel, process: Process) -> Self {
        Self {
            team_size: model.team_size(process),
            team_cost_per_day: model.cost_per_day(process),
            vehicle_cost_per_day: model.vehicle_cost_per_day,
            fuel_cost_per_hour: model.fuel_cost_per_hour,
            daily_items_total: model.total_cost_per_day(),
        }
    }

    /// Full cost of one team-day given the standard working day length
    /// in hours.
    pub fn cost_per_team_day(&self, working_day_hours: f64) -> f64 {
        self.team_cost_per_day
            + self.vehicle_cost_per_day
            + self.fuel_cost_per_hour * working_day_hours
            + self.daily_items_total
    }
}
