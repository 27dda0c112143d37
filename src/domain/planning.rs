// ==========================================
// MUCP Planner - planning run entity
// ==========================================
// One user's simulation configuration. Monetary fields are stored
// rounded to 2 decimals; a run becomes immutable once simulation
// results exist for it (guarded in the repository layer).
// ==========================================

use crate::domain::types::{round2, Currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// BudgetPlan - one of the four capped plans
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlan {
    /// Start-year budget amount, >= 0.
    pub amount: f64,
    /// Year-over-year escalation percent in [0, 100].
    pub escalation_percent: f64,
}

impl BudgetPlan {
    pub fn new(amount: f64, escalation_percent: f64) -> Self {
        Self {
            amount: round2(amount),
            escalation_percent: round2(escalation_percent),
        }
    }

    /// Compounded budget for a simulated year.
    ///
    /// budget(year) = amount * (1 + escalation/100)^(year - start_year)
    pub fn escalated_amount(&self, start_year: i32, year: i32) -> f64 {
        let exponent = (year - start_year) as f64;
        self.amount * (1.0 + self.escalation_percent / 100.0).powf(exponent)
    }
}

// ==========================================
// PlanningRun
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRun {
    pub planning_id: String,
    pub user: String,
    pub project_name: String,
    pub clearing_norm_set: String,

    pub plans: [BudgetPlan; 4],

    /// Standard working day length in hours, [1, 24].
    pub working_day_hours: f64,
    /// Standard working days per year, [1, 365].
    pub working_year_days: u32,

    pub start_year: i32,
    /// Years to simulate, [1, 50].
    pub years_to_run: u32,

    pub currency: Currency,
    pub save_results: bool,

    pub created_at: DateTime<Utc>,
}

impl PlanningRun {
    /// Years covered by the run, start year inclusive.
    pub fn year_range(&self) -> std::ops::Range<i32> {
        self.start_year..self.start_year + self.years_to_run as i32
    }

    /// Budget plan by 1-based index.
    pub fn plan(&self, index: usize) -> Option<&BudgetPlan> {
        if (1..=4).contains(&index) {
            Some(&self.plans[index - 1])
        } else {
            None
        }
    }
}
