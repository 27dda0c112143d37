// ==========================================
// Shared test builders
// ==========================================
#![allow(dead_code)]

use mucp_planner::domain::costing::CostingModel;
use mucp_planner::domain::norms::{ClearingNorm, ClearingNormSet, NormKey};
use mucp_planner::domain::planning::{BudgetPlan, PlanningRun};
use mucp_planner::domain::species::{ProvinceFlags, SpeciesRecord};
use mucp_planner::domain::types::{Currency, Process, SizeClass, Terrain};
use mucp_planner::importer::RawTable;
use std::collections::HashMap;

pub fn species(name: &str) -> SpeciesRecord {
    SpeciesRecord {
        species_name: name.to_string(),
        genus: "Acacia".to_string(),
        english_name: Some("Black Wattle".to_string()),
        afrikaans_name: None,
        growth_form: "sprouting tree".to_string(),
        treatment_method: "cut stump".to_string(),
        provinces: ProvinceFlags::default(),
        initial_reduction: Some(75.0),
        follow_up_reduction: Some(90.0),
        treatment_frequency: Some(12),
        densification: Some(2),
        flow_optimal: Some(4.0),
        flow_sub_optimal: Some(3.0),
        flow_young: Some(2.0),
        flow_seedling: Some(0.5),
        flow_coppice: Some(1.5),
    }
}

pub fn norm_set() -> ClearingNormSet {
    let norm = |terrain, size_class, process, ppd| ClearingNorm {
        key: NormKey::new("sprouting tree", "cut stump", terrain, size_class, process),
        density: 100.0,
        ppd,
    };
    ClearingNormSet {
        name: "default".to_string(),
        norms: vec![
            norm(Terrain::Landscape, SizeClass::All, Process::Initial, 5.0),
            norm(Terrain::Landscape, SizeClass::All, Process::FollowUp, 10.0),
            norm(Terrain::Riparian, SizeClass::All, Process::Initial, 2.5),
            norm(Terrain::Riparian, SizeClass::All, Process::FollowUp, 5.0),
        ],
    }
}

pub fn costing_model() -> CostingModel {
    CostingModel {
        name: "Standard".to_string(),
        initial_team_size: 10,
        initial_cost_per_day: 2000.0,
        followup_team_size: 5,
        followup_cost_per_day: 1000.0,
        vehicle_cost_per_day: 0.0,
        fuel_cost_per_hour: 0.0,
        maintenance_level: 1,
        daily_cost_items: vec![],
    }
}

pub fn costing_mapping() -> HashMap<String, String> {
    [("1".to_string(), "Standard".to_string())]
        .into_iter()
        .collect()
}

pub fn planning_run(plan_1: BudgetPlan, years: u32) -> PlanningRun {
    PlanningRun {
        planning_id: "test-run".to_string(),
        user: "tester".to_string(),
        project_name: "demo".to_string(),
        clearing_norm_set: "default".to_string(),
        plans: [
            plan_1,
            BudgetPlan::new(0.0, 0.0),
            BudgetPlan::new(0.0, 0.0),
            BudgetPlan::new(0.0, 0.0),
        ],
        working_day_hours: 8.0,
        working_year_days: 220,
        start_year: 2025,
        years_to_run: years,
        currency: Currency::ZAR,
        save_results: false,
        created_at: chrono::Utc::now(),
    }
}

pub fn raw_table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rows = rows
        .iter()
        .map(|cells| {
            let mut map = HashMap::new();
            for (i, cell) in cells.iter().enumerate() {
                map.insert(headers[i].clone(), cell.to_string());
            }
            map
        })
        .collect();
    RawTable { headers, rows }
}
