// ==========================================
// Simulation API end-to-end tests
// ==========================================
// Full surface against a real SQLite file: validation gate, transient
// summaries, persisted results and their reload.

mod helpers;

use helpers::{planning_run, raw_table};
use mucp_planner::api::{ApiError, ProjectTables, SimulationApi, SimulationOutcome};
use mucp_planner::config::ConfigManager;
use mucp_planner::db::initialize_database;
use mucp_planner::domain::planning::BudgetPlan;
use mucp_planner::domain::types::Scenario;
use mucp_planner::repository::{PlanningRepository, ResultsRepository};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn project_tables() -> ProjectTables {
    ProjectTables {
        gis_mapping: raw_table(
            &["nbal_id", "miu_id", "compt_id", "area"],
            &[&["N1", "M1", "C1", "10.0"]],
        ),
        miu: raw_table(&["miu_id", "area", "riparian_c"], &[&["M1", "10.0", "0.2"]]),
        nbal: raw_table(&["nbal_id", "area", "stage"], &[&["N1", "10.0", "initial"]]),
        compartment: raw_table(
            &["compt_id", "area_ha", "slope", "walk_time", "drive_time", "costing", "grow_con"],
            &[&["C1", "10.0", "5", "0.5", "1.0", "1", "natural"]],
        ),
        miu_species: raw_table(
            &["miu_id", "species", "idenscode", "age"],
            &[&["M1", "Acacia mearnsii", "4", "8"]],
        ),
        nbal_species: raw_table(&["nbal_id", "species", "idenscode", "age"], &[]),
        growth_forms: raw_table(&["growth_form"], &[&["sprouting tree"]]),
        treatment_methods: raw_table(&["treatment_method"], &[&["cut stump"]]),
        default_species: None,
        species: raw_table(
            &["species", "growth_form", "treatment_method", "initial_reduction", "follow_up_reduction"],
            &[&["Acacia mearnsii", "sprouting tree", "cut stump", "75", "90"]],
        ),
        default_norms: None,
        norms: raw_table(
            &["growth_form", "treatment_method", "terrain", "size_class", "process", "density", "ppd"],
            &[
                &["sprouting tree", "cut stump", "landscape", "all", "initial", "100", "5.0"],
                &["sprouting tree", "cut stump", "landscape", "all", "follow-up", "100", "10.0"],
            ],
        ),
        default_costing: None,
        costing: raw_table(
            &[
                "name",
                "initial_team_size",
                "initial_cost_per_day",
                "followup_team_size",
                "followup_cost_per_day",
                "vehicle_cost_per_day",
                "fuel_cost_per_hour",
                "maintenance_level",
            ],
            &[&["Standard", "10", "2000", "5", "1000", "0", "0", "1"]],
        ),
        priorities: raw_table(&["compt_id"], &[&["C1"]]),
    }
}

fn costing_mapping() -> HashMap<String, String> {
    [("1".to_string(), "Standard".to_string())]
        .into_iter()
        .collect()
}

fn setup(dir: &TempDir) -> (SimulationApi<ConfigManager>, Arc<PlanningRepository>) {
    let db_path = dir.path().join("mucp.db");
    let conn: Connection = initialize_database(db_path.to_str().unwrap()).unwrap();
    let conn = Arc::new(Mutex::new(conn));

    let config = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());
    let planning_repo = Arc::new(PlanningRepository::new(conn.clone()));
    let results_repo = Arc::new(ResultsRepository::new(conn));
    let api = SimulationApi::new(config, planning_repo.clone(), results_repo);
    (api, planning_repo)
}

#[tokio::test]
async fn test_validation_errors_block_simulation() {
    let dir = TempDir::new().unwrap();
    let (api, _) = setup(&dir);

    let mut tables = project_tables();
    // break the mapping table: drop the area column entirely
    tables.gis_mapping = raw_table(&["nbal_id", "miu_id", "compt_id"], &[&["N1", "M1", "C1"]]);

    let run = planning_run(BudgetPlan::new(10000.0, 0.0), 2);
    let result = api
        .run_simulation(&run, &tables, &[], &costing_mapping())
        .await;

    match result {
        Err(ApiError::SimulationBlocked { tables }) => {
            assert!(tables.contains(&"gis_mapping".to_string()));
        }
        other => panic!("expected SimulationBlocked, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_transient_run_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let (api, planning_repo) = setup(&dir);

    let mut run = planning_run(BudgetPlan::new(10000.0, 0.0), 2);
    run.save_results = false;

    let outcome = api
        .run_simulation(&run, &project_tables(), &[], &costing_mapping())
        .await
        .unwrap();

    match outcome {
        SimulationOutcome::Transient(summary) => {
            assert_eq!(summary.years, vec![2025, 2026]);
            assert_eq!(summary.per_scenario.len(), 5);
            let optimal = &summary.per_scenario[&Scenario::Optimal][&2025];
            assert!(optimal.cost > 0.0);
        }
        SimulationOutcome::Saved(_) => panic!("expected a transient outcome"),
    }

    assert!(planning_repo.find_by_id(&run.planning_id).unwrap().is_none());
}

#[tokio::test]
async fn test_saved_run_can_be_reloaded() {
    let dir = TempDir::new().unwrap();
    let (api, planning_repo) = setup(&dir);

    let mut run = planning_run(BudgetPlan::new(10000.0, 5.0), 3);
    run.save_results = true;

    let outcome = api
        .run_simulation(&run, &project_tables(), &[], &costing_mapping())
        .await
        .unwrap();
    let SimulationOutcome::Saved(output) = outcome else {
        panic!("expected a saved outcome");
    };

    assert!(planning_repo.find_by_id(&run.planning_id).unwrap().is_some());

    let reloaded = api.load_results(&run.planning_id).unwrap();
    assert_eq!(reloaded, output);
    assert_eq!(reloaded.escalated_budgets.len(), 3);
    assert_eq!(
        reloaded.rows(Scenario::Optimal, 2025).map(|r| r.len()),
        Some(1)
    );
}

#[tokio::test]
async fn test_rerun_replaces_saved_results() {
    let dir = TempDir::new().unwrap();
    let (api, _) = setup(&dir);

    let mut run = planning_run(BudgetPlan::new(10000.0, 0.0), 2);
    run.save_results = true;

    api.run_simulation(&run, &project_tables(), &[], &costing_mapping())
        .await
        .unwrap();
    api.run_simulation(&run, &project_tables(), &[], &costing_mapping())
        .await
        .unwrap();

    let reloaded = api.load_results(&run.planning_id).unwrap();
    // wholesale replacement: still exactly one row per scenario-year
    for scenario in Scenario::ALL {
        for year in [2025, 2026] {
            assert_eq!(reloaded.rows(scenario, year).map(|r| r.len()), Some(1));
        }
    }
}

#[tokio::test]
async fn test_load_results_unknown_run_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (api, _) = setup(&dir);

    let result = api.load_results("no-such-run");
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
