// ==========================================
// Engine integration tests
// ==========================================
// Full orchestrator pipeline over an in-memory project: spatial joins,
// scoring, unit building, and the five budget scenarios.

mod helpers;

use helpers::{costing_mapping, costing_model, norm_set, planning_run, species};
use mucp_planner::domain::compartment::{CompartmentUnit, GisMappingRow, MiuUnit, NbalUnit};
use mucp_planner::domain::planning::BudgetPlan;
use mucp_planner::domain::prioritization::{Category, CompartmentPriorityRow, NumericBand};
use mucp_planner::domain::species::LinkedSpeciesRow;
use mucp_planner::domain::types::{Scenario, Terrain};
use mucp_planner::engine::{AgeThresholds, NormalizedInputs, SimulationOrchestrator};
use std::collections::HashMap;

fn gis_row(compt_id: &str, miu_id: &str, nbal_id: &str, area: f64) -> GisMappingRow {
    GisMappingRow {
        nbal_id: nbal_id.to_string(),
        miu_id: miu_id.to_string(),
        compt_id: compt_id.to_string(),
        area,
    }
}

fn miu(miu_id: &str, riparian_fraction: f64) -> MiuUnit {
    MiuUnit {
        miu_id: miu_id.to_string(),
        area: 10.0,
        riparian_fraction,
    }
}

fn nbal(nbal_id: &str) -> NbalUnit {
    NbalUnit {
        nbal_id: nbal_id.to_string(),
        area: 10.0,
        stage: "initial".to_string(),
        contract_id: None,
        first_date: None,
        last_date: None,
    }
}

fn compartment(compt_id: &str, area_ha: f64) -> CompartmentUnit {
    CompartmentUnit {
        compt_id: compt_id.to_string(),
        area_ha,
        slope: 5.0,
        walk_time: 0.5,
        drive_time: 1.0,
        costing: "1".to_string(),
        grow_con: "natural".to_string(),
        terrain: None,
    }
}

fn link(unit_id: &str, name: &str, idenscode: i32, age: f64) -> LinkedSpeciesRow {
    LinkedSpeciesRow {
        unit_id: unit_id.to_string(),
        species: name.to_string(),
        idenscode,
        age,
    }
}

/// Two landscape compartments carrying the same adult wattle stand;
/// C1 is twice the area of C2.
fn two_compartment_inputs() -> NormalizedInputs {
    NormalizedInputs {
        gis_mapping: vec![
            gis_row("C1", "M1", "N1", 10.0),
            gis_row("C2", "M2", "N2", 5.0),
        ],
        mius: vec![miu("M1", 0.1), miu("M2", 0.1)],
        nbals: vec![nbal("N1"), nbal("N2")],
        compartments: vec![compartment("C1", 10.0), compartment("C2", 5.0)],
        miu_species: vec![
            link("M1", "Acacia mearnsii", 4, 8.0),
            link("M2", "Acacia mearnsii", 4, 8.0),
        ],
        nbal_species: vec![],
        species: vec![species("Acacia mearnsii")],
        norm_set: norm_set(),
        costing_models: vec![costing_model()],
        costing_mapping: costing_mapping(),
        categories: vec![],
        priority_rows: vec![],
    }
}

#[test]
fn test_optimal_clears_everything_first_year() {
    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(0.0, 0.0), 3);
    let result = orchestrator.run(&run, &two_compartment_inputs(), AgeThresholds::default());

    let rows = result.output.rows(Scenario::Optimal, 2025).unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert!(row.cleared_fully);
        // idenscode 4 -> 50 percent, initial reduction 75 percent
        assert_eq!(row.density, 12.5);
    }
    // planned reduction 37.5 percent of density
    // C1: 10 ha * 37.5 / 5 ppd = 75 pd -> 7.5 team-days * 2000 = 15000
    // C2: 5 ha * 37.5 / 5 ppd = 37.5 pd -> 3.75 team-days * 2000 = 7500
    assert_eq!(result.output.total_cost(Scenario::Optimal, 2025), 22500.0);
}

#[test]
fn test_zero_budget_leaves_all_untouched() {
    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(0.0, 0.0), 3);
    let result = orchestrator.run(&run, &two_compartment_inputs(), AgeThresholds::default());

    for year in [2025, 2026, 2027] {
        for row in result.output.rows(Scenario::Plan1, year).unwrap() {
            assert!(!row.cleared_now);
            assert_eq!(row.person_days, 0.0);
            assert_eq!(row.density, 50.0);
        }
        assert_eq!(result.output.total_cost(Scenario::Plan1, year), 0.0);
    }
}

#[test]
fn test_partial_budget_funds_by_priority_order() {
    let mut inputs = two_compartment_inputs();
    inputs.categories = vec![Category::numeric(
        "slope",
        1.0,
        vec![
            NumericBand {
                range_low: 0.0,
                range_high: 10.0,
                priority: 1,
            },
            NumericBand {
                range_low: 10.5,
                range_high: 90.0,
                priority: 5,
            },
        ],
    )];
    inputs.priority_rows = vec![
        CompartmentPriorityRow {
            compt_id: "C1".to_string(),
            values: [("slope".to_string(), "5".to_string())].into_iter().collect(),
        },
        CompartmentPriorityRow {
            compt_id: "C2".to_string(),
            values: [("slope".to_string(), "45".to_string())].into_iter().collect(),
        },
    ];

    // Enough for C2's full 7500 and nothing more.
    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(7500.0, 0.0), 1);
    let result = orchestrator.run(&run, &inputs, AgeThresholds::default());

    let rows = result.output.rows(Scenario::Plan1, 2025).unwrap();
    let by_id: HashMap<&str, _> = rows.iter().map(|r| (r.compt_id.as_str(), r)).collect();

    // C2 is steeper, so it outranks C1 and takes the full budget.
    assert!(by_id["C2"].cleared_fully);
    assert_eq!(by_id["C2"].cost, Some(7500.0));
    assert!(!by_id["C1"].cleared_now);
    assert_eq!(by_id["C1"].density, 50.0);
}

#[test]
fn test_partial_funding_clears_proportionally() {
    let orchestrator = SimulationOrchestrator::new();
    // Optimal year-1 outlay is 22500: C1 needs 15000, C2 needs 7500.
    let run = planning_run(BudgetPlan::new(20000.0, 0.0), 1);
    let result = orchestrator.run(&run, &two_compartment_inputs(), AgeThresholds::default());

    let rows = result.output.rows(Scenario::Plan1, 2025).unwrap();
    let by_id: HashMap<&str, _> = rows.iter().map(|r| (r.compt_id.as_str(), r)).collect();

    // Units tie on priority (both None) so the id tiebreak runs C1 first.
    assert!(by_id["C1"].cleared_fully);
    // C2 gets the remaining 5000 of its 7500 need: two thirds of the
    // planned 37.5 reduction, density 50 - 25.
    assert!(by_id["C2"].cleared_now);
    assert!(!by_id["C2"].cleared_fully);
    assert_eq!(by_id["C2"].cost, Some(5000.0));
    assert_eq!(by_id["C2"].density, 25.0);
}

#[test]
fn test_no_state_regression_across_years() {
    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(100000.0, 0.0), 4);
    let result = orchestrator.run(&run, &two_compartment_inputs(), AgeThresholds::default());

    for scenario in Scenario::ALL {
        let years = &result.output.scenario_years[&scenario];
        let mut prev: HashMap<String, f64> = HashMap::new();
        for rows in years.values() {
            for row in rows {
                if let Some(prev_density) = prev.get(&row.compt_id) {
                    assert!(
                        row.density <= *prev_density + 1e-9,
                        "density rose for {} under {:?}",
                        row.compt_id,
                        scenario
                    );
                }
                prev.insert(row.compt_id.clone(), row.density);
            }
        }
    }
}

#[test]
fn test_optimal_cumulative_cost_dominates_capped_plans() {
    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(8000.0, 5.0), 5);
    let result = orchestrator.run(&run, &two_compartment_inputs(), AgeThresholds::default());

    let cumulative = |scenario| {
        run.year_range()
            .map(|y| result.output.total_cost(scenario, y))
            .sum::<f64>()
    };
    let optimal = cumulative(Scenario::Optimal);
    for scenario in [Scenario::Plan1, Scenario::Plan2, Scenario::Plan3, Scenario::Plan4] {
        assert!(optimal >= cumulative(scenario) - 1e-9);
    }
}

#[test]
fn test_escalated_budgets_compound_to_two_decimals() {
    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(1000.0, 7.5), 3);
    let result = orchestrator.run(&run, &two_compartment_inputs(), AgeThresholds::default());

    assert_eq!(result.output.escalated_budgets[&2025].plan_1, 1000.0);
    assert_eq!(result.output.escalated_budgets[&2026].plan_1, 1075.0);
    // 1000 * 1.075^2 = 1155.625 -> 1155.63
    assert_eq!(result.output.escalated_budgets[&2027].plan_1, 1155.63);
}

#[test]
fn test_follow_up_years_work_residual_density() {
    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(0.0, 0.0), 2);
    let result = orchestrator.run(&run, &two_compartment_inputs(), AgeThresholds::default());

    // Year 2 under optimal: residual 12.5 density, follow-up reduction
    // 90 percent plans an 11.25 removal at ppd 10.
    let rows = result.output.rows(Scenario::Optimal, 2026).unwrap();
    let c1 = rows.iter().find(|r| r.compt_id == "C1").unwrap();
    assert!(c1.cleared_now);
    // 10 ha * 11.25 / 10 ppd = 11.25 pd -> 2.25 team-days * 1000 = 2250
    assert_eq!(c1.person_days, 11.25);
    assert_eq!(c1.cost, Some(2250.0));
    assert_eq!(c1.density, 1.25);
}

#[test]
fn test_riparian_miu_uses_riparian_norms() {
    let mut inputs = two_compartment_inputs();
    inputs.mius[0].riparian_fraction = 0.8;

    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(0.0, 0.0), 1);
    let result = orchestrator.run(&run, &inputs, AgeThresholds::default());

    let rows = result.output.rows(Scenario::Optimal, 2025).unwrap();
    let c1 = rows.iter().find(|r| r.compt_id == "C1").unwrap();
    // riparian ppd 2.5: 10 ha * 37.5 / 2.5 = 150 pd (landscape would be 75)
    assert_eq!(c1.person_days, 150.0);
}

#[test]
fn test_missing_norm_is_row_gap_not_batch_abort() {
    let mut inputs = two_compartment_inputs();
    inputs.compartments[0].terrain = Some(Terrain::Riparian);
    inputs
        .norm_set
        .norms
        .retain(|n| n.key.terrain == Terrain::Landscape);

    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(0.0, 0.0), 1);
    let result = orchestrator.run(&run, &inputs, AgeThresholds::default());

    let rows = result.output.rows(Scenario::Optimal, 2025).unwrap();
    let by_id: HashMap<&str, _> = rows.iter().map(|r| (r.compt_id.as_str(), r)).collect();
    // C1 has no riparian norm: zero row, still present in the table.
    assert!(!by_id["C1"].cleared_now);
    assert_eq!(by_id["C1"].person_days, 0.0);
    // C2 proceeds unaffected.
    assert!(by_id["C2"].cleared_fully);
}

#[test]
fn test_unmapped_costing_tag_optimal_proceeds_plans_skip() {
    let mut inputs = two_compartment_inputs();
    inputs.compartments[0].costing = "99".to_string();

    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(100000.0, 0.0), 1);
    let result = orchestrator.run(&run, &inputs, AgeThresholds::default());

    let optimal = result.output.rows(Scenario::Optimal, 2025).unwrap();
    let c1_optimal = optimal.iter().find(|r| r.compt_id == "C1").unwrap();
    assert!(c1_optimal.cleared_fully);
    assert_eq!(c1_optimal.cost, None);

    let plan = result.output.rows(Scenario::Plan1, 2025).unwrap();
    let by_id: HashMap<&str, _> = plan.iter().map(|r| (r.compt_id.as_str(), r)).collect();
    // Without a priceable cost the capped plan cannot fund C1.
    assert!(!by_id["C1"].cleared_now);
    assert!(by_id["C2"].cleared_fully);
}

#[test]
fn test_missing_spatial_parent_skips_mapping_row() {
    let mut inputs = two_compartment_inputs();
    inputs.nbals.retain(|n| n.nbal_id != "N2");

    let orchestrator = SimulationOrchestrator::new();
    let run = planning_run(BudgetPlan::new(0.0, 0.0), 1);
    let result = orchestrator.run(&run, &inputs, AgeThresholds::default());

    assert_eq!(result.output.rows(Scenario::Optimal, 2025).unwrap().len(), 1);
    assert_eq!(result.skipped_units.len(), 1);
    assert_eq!(result.skipped_units[0].0, "C2");
}
