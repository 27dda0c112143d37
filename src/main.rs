// ==========================================
// MUCP Planner - command line entry point
// ==========================================
// Headless runner: load a project directory of input tables plus a
// run.json, validate everything, simulate the 5 scenarios and either
// persist the results or print the per-year totals.
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use mucp_planner::api::{ProjectTables, SimulationApi, SimulationOutcome};
use mucp_planner::config::ConfigManager;
use mucp_planner::db;
use mucp_planner::domain::planning::{BudgetPlan, PlanningRun};
use mucp_planner::domain::prioritization::Category;
use mucp_planner::domain::types::{Currency, Scenario};
use mucp_planner::importer::{RawTable, UniversalFileParser};
use mucp_planner::logging;
use mucp_planner::repository::{PlanningRepository, ResultsRepository};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ==========================================
// RunSpec - run.json contents
// ==========================================
#[derive(Debug, Deserialize)]
struct RunSpec {
    project_name: String,
    #[serde(default = "default_norm_set")]
    clearing_norm_set: String,
    user: String,
    /// Exactly 4 plans: [amount, escalation_percent] pairs.
    plans: Vec<PlanSpec>,
    #[serde(default = "default_working_day_hours")]
    working_day_hours: f64,
    #[serde(default = "default_working_year_days")]
    working_year_days: u32,
    start_year: i32,
    years_to_run: u32,
    #[serde(default)]
    currency: Currency,
    #[serde(default)]
    save_results: bool,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    costing_mapping: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PlanSpec {
    amount: f64,
    escalation_percent: f64,
}

fn default_norm_set() -> String {
    "default".to_string()
}

fn default_working_day_hours() -> f64 {
    8.0
}

fn default_working_year_days() -> u32 {
    220
}

impl RunSpec {
    fn into_run(self) -> Result<(PlanningRun, Vec<Category>, HashMap<String, String>)> {
        if self.plans.len() != 4 {
            bail!("run.json must define exactly 4 budget plans, got {}", self.plans.len());
        }
        let plans = [
            BudgetPlan::new(self.plans[0].amount, self.plans[0].escalation_percent),
            BudgetPlan::new(self.plans[1].amount, self.plans[1].escalation_percent),
            BudgetPlan::new(self.plans[2].amount, self.plans[2].escalation_percent),
            BudgetPlan::new(self.plans[3].amount, self.plans[3].escalation_percent),
        ];
        let run = PlanningRun {
            planning_id: uuid::Uuid::new_v4().to_string(),
            user: self.user,
            project_name: self.project_name,
            clearing_norm_set: self.clearing_norm_set,
            plans,
            working_day_hours: self.working_day_hours,
            working_year_days: self.working_year_days,
            start_year: self.start_year,
            years_to_run: self.years_to_run,
            currency: self.currency,
            save_results: self.save_results,
            created_at: chrono::Utc::now(),
        };
        Ok((run, self.categories, self.costing_mapping))
    }
}

/// Loads a table by base name, trying .csv then .xlsx.
fn load_table(parser: &UniversalFileParser, dir: &Path, base: &str) -> Result<RawTable> {
    load_optional_table(parser, dir, base)?
        .ok_or_else(|| anyhow!("missing input table: {}/{}.csv (or .xlsx)", dir.display(), base))
}

fn load_optional_table(
    parser: &UniversalFileParser,
    dir: &Path,
    base: &str,
) -> Result<Option<RawTable>> {
    for ext in ["csv", "xlsx"] {
        let path = dir.join(format!("{}.{}", base, ext));
        if path.exists() {
            let table = parser
                .parse(&path)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            return Ok(Some(table));
        }
    }
    Ok(None)
}

fn load_project_tables(dir: &Path) -> Result<ProjectTables> {
    let parser = UniversalFileParser;
    Ok(ProjectTables {
        gis_mapping: load_table(&parser, dir, "gis_mapping")?,
        miu: load_table(&parser, dir, "miu")?,
        nbal: load_table(&parser, dir, "nbal")?,
        compartment: load_table(&parser, dir, "compartment")?,
        miu_species: load_table(&parser, dir, "miu_species")?,
        nbal_species: load_table(&parser, dir, "nbal_species")?,
        growth_forms: load_table(&parser, dir, "growth_forms")?,
        treatment_methods: load_table(&parser, dir, "treatment_methods")?,
        default_species: load_optional_table(&parser, dir, "default_species")?,
        species: load_table(&parser, dir, "species")?,
        default_norms: load_optional_table(&parser, dir, "default_norms")?,
        norms: load_table(&parser, dir, "norms")?,
        default_costing: load_optional_table(&parser, dir, "default_costing")?,
        costing: load_table(&parser, dir, "costing")?,
        priorities: load_table(&parser, dir, "priorities")?,
    })
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("MUCP_DB") {
        return PathBuf::from(path);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mucp-planner")
        .join("mucp.db")
}

fn print_summary(summary: &mucp_planner::domain::simulation::SimulationSummary) {
    for (scenario, years) in &summary.per_scenario {
        println!("scenario: {}", scenario);
        for (year, totals) in years {
            println!(
                "  {}  cost={:.2}  person_days={:.2}  flow={:.2}  mean_density={:.2}",
                year, totals.cost, totals.person_days, totals.flow, totals.mean_density
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("MUCP Planner - clearing plan simulation");
    tracing::info!("version: {}", mucp_planner::VERSION);
    tracing::info!("==================================================");

    let project_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: mucp-planner <project-dir>")?;
    if !project_dir.is_dir() {
        bail!("not a directory: {}", project_dir.display());
    }

    let db_path = default_db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path_str = db_path
        .to_str()
        .context("database path is not valid UTF-8")?;
    tracing::info!("using database: {}", db_path_str);

    let conn = Arc::new(Mutex::new(
        db::initialize_database(db_path_str).context("failed to initialize database")?,
    ));

    let spec_path = project_dir.join("run.json");
    let spec_raw = std::fs::read_to_string(&spec_path)
        .with_context(|| format!("failed to read {}", spec_path.display()))?;
    let spec: RunSpec =
        serde_json::from_str(&spec_raw).context("failed to parse run.json")?;
    let (run, categories, costing_mapping) = spec.into_run()?;

    let tables = load_project_tables(&project_dir)?;

    let config = Arc::new(
        ConfigManager::from_connection(conn.clone())
            .map_err(|e| anyhow!("failed to build config manager: {}", e))?,
    );
    let api = SimulationApi::new(
        config,
        Arc::new(PlanningRepository::new(conn.clone())),
        Arc::new(ResultsRepository::new(conn)),
    );

    match api
        .run_simulation(&run, &tables, &categories, &costing_mapping)
        .await
    {
        Ok(SimulationOutcome::Saved(output)) => {
            tracing::info!(planning_id = %run.planning_id, "results saved");
            for scenario in Scenario::ALL {
                for year in run.year_range() {
                    tracing::info!(
                        scenario = %scenario,
                        year,
                        total_cost = output.total_cost(scenario, year),
                        "year total"
                    );
                }
            }
            println!("saved planning run: {}", run.planning_id);
        }
        Ok(SimulationOutcome::Transient(summary)) => {
            print_summary(&summary);
        }
        Err(err) => {
            // re-run validation to show the per-table problems
            if let mucp_planner::api::ApiError::SimulationBlocked { .. } = err {
                for report in api.validate_inputs(&run, &tables, &categories) {
                    for message in &report.errors {
                        eprintln!("[{}] error: {}", report.table, message);
                    }
                    for message in &report.warnings {
                        eprintln!("[{}] warning: {}", report.table, message);
                    }
                }
            }
            return Err(err.into());
        }
    }

    Ok(())
}
