// ==========================================
// MUCP Planner - simulation results repository
// ==========================================
// Derived data only. A save replaces everything for the planning run
// inside one transaction, so re-running a simulation is idempotent:
// the tables always hold exactly one result set per run.
// ==========================================

use crate::domain::simulation::{SimulationOutput, SimulationRow, YearlyBudgets};
use crate::domain::types::Scenario;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// ResultsRepository
// ==========================================
pub struct ResultsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ResultsRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Replaces all saved results for a planning run in one
    /// transaction: yearly budgets plus every scenario row table.
    pub fn replace_results(
        &self,
        planning_id: &str,
        output: &SimulationOutput,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "DELETE FROM simulation_budget_year WHERE planning_id = ?",
            params![planning_id],
        )?;
        tx.execute(
            "DELETE FROM simulation_row WHERE planning_id = ?",
            params![planning_id],
        )?;

        {
            let mut budget_stmt = tx.prepare(
                r#"INSERT INTO simulation_budget_year
                   (planning_id, year, plan_1, plan_2, plan_3, plan_4)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )?;
            for (year, budgets) in &output.escalated_budgets {
                budget_stmt.execute(params![
                    planning_id,
                    year,
                    budgets.plan_1,
                    budgets.plan_2,
                    budgets.plan_3,
                    budgets.plan_4,
                ])?;
            }

            let mut row_stmt = tx.prepare(
                r#"INSERT INTO simulation_row (
                    planning_id, scenario, year, compt_id, miu_id, nbal_id,
                    priority, person_days, cost, density, flow,
                    cleared_now, cleared_fully
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )?;
            for (scenario, year_tables) in &output.scenario_years {
                for (year, rows) in year_tables {
                    for row in rows {
                        row_stmt.execute(params![
                            planning_id,
                            scenario.storage_name(),
                            year,
                            &row.compt_id,
                            &row.miu_id,
                            &row.nbal_id,
                            row.priority,
                            row.person_days,
                            row.cost,
                            row.density,
                            row.flow,
                            row.cleared_now as i64,
                            row.cleared_fully as i64,
                        ])?;
                    }
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(planning_id = %planning_id, "simulation results replaced");
        Ok(())
    }

    /// Deletes all saved results for a run without touching the run
    /// itself.
    pub fn delete_results(&self, planning_id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        tx.execute(
            "DELETE FROM simulation_budget_year WHERE planning_id = ?",
            params![planning_id],
        )?;
        tx.execute(
            "DELETE FROM simulation_row WHERE planning_id = ?",
            params![planning_id],
        )?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    pub fn read_budgets(&self, planning_id: &str) -> RepositoryResult<BTreeMap<i32, YearlyBudgets>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT year, plan_1, plan_2, plan_3, plan_4
               FROM simulation_budget_year
               WHERE planning_id = ?
               ORDER BY year"#,
        )?;
        let mut budgets = BTreeMap::new();
        let rows = stmt.query_map(params![planning_id], |row| {
            Ok((
                row.get::<_, i32>(0)?,
                YearlyBudgets {
                    plan_1: row.get(1)?,
                    plan_2: row.get(2)?,
                    plan_3: row.get(3)?,
                    plan_4: row.get(4)?,
                },
            ))
        })?;
        for entry in rows {
            let (year, yearly) = entry?;
            budgets.insert(year, yearly);
        }
        Ok(budgets)
    }

    fn map_row(row: &Row) -> rusqlite::Result<SimulationRow> {
        Ok(SimulationRow {
            compt_id: row.get("compt_id")?,
            miu_id: row.get("miu_id")?,
            nbal_id: row.get("nbal_id")?,
            priority: row.get("priority")?,
            person_days: row.get("person_days")?,
            cost: row.get("cost")?,
            density: row.get("density")?,
            flow: row.get("flow")?,
            cleared_now: row.get::<_, i64>("cleared_now")? != 0,
            cleared_fully: row.get::<_, i64>("cleared_fully")? != 0,
        })
    }

    pub fn read_rows(
        &self,
        planning_id: &str,
        scenario: Scenario,
        year: i32,
    ) -> RepositoryResult<Vec<SimulationRow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT compt_id, miu_id, nbal_id, priority, person_days,
                      cost, density, flow, cleared_now, cleared_fully
               FROM simulation_row
               WHERE planning_id = ? AND scenario = ? AND year = ?
               ORDER BY compt_id"#,
        )?;
        let rows = stmt
            .query_map(params![planning_id, scenario.storage_name(), year], |row| {
                Self::map_row(row)
            })?
            .collect::<Result<Vec<SimulationRow>, _>>()?;
        Ok(rows)
    }

    /// Reassembles the full saved output for a run.
    pub fn read_output(&self, planning_id: &str) -> RepositoryResult<SimulationOutput> {
        let escalated_budgets = self.read_budgets(planning_id)?;

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT scenario, year, compt_id, miu_id, nbal_id, priority,
                      person_days, cost, density, flow, cleared_now, cleared_fully
               FROM simulation_row
               WHERE planning_id = ?
               ORDER BY scenario, year, compt_id"#,
        )?;

        let mut scenario_years: BTreeMap<Scenario, BTreeMap<i32, Vec<SimulationRow>>> =
            BTreeMap::new();
        let rows = stmt.query_map(params![planning_id], |row| {
            Ok((
                row.get::<_, String>("scenario")?,
                row.get::<_, i32>("year")?,
                Self::map_row(row)?,
            ))
        })?;
        for entry in rows {
            let (scenario_name, year, sim_row) = entry?;
            let Some(scenario) = Scenario::from_storage_name(&scenario_name) else {
                return Err(RepositoryError::FieldValueError {
                    field: "scenario".to_string(),
                    message: format!("unknown scenario: {}", scenario_name),
                });
            };
            scenario_years
                .entry(scenario)
                .or_default()
                .entry(year)
                .or_default()
                .push(sim_row);
        }

        Ok(SimulationOutput {
            scenario_years,
            escalated_budgets,
        })
    }
}
