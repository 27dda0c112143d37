// ==========================================
// MUCP Planner - planning run repository
// ==========================================
// CRUD over the planning table. A run with saved simulation results
// is immutable: updates and budget edits are refused until the results
// are deleted (the delete cascades to the derived tables).
// ==========================================

use crate::domain::planning::{BudgetPlan, PlanningRun};
use crate::domain::types::Currency;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// PlanningRepository
// ==========================================
pub struct PlanningRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanningRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(&self, row: &Row) -> rusqlite::Result<PlanningRun> {
        let currency_raw: String = row.get("currency")?;
        let created_raw: String = row.get("created_at")?;
        Ok(PlanningRun {
            planning_id: row.get("planning_id")?,
            user: row.get("user")?,
            project_name: row.get("project_name")?,
            clearing_norm_set: row.get("clearing_norm_set")?,
            plans: [
                BudgetPlan::new(row.get("budget_1")?, row.get("escalation_1")?),
                BudgetPlan::new(row.get("budget_2")?, row.get("escalation_2")?),
                BudgetPlan::new(row.get("budget_3")?, row.get("escalation_3")?),
                BudgetPlan::new(row.get("budget_4")?, row.get("escalation_4")?),
            ],
            working_day_hours: row.get("working_day_hours")?,
            working_year_days: row.get("working_year_days")?,
            start_year: row.get("start_year")?,
            years_to_run: row.get("years_to_run")?,
            currency: currency_raw.parse::<Currency>().unwrap_or_default(),
            save_results: row.get::<_, i64>("save_results")? != 0,
            created_at: created_raw
                .parse::<DateTime<Utc>>()
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    pub fn create(&self, run: &PlanningRun) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO planning (
                planning_id, user, project_name, clearing_norm_set,
                budget_1, escalation_1, budget_2, escalation_2,
                budget_3, escalation_3, budget_4, escalation_4,
                working_day_hours, working_year_days,
                start_year, years_to_run, currency, save_results, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &run.planning_id,
                &run.user,
                &run.project_name,
                &run.clearing_norm_set,
                run.plans[0].amount,
                run.plans[0].escalation_percent,
                run.plans[1].amount,
                run.plans[1].escalation_percent,
                run.plans[2].amount,
                run.plans[2].escalation_percent,
                run.plans[3].amount,
                run.plans[3].escalation_percent,
                run.working_day_hours,
                run.working_year_days,
                run.start_year,
                run.years_to_run,
                run.currency.to_string(),
                run.save_results as i64,
                run.created_at.to_rfc3339(),
            ],
        )?;

        Ok(run.planning_id.clone())
    }

    pub fn find_by_id(&self, planning_id: &str) -> RepositoryResult<Option<PlanningRun>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT * FROM planning WHERE planning_id = ?",
            params![planning_id],
            |row| self.map_row(row),
        ) {
            Ok(run) => Ok(Some(run)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Runs owned by one user, newest first.
    pub fn list_for_user(&self, user: &str) -> RepositoryResult<Vec<PlanningRun>> {
        let conn = self.get_conn()?;

        let mut stmt = conn
            .prepare("SELECT * FROM planning WHERE user = ? ORDER BY created_at DESC")?;
        let runs = stmt
            .query_map(params![user], |row| self.map_row(row))?
            .collect::<Result<Vec<PlanningRun>, _>>()?;
        Ok(runs)
    }

    /// True when saved simulation rows exist for the run.
    pub fn has_results(&self, planning_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM simulation_row WHERE planning_id = ?",
            params![planning_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Updates a run's parameters. Refused while saved results exist.
    pub fn update(&self, run: &PlanningRun) -> RepositoryResult<()> {
        if self.has_results(&run.planning_id)? {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "planning run {} has saved results and cannot be modified",
                run.planning_id
            )));
        }

        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"UPDATE planning SET
                project_name = ?, clearing_norm_set = ?,
                budget_1 = ?, escalation_1 = ?, budget_2 = ?, escalation_2 = ?,
                budget_3 = ?, escalation_3 = ?, budget_4 = ?, escalation_4 = ?,
                working_day_hours = ?, working_year_days = ?,
                start_year = ?, years_to_run = ?, currency = ?, save_results = ?
            WHERE planning_id = ?"#,
            params![
                &run.project_name,
                &run.clearing_norm_set,
                run.plans[0].amount,
                run.plans[0].escalation_percent,
                run.plans[1].amount,
                run.plans[1].escalation_percent,
                run.plans[2].amount,
                run.plans[2].escalation_percent,
                run.plans[3].amount,
                run.plans[3].escalation_percent,
                run.working_day_hours,
                run.working_year_days,
                run.start_year,
                run.years_to_run,
                run.currency.to_string(),
                run.save_results as i64,
                &run.planning_id,
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "planning".to_string(),
                id: run.planning_id.clone(),
            });
        }
        Ok(())
    }

    /// Deletes a run; the derived tables cascade.
    pub fn delete(&self, planning_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let deleted = conn.execute(
            "DELETE FROM planning WHERE planning_id = ?",
            params![planning_id],
        )?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "planning".to_string(),
                id: planning_id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize_database;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn repo() -> (TempDir, PlanningRepository) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let conn = initialize_database(path.to_str().unwrap()).unwrap();
        (dir, PlanningRepository::new(Arc::new(Mutex::new(conn))))
    }

    fn sample_run() -> PlanningRun {
        PlanningRun {
            planning_id: Uuid::new_v4().to_string(),
            user: "tester".to_string(),
            project_name: "demo".to_string(),
            clearing_norm_set: "default".to_string(),
            plans: [
                BudgetPlan::new(1000.0, 5.0),
                BudgetPlan::new(2000.0, 5.0),
                BudgetPlan::new(3000.0, 5.0),
                BudgetPlan::new(4000.0, 5.0),
            ],
            working_day_hours: 8.0,
            working_year_days: 220,
            start_year: 2025,
            years_to_run: 3,
            currency: Currency::ZAR,
            save_results: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_find_round_trip() {
        let (_dir, repo) = repo();
        let run = sample_run();
        repo.create(&run).unwrap();

        let found = repo.find_by_id(&run.planning_id).unwrap().unwrap();
        assert_eq!(found.project_name, "demo");
        assert_eq!(found.plans[1].amount, 2000.0);
        assert_eq!(found.currency, Currency::ZAR);
        assert!(found.save_results);
    }

    #[test]
    fn test_find_missing_is_none() {
        let (_dir, repo) = repo();
        assert!(repo.find_by_id("nope").unwrap().is_none());
    }

    #[test]
    fn test_list_for_user_orders_newest_first() {
        let (_dir, repo) = repo();
        let mut first = sample_run();
        first.created_at = Utc::now() - chrono::Duration::hours(1);
        let second = sample_run();
        repo.create(&first).unwrap();
        repo.create(&second).unwrap();

        let runs = repo.list_for_user("tester").unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].planning_id, second.planning_id);
    }

    #[test]
    fn test_update_without_results() {
        let (_dir, repo) = repo();
        let mut run = sample_run();
        repo.create(&run).unwrap();

        run.project_name = "renamed".to_string();
        repo.update(&run).unwrap();
        let found = repo.find_by_id(&run.planning_id).unwrap().unwrap();
        assert_eq!(found.project_name, "renamed");
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (_dir, repo) = repo();
        let err = repo.delete("nope").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
