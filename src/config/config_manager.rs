// ==========================================
// MUCP Planner - configuration manager
// ==========================================
// Load, query and overwrite system configuration.
// Storage: config_kv table (key-value, scope_id='global')
// ==========================================

use crate::config::planning_config_trait::PlanningConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// config_keys - well-known configuration keys
// ==========================================
pub mod config_keys {
    pub const SEEDLING_MAX_AGE: &str = "seedling_max_age_years";
    pub const YOUNG_MAX_AGE: &str = "young_max_age_years";
    pub const DEFAULT_WORKING_DAY_HOURS: &str = "default_working_day_hours";
    pub const DEFAULT_WORKING_YEAR_DAYS: &str = "default_working_year_days";
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Wraps an existing connection; re-applies the unified PRAGMA set
    /// (idempotent) so behavior matches a fresh open.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("failed to acquire connection lock: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// Reads one global-scope value from config_kv.
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("failed to acquire connection lock: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Writes one global-scope value, replacing an existing one.
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("failed to acquire connection lock: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// Snapshot of every global-scope entry as a JSON object, recorded
    /// alongside saved simulation results for reproducibility.
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("failed to acquire connection lock: {}", e))?;

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// PlanningConfigReader implementation
// ==========================================
#[async_trait(?Send)]
impl PlanningConfigReader for ConfigManager {
    async fn get_seedling_max_age(&self) -> Result<f64, Box<dyn Error>> {
        let raw = self.get_config_or_default(config_keys::SEEDLING_MAX_AGE, "2.0")?;
        Ok(raw.parse::<f64>()?)
    }

    async fn get_young_max_age(&self) -> Result<f64, Box<dyn Error>> {
        let raw = self.get_config_or_default(config_keys::YOUNG_MAX_AGE, "5.0")?;
        Ok(raw.parse::<f64>()?)
    }

    async fn get_default_working_day_hours(&self) -> Result<f64, Box<dyn Error>> {
        let raw = self.get_config_or_default(config_keys::DEFAULT_WORKING_DAY_HOURS, "8.0")?;
        Ok(raw.parse::<f64>()?)
    }

    async fn get_default_working_year_days(&self) -> Result<u32, Box<dyn Error>> {
        let raw = self.get_config_or_default(config_keys::DEFAULT_WORKING_YEAR_DAYS, "220")?;
        Ok(raw.parse::<u32>()?)
    }
}
