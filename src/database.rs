use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

use crate::error::StorageError;
use crate::history::{LogStatus, LoggedBlock, SessionLog};
use crate::models::{PlanDocument, WeekPlan};

/// Raw row of `workout_logs` before the details JSON is decoded
type LogRow = (String, NaiveDate, String, String);

/// SQLite store for week plans and workout logs
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create or open a database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        let mut db = Self { conn };
        db.init_schema()?;

        debug!(path = %db_path.as_ref().display(), "opened database");
        Ok(db)
    }

    /// Throwaway database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let mut db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&mut self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS week_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                week_start_date DATE,
                plan TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (user_id, week_start_date)
            );

            CREATE TABLE IF NOT EXISTS workout_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                workout_date DATE NOT NULL,
                status TEXT NOT NULL,
                details TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (user_id, workout_date)
            );

            CREATE INDEX IF NOT EXISTS idx_workout_logs_user_status_date
                ON workout_logs(user_id, status, workout_date);
            "#,
        )?;
        Ok(())
    }

    /// Insert a log, replacing any existing one for the same user and date
    pub fn upsert_log(&mut self, user_id: &str, log: &SessionLog) -> Result<(), StorageError> {
        let details = serde_json::to_string(&log.details)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn.execute(
            r#"
            INSERT INTO workout_logs (user_id, workout_date, status, details)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, workout_date) DO UPDATE SET
                status = excluded.status,
                details = excluded.details,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![user_id, log.workout_date, log.status.as_str(), details],
        )?;

        debug!(user_id, date = %log.workout_date, blocks = log.details.len(), "stored workout log");
        Ok(())
    }

    pub fn load_log(&self, user_id: &str, workout_date: NaiveDate) -> Result<Option<SessionLog>, StorageError> {
        let row: Option<LogRow> = self
            .conn
            .query_row(
                r#"
                SELECT user_id, workout_date, status, details
                FROM workout_logs
                WHERE user_id = ?1 AND workout_date = ?2
                "#,
                params![user_id, workout_date],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        row.map(log_from_row).transpose()
    }

    /// Completed logs, newest first
    pub fn recent_completed_logs(&self, user_id: &str, limit: usize) -> Result<Vec<SessionLog>, StorageError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, workout_date, status, details
            FROM workout_logs
            WHERE user_id = ?1 AND status = ?2
            ORDER BY workout_date DESC
            LIMIT ?3
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![user_id, LogStatus::Completed.as_str(), limit as i64],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?
            .collect::<rusqlite::Result<Vec<LogRow>>>()?;

        rows.into_iter().map(log_from_row).collect()
    }

    /// Store a week plan, replacing the plan for the same user and week
    pub fn store_week_plan(&mut self, plan: &WeekPlan) -> Result<(), StorageError> {
        let document = serde_json::to_string(&plan.plan)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        // NULL start dates never collide under UNIQUE, so those are plain inserts
        self.conn.execute(
            r#"
            INSERT INTO week_plans (user_id, week_start_date, plan)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, week_start_date) DO UPDATE SET plan = excluded.plan
            "#,
            params![plan.user_id, plan.week_start_date, document],
        )?;

        debug!(user_id = %plan.user_id, week = ?plan.week_start_date, "stored week plan");
        Ok(())
    }

    /// All plans of a user, newest week first; undated plans sort last
    pub fn week_plans(&self, user_id: &str) -> Result<Vec<WeekPlan>, StorageError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, week_start_date, plan
            FROM week_plans
            WHERE user_id = ?1
            ORDER BY week_start_date IS NULL, week_start_date DESC, id DESC
            "#,
        )?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<NaiveDate>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(user_id, week_start_date, plan)| -> Result<WeekPlan, StorageError> {
                let value: serde_json::Value = serde_json::from_str(&plan)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                let plan = PlanDocument::from_value(value)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(WeekPlan {
                    user_id,
                    week_start_date,
                    plan,
                })
            })
            .collect()
    }

    /// Row counts of both tables for a user
    pub fn counts(&self, user_id: &str) -> Result<(usize, usize), StorageError> {
        let plans: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM week_plans WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        let logs: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM workout_logs WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok((plans as usize, logs as usize))
    }
}

fn log_from_row((user_id, workout_date, status, details): LogRow) -> Result<SessionLog, StorageError> {
    let status: LogStatus = serde_json::from_value(serde_json::Value::String(status))
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let details: Vec<LoggedBlock> = serde_json::from_str(&details)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    Ok(SessionLog {
        user_id: Some(user_id),
        workout_date,
        status,
        details,
    })
}
