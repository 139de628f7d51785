//! Database module - SQLite storage for users, plans and logged sets

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::planner::plan::WorkoutPlan;

/// One logged working set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLog {
    pub id: Option<i64>,
    pub tg_user_id: i64,
    pub exercise: String,
    pub sets: i32,
    pub reps: i32,
    pub weight_kg: f64,
    pub rpe: Option<f64>,
    pub is_warmup: bool,
    pub logged_at: DateTime<Utc>,
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// In-memory database for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tg_user_id INTEGER NOT NULL UNIQUE,
                tz TEXT NOT NULL DEFAULT 'UTC',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // One plan per user, overwritten on each regeneration.
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS plans (
                tg_user_id INTEGER PRIMARY KEY,
                plan TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS set_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tg_user_id INTEGER NOT NULL,
                exercise TEXT NOT NULL,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight_kg REAL NOT NULL,
                rpe REAL,
                is_warmup INTEGER NOT NULL DEFAULT 0,
                logged_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Create the user row if it does not exist yet.
    pub fn ensure_user(&self, tg_user_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO users (tg_user_id, tz, created_at) VALUES (?1, 'UTC', ?2)",
            params![tg_user_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// The user's timezone, defaulting to UTC for unknown users.
    pub fn user_tz(&self, tg_user_id: i64) -> Result<String> {
        let tz: Option<String> = self
            .conn
            .query_row(
                "SELECT tz FROM users WHERE tg_user_id = ?1",
                params![tg_user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(tz.unwrap_or_else(|| "UTC".to_string()))
    }

    pub fn set_user_tz(&self, tg_user_id: i64, tz: &str) -> Result<()> {
        self.ensure_user(tg_user_id)?;
        self.conn.execute(
            "UPDATE users SET tz = ?2 WHERE tg_user_id = ?1",
            params![tg_user_id, tz],
        )?;
        Ok(())
    }

    /// Store the user's current plan. Concurrent regenerations are not
    /// serialized: last writer wins.
    pub fn upsert_plan(&self, tg_user_id: i64, plan: &WorkoutPlan) -> Result<()> {
        self.ensure_user(tg_user_id)?;
        let json = serde_json::to_string(plan)?;
        self.conn.execute(
            "INSERT INTO plans (tg_user_id, plan, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(tg_user_id) DO UPDATE SET plan = ?2, updated_at = ?3",
            params![tg_user_id, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Load the user's current plan, if any. Older stored shapes fall
    /// back to the lenient constructor instead of failing the command.
    pub fn get_plan(&self, tg_user_id: i64) -> Result<Option<WorkoutPlan>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT plan FROM plans WHERE tg_user_id = ?1",
                params![tg_user_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(json) = json else {
            return Ok(None);
        };
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let plan = serde_json::from_value::<WorkoutPlan>(value.clone())
            .unwrap_or_else(|_| WorkoutPlan::from_raw(&value));
        Ok(Some(plan))
    }

    /// Add a logged set
    pub fn log_set(&self, set: &SetLog) -> Result<i64> {
        self.ensure_user(set.tg_user_id)?;
        self.conn.execute(
            "INSERT INTO set_logs (tg_user_id, exercise, sets, reps, weight_kg, rpe, is_warmup, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                set.tg_user_id,
                set.exercise,
                set.sets,
                set.reps,
                set.weight_kg,
                set.rpe,
                set.is_warmup,
                set.logged_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All sets for a user, newest first.
    pub fn sets_for_user(&self, tg_user_id: i64) -> Result<Vec<SetLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, tg_user_id, exercise, sets, reps, weight_kg, rpe, is_warmup, logged_at
             FROM set_logs WHERE tg_user_id = ?1 ORDER BY logged_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map(params![tg_user_id], Self::row_to_set)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Most recent sets of one exercise, newest first.
    pub fn last_sets_for_exercise(
        &self,
        tg_user_id: i64,
        exercise: &str,
        limit: usize,
    ) -> Result<Vec<SetLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, tg_user_id, exercise, sets, reps, weight_kg, rpe, is_warmup, logged_at
             FROM set_logs WHERE tg_user_id = ?1 AND exercise = ?2 COLLATE NOCASE
             ORDER BY logged_at DESC, id DESC LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(params![tg_user_id, exercise, limit as i64], Self::row_to_set)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn row_to_set(row: &rusqlite::Row<'_>) -> rusqlite::Result<SetLog> {
        let logged_at: String = row.get(8)?;
        Ok(SetLog {
            id: Some(row.get(0)?),
            tg_user_id: row.get(1)?,
            exercise: row.get(2)?,
            sets: row.get(3)?,
            reps: row.get(4)?,
            weight_kg: row.get(5)?,
            rpe: row.get(6)?,
            is_warmup: row.get(7)?,
            logged_at: DateTime::parse_from_rfc3339(&logged_at)
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
