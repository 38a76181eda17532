//! Response records
//!
//! SQLite-backed store for yes/no decisions and the aggregate stats served
//! by `/api/stats`.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

use odelia_engine::{iso_timestamp, DecisionSubmission};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("metadata encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store task failed: {0}")]
    Task(String),
}

/// Raw tallies from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseCounts {
    pub total: u64,
    pub yes: u64,
    pub no: u64,
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStats {
    pub total_responses: u64,
    pub yes_count: u64,
    pub no_count: u64,
    /// Whole percent, rounded half up; 0 when nothing is recorded.
    pub yes_percentage: u32,
    pub last_updated: String,
}

impl ResponseStats {
    pub fn new(counts: ResponseCounts, now: DateTime<Utc>) -> Self {
        let yes_percentage = if counts.total > 0 {
            (counts.yes as f64 / counts.total as f64 * 100.0).round() as u32
        } else {
            0
        };
        Self {
            total_responses: counts.total,
            yes_count: counts.yes,
            no_count: counts.no,
            yes_percentage,
            last_updated: iso_timestamp(now),
        }
    }
}

/// Persistence for decisions.
pub trait ResponseStore: Send + Sync {
    /// Record a decision made at `at`. Returns the new row id.
    fn save(&self, decision: &DecisionSubmission, at: DateTime<Utc>) -> Result<i64, StoreError>;

    fn counts(&self) -> Result<ResponseCounts, StoreError>;
}

pub struct SqliteResponseStore {
    db: Mutex<Connection>,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    answer TEXT NOT NULL CHECK(answer IN ('yes', 'no')),
    timestamp TEXT NOT NULL,
    session_id TEXT,
    metadata TEXT
);";

impl SqliteResponseStore {
    /// Open or create the database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "could not create database directory");
            }
        }
        let db = Connection::open(path)?;
        db.execute_batch("PRAGMA journal_mode=WAL;")?;
        tracing::info!(path = %path.display(), "Response store opened");
        Self::init(db)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> Result<Self, StoreError> {
        db.execute_batch(SCHEMA)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn with_db<R>(&self, f: impl FnOnce(&Connection) -> Result<R, StoreError>) -> Result<R, StoreError> {
        let db = self.db.lock().map_err(|_| StoreError::Poisoned)?;
        f(&db)
    }
}

impl ResponseStore for SqliteResponseStore {
    fn save(&self, decision: &DecisionSubmission, at: DateTime<Utc>) -> Result<i64, StoreError> {
        let metadata = decision
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.with_db(|db| {
            db.execute(
                "INSERT INTO responses (answer, timestamp, session_id, metadata)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    decision.answer.as_str(),
                    iso_timestamp(at),
                    decision.session_id,
                    metadata
                ],
            )?;
            Ok(db.last_insert_rowid())
        })
    }

    fn counts(&self) -> Result<ResponseCounts, StoreError> {
        self.with_db(|db| {
            let (total, yes, no): (i64, i64, i64) = db.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN answer = 'yes' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN answer = 'no' THEN 1 ELSE 0 END), 0)
                 FROM responses",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            Ok(ResponseCounts {
                total: total.max(0) as u64,
                yes: yes.max(0) as u64,
                no: no.max(0) as u64,
            })
        })
    }
}
