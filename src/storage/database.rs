//! Database operations using rusqlite.

use crate::recording::types::{PositionFix, RideSession};
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        // Cascade deletion of fixes requires foreign key enforcement
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        // Future migrations would go here:
        // if from_version < 2 { ... }

        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Ride session operations ==========

    /// Insert a new ride session row.
    ///
    /// Only called once the stabilization gate has passed, so the start
    /// timestamp is always present.
    pub fn insert_ride(&self, session: &RideSession) -> Result<(), DatabaseError> {
        let started_at = session
            .started_at
            .ok_or(DatabaseError::MissingStartTime)?;

        self.conn
            .execute(
                "INSERT INTO rides (id, started_at, ended_at, elapsed_ms, moving_ms,
                 manual_paused_ms, auto_paused_ms, distance_m, average_speed_ms,
                 max_speed_ms, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    session.id.to_string(),
                    started_at.to_rfc3339(),
                    session.ended_at.map(|t| t.to_rfc3339()),
                    session.elapsed.as_millis() as i64,
                    session.moving.as_millis() as i64,
                    session.manual_paused.as_millis() as i64,
                    session.auto_paused.as_millis() as i64,
                    session.distance_m,
                    session.average_speed_ms,
                    session.max_speed_ms,
                    session.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Rewrite the aggregate columns of an in-progress ride.
    pub fn update_ride_aggregate(&self, session: &RideSession) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "UPDATE rides SET elapsed_ms = ?2, moving_ms = ?3, manual_paused_ms = ?4,
                 auto_paused_ms = ?5, distance_m = ?6, average_speed_ms = ?7,
                 max_speed_ms = ?8 WHERE id = ?1",
                params![
                    session.id.to_string(),
                    session.elapsed.as_millis() as i64,
                    session.moving.as_millis() as i64,
                    session.manual_paused.as_millis() as i64,
                    session.auto_paused.as_millis() as i64,
                    session.distance_m,
                    session.average_speed_ms,
                    session.max_speed_ms,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Write the final aggregates and the end marker.
    pub fn finalize_ride(&self, session: &RideSession) -> Result<(), DatabaseError> {
        let ended_at = session.ended_at.ok_or(DatabaseError::MissingEndTime)?;

        self.update_ride_aggregate(session)?;
        self.conn
            .execute(
                "UPDATE rides SET ended_at = ?2 WHERE id = ?1",
                params![session.id.to_string(), ended_at.to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Delete a ride; its fixes cascade.
    pub fn delete_ride(&self, id: &Uuid) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM rides WHERE id = ?1", params![id.to_string()])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Get a ride by ID.
    pub fn get_ride(&self, id: &Uuid) -> Result<Option<RideSession>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1", SELECT_RIDE))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![id.to_string()], RideRow::from_row);

        match result {
            Ok(row) => Ok(Some(row.into_session()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// List all rides, most recent first.
    pub fn list_rides(&self) -> Result<Vec<RideSession>, DatabaseError> {
        self.query_rides(&format!("{} ORDER BY started_at DESC", SELECT_RIDE))
    }

    /// List rides that never received an end marker (crash recovery).
    pub fn list_incomplete_rides(&self) -> Result<Vec<RideSession>, DatabaseError> {
        self.query_rides(&format!(
            "{} WHERE ended_at IS NULL ORDER BY started_at",
            SELECT_RIDE
        ))
    }

    fn query_rides(&self, sql: &str) -> Result<Vec<RideSession>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], RideRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            sessions.push(row.into_session()?);
        }

        Ok(sessions)
    }

    // ========== Position fix operations ==========

    /// Append a batch of fixes for a ride in a single transaction.
    pub fn append_fixes(
        &mut self,
        ride_id: &Uuid,
        fixes: &[PositionFix],
    ) -> Result<(), DatabaseError> {
        if fixes.is_empty() {
            return Ok(());
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO ride_fixes (ride_id, latitude, longitude, speed_ms,
                     accuracy_m, captured_at, manual_paused, auto_paused)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            for fix in fixes {
                stmt.execute(params![
                    ride_id.to_string(),
                    fix.latitude,
                    fix.longitude,
                    fix.speed_ms,
                    fix.accuracy_m,
                    fix.captured_at.to_rfc3339(),
                    fix.manual_paused as i32,
                    fix.auto_paused as i32,
                ])
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Get all fixes for a ride in capture order.
    pub fn fixes_for_ride(&self, ride_id: &Uuid) -> Result<Vec<PositionFix>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT latitude, longitude, speed_ms, accuracy_m, captured_at,
                 manual_paused, auto_paused FROM ride_fixes WHERE ride_id = ?1 ORDER BY id",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![ride_id.to_string()], FixRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut fixes = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            fixes.push(row.into_fix()?);
        }

        Ok(fixes)
    }

    /// Get the most recently stored fix for a ride, if any.
    pub fn last_fix_for_ride(&self, ride_id: &Uuid) -> Result<Option<PositionFix>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT latitude, longitude, speed_ms, accuracy_m, captured_at,
                 manual_paused, auto_paused FROM ride_fixes WHERE ride_id = ?1
                 ORDER BY id DESC LIMIT 1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![ride_id.to_string()], FixRow::from_row);

        match result {
            Ok(row) => Ok(Some(row.into_fix()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Count stored fixes for a ride.
    pub fn fix_count(&self, ride_id: &Uuid) -> Result<u64, DatabaseError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM ride_fixes WHERE ride_id = ?1",
                params![ride_id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as u64)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }
}

const SELECT_RIDE: &str = "SELECT id, started_at, ended_at, elapsed_ms, moving_ms,
 manual_paused_ms, auto_paused_ms, distance_m, average_speed_ms, max_speed_ms,
 created_at FROM rides";

/// Raw database row for a ride.
struct RideRow {
    id: String,
    started_at: String,
    ended_at: Option<String>,
    elapsed_ms: i64,
    moving_ms: i64,
    manual_paused_ms: i64,
    auto_paused_ms: i64,
    distance_m: f64,
    average_speed_ms: f64,
    max_speed_ms: f64,
    created_at: String,
}

impl RideRow {
    fn from_row(row: &rusqlite::Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            started_at: row.get(1)?,
            ended_at: row.get(2)?,
            elapsed_ms: row.get(3)?,
            moving_ms: row.get(4)?,
            manual_paused_ms: row.get(5)?,
            auto_paused_ms: row.get(6)?,
            distance_m: row.get(7)?,
            average_speed_ms: row.get(8)?,
            max_speed_ms: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    fn into_session(self) -> Result<RideSession, DatabaseError> {
        Ok(RideSession {
            id: parse_uuid(&self.id)?,
            started_at: Some(parse_timestamp(&self.started_at)?),
            ended_at: self.ended_at.as_deref().map(parse_timestamp).transpose()?,
            elapsed: Duration::from_millis(self.elapsed_ms.max(0) as u64),
            moving: Duration::from_millis(self.moving_ms.max(0) as u64),
            manual_paused: Duration::from_millis(self.manual_paused_ms.max(0) as u64),
            auto_paused: Duration::from_millis(self.auto_paused_ms.max(0) as u64),
            distance_m: self.distance_m,
            average_speed_ms: self.average_speed_ms,
            max_speed_ms: self.max_speed_ms,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Raw database row for a position fix.
struct FixRow {
    latitude: f64,
    longitude: f64,
    speed_ms: f64,
    accuracy_m: f64,
    captured_at: String,
    manual_paused: i32,
    auto_paused: i32,
}

impl FixRow {
    fn from_row(row: &rusqlite::Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            latitude: row.get(0)?,
            longitude: row.get(1)?,
            speed_ms: row.get(2)?,
            accuracy_m: row.get(3)?,
            captured_at: row.get(4)?,
            manual_paused: row.get(5)?,
            auto_paused: row.get(6)?,
        })
    }

    fn into_fix(self) -> Result<PositionFix, DatabaseError> {
        Ok(PositionFix {
            latitude: self.latitude,
            longitude: self.longitude,
            speed_ms: self.speed_ms,
            accuracy_m: self.accuracy_m,
            captured_at: parse_timestamp(&self.captured_at)?,
            manual_paused: self.manual_paused != 0,
            auto_paused: self.auto_paused != 0,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Session has no start time")]
    MissingStartTime,

    #[error("Session has no end time")]
    MissingEndTime,
}
