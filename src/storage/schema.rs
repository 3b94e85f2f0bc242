//! Database schema definitions for RideTrack.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Rides table
CREATE TABLE IF NOT EXISTS rides (
    id TEXT PRIMARY KEY,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    elapsed_ms INTEGER NOT NULL DEFAULT 0,
    moving_ms INTEGER NOT NULL DEFAULT 0,
    manual_paused_ms INTEGER NOT NULL DEFAULT 0,
    auto_paused_ms INTEGER NOT NULL DEFAULT 0,
    distance_m REAL NOT NULL DEFAULT 0,
    average_speed_ms REAL NOT NULL DEFAULT 0,
    max_speed_ms REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_rides_started_at ON rides(started_at);
CREATE INDEX IF NOT EXISTS idx_rides_ended_at ON rides(ended_at);

-- Position fixes table
CREATE TABLE IF NOT EXISTS ride_fixes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ride_id TEXT NOT NULL REFERENCES rides(id) ON DELETE CASCADE,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    speed_ms REAL NOT NULL,
    accuracy_m REAL NOT NULL,
    captured_at TEXT NOT NULL,
    manual_paused INTEGER NOT NULL DEFAULT 0,
    auto_paused INTEGER NOT NULL DEFAULT 0,
    CHECK (NOT (manual_paused = 1 AND auto_paused = 1))
);

CREATE INDEX IF NOT EXISTS idx_ride_fixes_ride_id ON ride_fixes(ride_id);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
