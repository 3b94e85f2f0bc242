//! Crash recovery for rides left without an end marker.
//!
//! The recorder's live state is not durable. If the process dies
//! mid-session, the ride row and its flushed fixes survive with a NULL
//! end marker; on the next start they are offered to the caller to
//! recover or discard, never silently resumed or dropped.

use crate::recording::types::{RecorderError, RideSession};
use crate::storage::database::Database;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An unfinished ride found in the database.
#[derive(Debug, Clone)]
pub struct IncompleteRide {
    /// The ride as last checkpointed
    pub session: RideSession,
    /// Capture time of its last stored fix, if any fix made it to disk
    pub last_fix_at: Option<DateTime<Utc>>,
}

/// List rides that never received an end marker.
pub fn list_incomplete(db: &Database) -> Result<Vec<IncompleteRide>, RecorderError> {
    let sessions = db
        .list_incomplete_rides()
        .map_err(|e| RecorderError::RecoveryFailed(e.to_string()))?;

    let mut incomplete = Vec::with_capacity(sessions.len());
    for session in sessions {
        let last_fix_at = db
            .last_fix_for_ride(&session.id)
            .map_err(|e| RecorderError::RecoveryFailed(e.to_string()))?
            .map(|fix| fix.captured_at);
        incomplete.push(IncompleteRide {
            session,
            last_fix_at,
        });
    }

    Ok(incomplete)
}

/// Finalize an interrupted ride using its last checkpointed aggregates.
///
/// The end marker is taken from the last stored fix when one exists (the
/// closest witness to when recording actually ceased) and falls back to
/// now for a ride that crashed before any fix was flushed.
pub fn recover(db: &Database, id: &Uuid) -> Result<RideSession, RecorderError> {
    let mut session = db
        .get_ride(id)
        .map_err(|e| RecorderError::RecoveryFailed(e.to_string()))?
        .ok_or_else(|| RecorderError::RecoveryFailed(format!("No such ride: {id}")))?;

    if session.ended_at.is_some() {
        // Already complete; nothing to repair
        return Ok(session);
    }

    let last_fix_at = db
        .last_fix_for_ride(id)
        .map_err(|e| RecorderError::RecoveryFailed(e.to_string()))?
        .map(|fix| fix.captured_at);

    session.ended_at = Some(last_fix_at.unwrap_or_else(Utc::now));

    db.finalize_ride(&session)
        .map_err(|e| RecorderError::RecoveryFailed(e.to_string()))?;

    tracing::info!(ride = %session.id, "Recovered interrupted ride");
    Ok(session)
}

/// Delete an interrupted ride and its fixes.
pub fn discard(db: &Database, id: &Uuid) -> Result<(), RecorderError> {
    db.delete_ride(id)
        .map_err(|e| RecorderError::RecoveryFailed(e.to_string()))?;

    tracing::info!(ride = %id, "Discarded interrupted ride");
    Ok(())
}
