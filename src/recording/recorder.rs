//! Ride recorder: the state machine behind a recording session.
//!
//! Owns the single active [`RideSession`] and serializes every mutation:
//! location fixes drive distance and speed, a periodic tick drives the
//! duration bookkeeping, and user commands drive state transitions. All
//! methods take the caller's `now` so the machine is deterministic under
//! test.

use crate::geo;
use crate::location::types::{LocationEvent, LocationUpdate};
use crate::recording::types::{
    AutoPauseSettings, LiveSnapshot, PauseKind, PositionFix, RecorderConfig, RecorderError,
    RecordingState, RideFault, RideSession,
};
use crate::storage::database::{Database, DatabaseError};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Minimum disk space in bytes required to continue recording (50 MB)
const MIN_DISK_SPACE_BYTES: u64 = 50 * 1024 * 1024;

/// Warning threshold for low disk space (500 MB)
const LOW_DISK_SPACE_WARNING_BYTES: u64 = 500 * 1024 * 1024;

/// Storage status for the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    /// Plenty of storage available
    Ok,
    /// Storage is running low (warning threshold)
    Low,
    /// Storage is critically low (recording should stop)
    Critical,
    /// Unable to determine storage status
    Unknown,
}

/// Records a ride from a stream of position fixes.
pub struct RideRecorder {
    /// Configuration
    config: RecorderConfig,
    /// Auto-pause preferences, updatable mid-session
    auto_pause: AutoPauseSettings,
    /// Current state
    state: RecordingState,
    /// The active session, if any
    session: Option<RideSession>,
    /// Monotonic instant the clock started counting
    start_instant: Option<Instant>,
    /// When the first usable fix was consumed (stabilization gate input)
    first_fix_at: Option<Instant>,
    /// Start of the in-progress manual pause
    manual_pause_started: Option<Instant>,
    /// Start of the in-progress auto-pause
    auto_pause_started: Option<Instant>,
    /// Since when gated speed has been continuously zero
    stationary_since: Option<Instant>,
    /// Previous accepted coordinates, for incremental distance
    last_position: Option<(f64, f64)>,
    /// Gated instantaneous speed for display
    current_speed_ms: f64,
    /// Last fix was rejected or signal reported lost
    gps_degraded: bool,
    /// Fatal condition, if any
    fault: Option<RideFault>,
    /// Fixes awaiting a batched insert
    fix_buffer: Vec<PositionFix>,
    /// Last time the aggregate row was rewritten
    last_aggregate_write: Option<Instant>,
    /// Whether the session row exists in the database
    row_created: bool,
    /// Database for persistence (optional)
    database: Option<Arc<Mutex<Database>>>,
}

impl RideRecorder {
    /// Create a new ride recorder.
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            auto_pause: AutoPauseSettings::default(),
            state: RecordingState::Idle,
            session: None,
            start_instant: None,
            first_fix_at: None,
            manual_pause_started: None,
            auto_pause_started: None,
            stationary_since: None,
            last_position: None,
            current_speed_ms: 0.0,
            gps_degraded: false,
            fault: None,
            fix_buffer: Vec::new(),
            last_aggregate_write: None,
            row_created: false,
            database: None,
        }
    }

    /// Create a new ride recorder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RecorderConfig::default())
    }

    /// Create a new ride recorder persisting to the given database.
    pub fn with_database(config: RecorderConfig, database: Arc<Mutex<Database>>) -> Self {
        let mut recorder = Self::new(config);
        recorder.database = Some(database);
        recorder
    }

    /// Set the database for persistence.
    pub fn set_database(&mut self, database: Arc<Mutex<Database>>) {
        self.database = Some(database);
    }

    /// Update auto-pause preferences. Takes effect immediately; disabling
    /// while auto-paused resumes the clock.
    pub fn set_auto_pause(&mut self, settings: AutoPauseSettings, now: Instant) {
        self.auto_pause = settings;
        if !settings.enabled {
            self.stationary_since = None;
            if self.state == RecordingState::AutoPaused {
                self.leave_auto_pause(now);
            }
        }
    }

    /// Get the current state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Whether fixes should currently be consumed from the location source.
    ///
    /// False during a manual pause: consumption halts entirely there, while
    /// auto-pause keeps fixes flowing so movement can end it.
    pub fn consumes_fixes(&self) -> bool {
        matches!(
            self.state,
            RecordingState::WaitingForStableStart
                | RecordingState::Recording
                | RecordingState::AutoPaused
        )
    }

    /// A snapshot of the current state for observers.
    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            state: self.state,
            session: self.session.clone(),
            current_speed_ms: self.current_speed_ms,
            gps_degraded: self.gps_degraded,
            fault: self.fault,
        }
    }

    // ========== Commands ==========

    /// Start a new session. No-op unless idle.
    pub fn start(&mut self, _now: Instant) {
        if self.state != RecordingState::Idle {
            tracing::debug!(state = ?self.state, "Ignoring start");
            return;
        }

        if self.database.is_some() {
            if let Err(e) = self.ensure_storage_available() {
                tracing::error!("Cannot start recording: {e}");
                self.fault = Some(RideFault::StorageUnavailable);
                return;
            }
        }

        self.reset_transient();
        self.fault = None;
        self.session = Some(RideSession::new());
        self.state = RecordingState::WaitingForStableStart;

        tracing::info!("Started ride, waiting for a stable clock");
    }

    /// Pause by user request. Collapses an active auto-pause; idempotent
    /// while already manually paused.
    pub fn pause(&mut self, now: Instant) {
        match self.state {
            RecordingState::Recording => {}
            RecordingState::AutoPaused => {
                // Manual pause wins over auto-pause
                self.commit_auto_pause(now);
            }
            _ => {
                tracing::debug!(state = ?self.state, "Ignoring pause");
                return;
            }
        }

        self.refresh_aggregates(now);
        self.manual_pause_started = Some(now);
        self.stationary_since = None;
        self.current_speed_ms = 0.0;
        self.state = RecordingState::ManuallyPaused;
        self.checkpoint(now);

        tracing::info!("Paused recording");
    }

    /// Resume from a manual pause. No-op otherwise.
    pub fn resume(&mut self, now: Instant) {
        if self.state != RecordingState::ManuallyPaused {
            tracing::debug!(state = ?self.state, "Ignoring resume");
            return;
        }

        if let (Some(session), Some(started)) =
            (self.session.as_mut(), self.manual_pause_started.take())
        {
            session.manual_paused += now.duration_since(started);
        }
        self.state = RecordingState::Recording;

        tracing::info!("Resumed recording");
    }

    /// Stop the session. Finalizes from the last in-memory aggregates; the
    /// session then awaits save or discard.
    pub fn stop(&mut self, now: Instant) {
        if !self.state.is_active() {
            tracing::debug!(state = ?self.state, "Ignoring stop");
            return;
        }

        self.halt(now, true);
        tracing::info!("Stopped recording");
    }

    /// Persist the stopped session and return it finalized.
    ///
    /// On a persistence failure the session is kept in the stopped state so
    /// nothing captured is lost; a later save can retry.
    pub fn save(&mut self, _now: Instant) -> Result<RideSession, RecorderError> {
        if self.state != RecordingState::Stopped {
            return Err(RecorderError::NotStopped(self.state));
        }

        let Some(mut session) = self.session.take() else {
            self.reset();
            return Err(RecorderError::NoData);
        };

        if session.started_at.is_none() {
            // Never reached a stable clock; nothing worth keeping
            self.reset();
            return Err(RecorderError::NoData);
        }

        if session.ended_at.is_none() {
            session.ended_at = Some(Utc::now());
        }

        if let Some(db) = self.database.clone() {
            let mut guard = match db.lock() {
                Ok(guard) => guard,
                Err(e) => {
                    self.session = Some(session);
                    self.fault = Some(RideFault::StorageUnavailable);
                    return Err(RecorderError::SaveFailed(format!(
                        "Database lock failed: {e}"
                    )));
                }
            };

            if !self.row_created {
                // An earlier write failure may have kept the row from being
                // created; a save is the retry point
                if let Err(e) = guard.insert_ride(&session) {
                    drop(guard);
                    tracing::error!("Failed to save ride: {e}");
                    self.session = Some(session);
                    self.fault = Some(RideFault::StorageUnavailable);
                    return Err(RecorderError::SaveFailed(e.to_string()));
                }
                self.row_created = true;
            }

            if let Err(e) = guard.append_fixes(&session.id, &self.fix_buffer) {
                drop(guard);
                tracing::error!("Failed to save ride: {e}");
                self.session = Some(session);
                self.fault = Some(RideFault::StorageUnavailable);
                return Err(RecorderError::SaveFailed(e.to_string()));
            }
            // Appended fixes stay stored even if finalize fails; a retried
            // save must not insert them twice
            self.fix_buffer.clear();

            if let Err(e) = guard.finalize_ride(&session) {
                drop(guard);
                tracing::error!("Failed to save ride: {e}");
                self.session = Some(session);
                self.fault = Some(RideFault::StorageUnavailable);
                return Err(RecorderError::SaveFailed(e.to_string()));
            }
        } else {
            tracing::warn!("No database configured, ride not persisted");
        }

        tracing::info!(ride = %session.id, "Saved ride");
        self.reset();
        Ok(session)
    }

    /// Discard the stopped session and everything persisted for it.
    pub fn discard(&mut self) {
        if self.state != RecordingState::Stopped {
            tracing::debug!(state = ?self.state, "Ignoring discard");
            return;
        }

        if self.row_created {
            if let (Some(db), Some(session)) = (&self.database, &self.session) {
                let result = match db.lock() {
                    Ok(guard) => guard.delete_ride(&session.id),
                    Err(e) => Err(DatabaseError::QueryFailed(format!(
                        "Database lock failed: {e}"
                    ))),
                };
                if let Err(e) = result {
                    tracing::warn!("Failed to delete discarded ride: {e}");
                }
            }
        }

        self.reset();
        tracing::info!("Discarded recording");
    }

    // ========== Event sources ==========

    /// Feed one location event into the machine.
    pub fn handle_event(&mut self, event: LocationEvent, now: Instant) {
        match event {
            LocationEvent::Fix(update) => self.handle_fix(update, now),
            LocationEvent::SignalLost => self.gps_degraded = true,
            LocationEvent::PermissionDenied => self.permission_lost(now),
        }
    }

    /// Periodic tick driving duration bookkeeping.
    ///
    /// Runs decoupled from fix arrival so observers see the clock advance
    /// even when no position data is coming in. Frozen during a manual
    /// pause on purpose; auto-pause keeps ticking with the in-progress
    /// pause interval folded in.
    pub fn tick(&mut self, now: Instant) {
        match self.state {
            RecordingState::WaitingForStableStart => {
                self.try_stabilize(now);
            }
            RecordingState::Recording => {
                self.check_stationary(now);
                self.refresh_aggregates(now);
                self.maybe_checkpoint(now);
            }
            RecordingState::AutoPaused => {
                self.refresh_aggregates(now);
                self.maybe_checkpoint(now);
            }
            _ => {}
        }
    }

    fn handle_fix(&mut self, update: LocationUpdate, now: Instant) {
        if !self.consumes_fixes() {
            return;
        }

        if update.accuracy_m > self.config.max_accuracy_m {
            tracing::debug!(
                accuracy_m = update.accuracy_m,
                "Rejected fix with poor accuracy"
            );
            self.gps_degraded = true;
            return;
        }
        self.gps_degraded = false;

        // Negative speed is a receiver defect; clamp at the boundary
        let speed = update.speed_ms.max(0.0);
        let gated = if speed >= self.config.stationary_cutoff_ms {
            speed
        } else {
            0.0
        };

        if self.state == RecordingState::WaitingForStableStart {
            // Seed the distance baseline but persist nothing yet
            self.first_fix_at.get_or_insert(now);
            self.last_position = Some((update.latitude, update.longitude));
            self.try_stabilize(now);
            return;
        }

        if self.state == RecordingState::AutoPaused {
            if gated > 0.0 {
                self.leave_auto_pause(now);
                // fall through: this fix counts as the first moving one
            } else {
                self.last_position = Some((update.latitude, update.longitude));
                self.store_fix(&update, PauseKind::Auto, now);
                return;
            }
        }

        self.refresh_aggregates(now);

        let Some(session) = self.session.as_mut() else {
            return;
        };

        if let Some((prev_lat, prev_lon)) = self.last_position {
            session.distance_m +=
                geo::haversine_distance(prev_lat, prev_lon, update.latitude, update.longitude);
        }
        self.last_position = Some((update.latitude, update.longitude));

        self.current_speed_ms = gated;
        session.max_speed_ms = session.max_speed_ms.max(gated);
        if session.moving > Duration::ZERO {
            session.average_speed_ms = session.distance_m / session.moving.as_secs_f64();
        }

        self.store_fix(&update, PauseKind::None, now);

        if gated > 0.0 {
            self.stationary_since = None;
        } else {
            self.stationary_since.get_or_insert(now);
            self.check_stationary(now);
        }
    }

    // ========== Internals ==========

    /// Enter `Recording` once the stabilization delay has elapsed since the
    /// first usable fix. The clock baseline is the consumption-time instant
    /// of this transition, never a fix's own timestamp: receiver timestamps
    /// can trail wall-clock by seconds.
    fn try_stabilize(&mut self, now: Instant) {
        let Some(first) = self.first_fix_at else {
            return;
        };
        if now.duration_since(first) < self.config.stabilization_delay {
            return;
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.started_at = Some(Utc::now());
        self.start_instant = Some(now);
        self.state = RecordingState::Recording;
        tracing::info!(ride = %session.id, "Clock stable, recording");

        if let Some(db) = &self.database {
            let session = session.clone();
            let result = match db.lock() {
                Ok(guard) => guard.insert_ride(&session),
                Err(e) => Err(DatabaseError::QueryFailed(format!(
                    "Database lock failed: {e}"
                ))),
            };
            match result {
                Ok(()) => self.row_created = true,
                Err(e) => self.storage_failure(now, &e.to_string()),
            }
        }
    }

    /// Recompute elapsed/moving/average from the clock baseline.
    ///
    /// While auto-paused the in-progress pause interval is folded into the
    /// calculation without being committed, so the live moving duration
    /// equals what auto-resume will settle on, with no backward jump.
    fn refresh_aggregates(&mut self, now: Instant) {
        let Some(start) = self.start_instant else {
            // Unset start must short-circuit all duration math
            return;
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let elapsed = now.duration_since(start);
        let mut auto_paused = session.auto_paused;
        if let Some(pause_start) = self.auto_pause_started {
            auto_paused += now.duration_since(pause_start);
        }

        let moving = elapsed
            .saturating_sub(session.manual_paused)
            .saturating_sub(auto_paused);

        if moving < self.config.min_moving_duration {
            // Not counting yet; keep the zeroed clock visible
            return;
        }

        session.elapsed = elapsed;
        session.moving = moving;
        session.average_speed_ms = if moving > Duration::ZERO {
            session.distance_m / moving.as_secs_f64()
        } else {
            0.0
        };
    }

    /// Enter auto-pause once gated speed has been zero for the threshold.
    fn check_stationary(&mut self, now: Instant) {
        if !self.auto_pause.enabled || self.state != RecordingState::Recording {
            return;
        }
        let Some(since) = self.stationary_since else {
            return;
        };
        if now.duration_since(since) < self.auto_pause.threshold() {
            return;
        }

        self.auto_pause_started = Some(now);
        self.stationary_since = None;
        self.current_speed_ms = 0.0;
        self.state = RecordingState::AutoPaused;
        self.checkpoint(now);

        tracing::info!("Auto-paused after sustained stationary speed");
    }

    fn commit_auto_pause(&mut self, now: Instant) {
        if let (Some(session), Some(started)) =
            (self.session.as_mut(), self.auto_pause_started.take())
        {
            session.auto_paused += now.duration_since(started);
        }
    }

    fn leave_auto_pause(&mut self, now: Instant) {
        self.commit_auto_pause(now);
        self.stationary_since = None;
        self.state = RecordingState::Recording;
        tracing::info!("Movement detected, auto-pause ended");
    }

    /// Buffer a fix for batched insertion.
    fn store_fix(&mut self, update: &LocationUpdate, pause: PauseKind, now: Instant) {
        self.fix_buffer.push(PositionFix::from_update(update, pause));

        if self.database.is_none() {
            // Nowhere to flush to; bound the buffer
            if self.fix_buffer.len() > self.config.fix_batch_size * 4 {
                self.fix_buffer.clear();
            }
            return;
        }

        if self.row_created && self.fix_buffer.len() >= self.config.fix_batch_size {
            if let Err(e) = self.flush_fixes() {
                self.storage_failure(now, &e.to_string());
            }
        }
    }

    fn flush_fixes(&mut self) -> Result<(), DatabaseError> {
        if self.fix_buffer.is_empty() || !self.row_created {
            return Ok(());
        }
        let Some(db) = &self.database else {
            return Ok(());
        };
        let Some(session) = &self.session else {
            return Ok(());
        };

        let mut guard = db
            .lock()
            .map_err(|e| DatabaseError::QueryFailed(format!("Database lock failed: {e}")))?;
        guard.append_fixes(&session.id, &self.fix_buffer)?;
        self.fix_buffer.clear();
        Ok(())
    }

    /// Persist the aggregate row if the write interval has elapsed.
    fn maybe_checkpoint(&mut self, now: Instant) {
        if !self.row_created {
            return;
        }
        let due = match self.last_aggregate_write {
            Some(last) => now.duration_since(last) >= self.config.aggregate_write_interval,
            None => true,
        };
        if !due {
            return;
        }

        if let Err(e) = self.ensure_storage_available() {
            self.storage_failure(now, &e.to_string());
            return;
        }
        self.checkpoint(now);
    }

    /// Flush buffered fixes and rewrite the aggregate row.
    fn checkpoint(&mut self, now: Instant) {
        if !self.row_created {
            return;
        }

        if let Err(e) = self.flush_fixes() {
            self.storage_failure(now, &e.to_string());
            return;
        }

        let Some(db) = &self.database else {
            return;
        };
        let Some(session) = &self.session else {
            return;
        };

        let result = match db.lock() {
            Ok(guard) => guard.update_ride_aggregate(session),
            Err(e) => Err(DatabaseError::QueryFailed(format!(
                "Database lock failed: {e}"
            ))),
        };
        match result {
            Ok(()) => self.last_aggregate_write = Some(now),
            Err(e) => self.storage_failure(now, &e.to_string()),
        }
    }

    /// A persistence write failed: stop gracefully, keep captured data.
    fn storage_failure(&mut self, now: Instant, cause: &str) {
        if self.state == RecordingState::Stopped {
            return;
        }
        tracing::error!("Persistence failed, stopping recording: {cause}");
        self.fault = Some(RideFault::StorageUnavailable);
        self.halt(now, false);
    }

    /// The platform revoked location access: preserve and finalize what we
    /// captured, then surface the condition.
    fn permission_lost(&mut self, now: Instant) {
        if !self.state.is_active() {
            return;
        }
        tracing::warn!("Location permission revoked, stopping recording");

        self.halt(now, true);
        self.fault = Some(RideFault::PermissionRequired);

        if self.row_created {
            if let Some(session) = self.session.as_mut() {
                session.ended_at = Some(Utc::now());
            }
            if let (Some(db), Some(session)) = (&self.database, &self.session) {
                let result = match db.lock() {
                    Ok(guard) => guard.finalize_ride(session),
                    Err(e) => Err(DatabaseError::QueryFailed(format!(
                        "Database lock failed: {e}"
                    ))),
                };
                if let Err(e) = result {
                    tracing::error!("Failed to finalize after permission loss: {e}");
                }
            }
        }
    }

    /// Commit in-progress pauses, settle aggregates, and enter `Stopped`.
    fn halt(&mut self, now: Instant, persist: bool) {
        if let (Some(session), Some(started)) =
            (self.session.as_mut(), self.manual_pause_started.take())
        {
            session.manual_paused += now.duration_since(started);
        }
        self.commit_auto_pause(now);
        self.stationary_since = None;
        self.refresh_aggregates(now);
        self.current_speed_ms = 0.0;
        self.state = RecordingState::Stopped;

        if persist && self.row_created {
            if let Err(e) = self.flush_fixes() {
                tracing::error!("Failed to flush fixes on stop: {e}");
                self.fault = Some(RideFault::StorageUnavailable);
                return;
            }
            if let (Some(db), Some(session)) = (&self.database, &self.session) {
                let result = match db.lock() {
                    Ok(guard) => guard.update_ride_aggregate(session),
                    Err(e) => Err(DatabaseError::QueryFailed(format!(
                        "Database lock failed: {e}"
                    ))),
                };
                if let Err(e) = result {
                    tracing::error!("Failed to write aggregate on stop: {e}");
                    self.fault = Some(RideFault::StorageUnavailable);
                }
            }
        }
    }

    fn reset_transient(&mut self) {
        self.start_instant = None;
        self.first_fix_at = None;
        self.manual_pause_started = None;
        self.auto_pause_started = None;
        self.stationary_since = None;
        self.last_position = None;
        self.current_speed_ms = 0.0;
        self.gps_degraded = false;
        self.fix_buffer.clear();
        self.last_aggregate_write = None;
        self.row_created = false;
    }

    fn reset(&mut self) {
        self.session = None;
        self.fault = None;
        self.state = RecordingState::Idle;
        self.reset_transient();
    }

    // ========== Storage guard ==========

    /// Check the current storage status.
    pub fn check_storage_status(&self) -> StorageStatus {
        check_disk_space(".")
    }

    /// Check if there's enough storage to continue recording.
    pub fn ensure_storage_available(&self) -> Result<(), RecorderError> {
        match self.check_storage_status() {
            StorageStatus::Critical => {
                tracing::error!("Storage is critically low - cannot continue recording");
                Err(RecorderError::StorageFull)
            }
            StorageStatus::Low => {
                tracing::warn!("Storage is running low");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Check available disk space for a path.
fn check_disk_space(path: &str) -> StorageStatus {
    #[cfg(target_os = "windows")]
    {
        check_disk_space_windows(path)
    }
    #[cfg(not(target_os = "windows"))]
    {
        check_disk_space_unix(path)
    }
}

#[cfg(target_os = "windows")]
fn check_disk_space_windows(path: &str) -> StorageStatus {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;

    let path = Path::new(path);
    let root = path
        .components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .unwrap_or_else(|| "C:\\".to_string());

    let root = if root.ends_with('\\') || root.ends_with('/') {
        root
    } else {
        format!("{}\\", root)
    };

    unsafe {
        let mut free_bytes_available: u64 = 0;
        let mut total_bytes: u64 = 0;
        let mut total_free_bytes: u64 = 0;

        let root_wide: Vec<u16> = OsStr::new(&root)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        let result = windows_sys::Win32::Storage::FileSystem::GetDiskFreeSpaceExW(
            root_wide.as_ptr(),
            &mut free_bytes_available,
            &mut total_bytes,
            &mut total_free_bytes,
        );

        if result == 0 {
            tracing::warn!("Failed to get disk space for {}", root);
            return StorageStatus::Unknown;
        }

        if free_bytes_available < MIN_DISK_SPACE_BYTES {
            StorageStatus::Critical
        } else if free_bytes_available < LOW_DISK_SPACE_WARNING_BYTES {
            StorageStatus::Low
        } else {
            StorageStatus::Ok
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn check_disk_space_unix(path: &str) -> StorageStatus {
    use std::mem::MaybeUninit;

    let path =
        std::ffi::CString::new(path).unwrap_or_else(|_| std::ffi::CString::new(".").unwrap());

    unsafe {
        let mut stat: MaybeUninit<libc::statvfs> = MaybeUninit::uninit();
        let result = libc::statvfs(path.as_ptr(), stat.as_mut_ptr());

        if result != 0 {
            tracing::warn!("Failed to get disk space");
            return StorageStatus::Unknown;
        }

        let stat = stat.assume_init();
        #[allow(clippy::unnecessary_cast)]
        let free_bytes = stat.f_bavail as u64 * stat.f_frsize as u64;

        if free_bytes < MIN_DISK_SPACE_BYTES {
            StorageStatus::Critical
        } else if free_bytes < LOW_DISK_SPACE_WARNING_BYTES {
            StorageStatus::Low
        } else {
            StorageStatus::Ok
        }
    }
}
