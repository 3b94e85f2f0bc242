//! CSV export of raw position fixes.

use crate::recording::types::{ExportError, PositionFix, RideSession};
use std::io::Write;

/// Export ride fixes to CSV format.
pub fn export_csv(fixes: &[PositionFix]) -> Result<String, ExportError> {
    if fixes.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut output = Vec::new();

    writeln!(
        output,
        "captured_at,latitude,longitude,speed_ms,accuracy_m,manual_paused,auto_paused"
    )
    .map_err(|e| ExportError::WriteFailed(e.to_string()))?;

    for fix in fixes {
        writeln!(
            output,
            "{},{:.7},{:.7},{:.2},{:.1},{},{}",
            fix.captured_at.to_rfc3339(),
            fix.latitude,
            fix.longitude,
            fix.speed_ms,
            fix.accuracy_m,
            fix.manual_paused as u8,
            fix.auto_paused as u8,
        )
        .map_err(|e| ExportError::WriteFailed(e.to_string()))?;
    }

    String::from_utf8(output).map_err(|e| ExportError::WriteFailed(e.to_string()))
}

/// Export a one-line ride summary to CSV format.
pub fn export_summary_csv(session: &RideSession) -> Result<String, ExportError> {
    let mut output = Vec::new();

    writeln!(
        output,
        "id,started_at,ended_at,elapsed_s,moving_s,manual_paused_s,auto_paused_s,distance_m,average_speed_ms,max_speed_ms"
    )
    .map_err(|e| ExportError::WriteFailed(e.to_string()))?;

    writeln!(
        output,
        "{},{},{},{},{},{},{},{:.1},{:.2},{:.2}",
        session.id,
        session
            .started_at
            .map_or(String::new(), |t| t.to_rfc3339()),
        session.ended_at.map_or(String::new(), |t| t.to_rfc3339()),
        session.elapsed.as_secs(),
        session.moving.as_secs(),
        session.manual_paused.as_secs(),
        session.auto_paused.as_secs(),
        session.distance_m,
        session.average_speed_ms,
        session.max_speed_ms,
    )
    .map_err(|e| ExportError::WriteFailed(e.to_string()))?;

    String::from_utf8(output).map_err(|e| ExportError::WriteFailed(e.to_string()))
}
