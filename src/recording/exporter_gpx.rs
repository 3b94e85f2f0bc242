//! GPX export of recorded rides.

use crate::recording::types::{ExportError, PositionFix, RideSession};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// GPX namespaces
const NS_GPX: &str = "http://www.topografix.com/GPX/1/1";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";

/// Export a ride to GPX 1.1.
///
/// Fixes captured in a pause get their own track segment boundary, so
/// consumers see one continuous segment per stretch of actual riding.
pub fn export_gpx(session: &RideSession, fixes: &[PositionFix]) -> Result<String, ExportError> {
    if fixes.is_empty() {
        return Err(ExportError::NoData);
    }
    let started_at = session.started_at.ok_or(ExportError::NoStartTime)?;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    let mut root = BytesStart::new("gpx");
    root.push_attribute(("version", "1.1"));
    root.push_attribute(("creator", "RideTrack"));
    root.push_attribute(("xmlns", NS_GPX));
    root.push_attribute(("xmlns:xsi", NS_XSI));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    // Metadata with the ride start
    writer
        .write_event(Event::Start(BytesStart::new("metadata")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    write_element(&mut writer, "time", &started_at.to_rfc3339())?;
    writer
        .write_event(Event::End(BytesEnd::new("metadata")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("trk")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    write_element(
        &mut writer,
        "name",
        &format!("Ride {}", started_at.format("%Y-%m-%d %H:%M")),
    )?;

    let mut in_segment = false;
    let mut prev_paused = false;

    for fix in fixes {
        let paused = fix.manual_paused || fix.auto_paused;

        // Close the segment when riding resumes after a paused stretch
        if in_segment && prev_paused && !paused {
            writer
                .write_event(Event::End(BytesEnd::new("trkseg")))
                .map_err(|e| ExportError::XmlError(e.to_string()))?;
            in_segment = false;
        }

        if !in_segment {
            writer
                .write_event(Event::Start(BytesStart::new("trkseg")))
                .map_err(|e| ExportError::XmlError(e.to_string()))?;
            in_segment = true;
        }

        write_trkpt(&mut writer, fix)?;
        prev_paused = paused;
    }

    if in_segment {
        writer
            .write_event(Event::End(BytesEnd::new("trkseg")))
            .map_err(|e| ExportError::XmlError(e.to_string()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("trk")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("gpx")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| ExportError::XmlError(e.to_string()))
}

/// Write a single track point.
fn write_trkpt<W: std::io::Write>(
    writer: &mut Writer<W>,
    fix: &PositionFix,
) -> Result<(), ExportError> {
    let mut trkpt = BytesStart::new("trkpt");
    trkpt.push_attribute(("lat", format!("{:.7}", fix.latitude).as_str()));
    trkpt.push_attribute(("lon", format!("{:.7}", fix.longitude).as_str()));
    writer
        .write_event(Event::Start(trkpt))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    write_element(writer, "time", &fix.captured_at.to_rfc3339())?;

    writer
        .write_event(Event::Start(BytesStart::new("extensions")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    write_element(writer, "speed", &format!("{:.2}", fix.speed_ms))?;
    writer
        .write_event(Event::End(BytesEnd::new("extensions")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new("trkpt")))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    Ok(())
}

/// Write a simple text element.
fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    Ok(())
}
