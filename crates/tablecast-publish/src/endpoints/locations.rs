//! Versioned locations endpoints.

use anyhow::Context;
use tablecast_core::{Record, Table, TransformSpec, Value, transform};
use tablecast_source::TableCache;

use super::legacy;

/// v1 is the legacy shape under a versioned path.
pub fn v1(tables: &TableCache) -> anyhow::Result<Table> {
    legacy::locations(tables)
}

const V2_FIELDS: &[(&str, &str)] = &[
    ("Address", "address"),
    ("Affiliation", "affiliation"),
    ("Appointment scheduling instructions", "appointment_scheduling_instructions"),
    ("Availability Info", "availability_info"),
    ("County", "county"),
    ("Has Report", "has_report"),
    ("Latest report", "latest_report"),
    ("Latest report notes", "latest_report_notes"),
    ("Latest report yes?", "latest_report_is_yes"),
    ("Latitude", "latitude"),
    ("Location Type", "location_type"),
    ("Longitude", "longitude"),
    ("Name", "name"),
    ("vaccinefinder_location_id", "vaccinefinder_location_id"),
    ("google_places_id", "google_places_id"),
];

/// Tidy the row shapes v2 promises. Runs before the rename, so it
/// keys on the upstream field names:
/// - scheduling instructions end up a plain string: a one-element
///   list collapses, an existing string (the county-URL resolution
///   already produces one) passes through, any other shape drops the
///   field,
/// - the 0/1 report flags become booleans; a non-numeric flag drops
///   the field rather than publishing a lie.
fn shape_row(mut row: Record) -> anyhow::Result<Option<Record>> {
    match row.remove("Appointment scheduling instructions") {
        Some(Value::List(items)) if items.len() == 1 => {
            let only = items.into_iter().next().unwrap_or_default();
            row.insert(
                "Appointment scheduling instructions".to_string(),
                Value::String(only),
            );
        }
        Some(s @ Value::String(_)) => {
            row.insert("Appointment scheduling instructions".to_string(), s);
        }
        _ => {}
    }
    for flag in ["Latest report yes?", "Has Report"] {
        if let Some(Value::Number(n)) = row.remove(flag) {
            row.insert(flag.to_string(), Value::Bool(n == 1.0));
        }
    }
    Ok(Some(row))
}

pub fn v2(tables: &TableCache) -> anyhow::Result<Table> {
    let raw = tables.locations().context("failed to fetch Locations table")?;
    let spec = TransformSpec::new()
        .with_munger(shape_row)
        .with_field_map(V2_FIELDS.iter().copied());
    transform::apply(raw.as_ref().clone(), &spec)
}
