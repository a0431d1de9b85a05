//! Domain accessors layered on the table cache.
//!
//! These are ordinary transform specs over `get_table`, not special
//! cases of the cache: the locations accessor composes two tables by
//! resolving a county name to that county's reservations URL.

use std::collections::HashMap;
use std::sync::Arc;

use tablecast_core::{Record, Table, TransformSpec, Value};

use crate::cache::TableCache;
use crate::error::FetchError;

/// Rows whose scheduling instructions carry this sentinel get the
/// instructions replaced with their county's reservations URL.
const COUNTY_SCHEDULING_SENTINEL: &str = "Uses county scheduling system";

impl TableCache {
    pub fn counties(&self) -> Result<Arc<Table>, FetchError> {
        self.get_table("Counties")
    }

    pub fn providers(&self) -> Result<Arc<Table>, FetchError> {
        self.get_table("Provider networks")
    }

    /// The locations table, cleaned for publication: rows without an
    /// address or marked soft-deleted are dropped, county scheduling
    /// pointers are resolved against the counties table, and report
    /// notes are redacted unless the latest report was a yes.
    pub fn locations(&self) -> Result<Arc<Table>, FetchError> {
        let counties = self.counties()?;
        let mut reservation_urls = HashMap::new();
        for row in counties.iter() {
            if let (Some(Value::String(name)), Some(Value::String(url))) = (
                row.get("County"),
                row.get("County vaccination reservations URL"),
            ) {
                reservation_urls.insert(name.clone(), url.clone());
            }
        }

        let spec = TransformSpec::new()
            .with_munger(require_field("Address"))
            .with_munger(resolve_county_scheduling(reservation_urls))
            .with_munger(hide_notes)
            .with_munger(drop_soft_deleted);
        self.get_table_with("Locations", &spec)
    }
}

/// Drop rows missing a required field.
fn require_field(field: &'static str) -> impl Fn(Record) -> anyhow::Result<Option<Record>> {
    move |row| Ok(row.contains_key(field).then_some(row))
}

/// Replace the county-scheduling sentinel with the row's county
/// reservations URL. Unknown or missing counties leave the sentinel
/// in place rather than guessing.
fn resolve_county_scheduling(
    reservation_urls: HashMap<String, String>,
) -> impl Fn(Record) -> anyhow::Result<Option<Record>> {
    move |mut row| {
        let uses_county = matches!(
            row.get("Appointment scheduling instructions"),
            Some(Value::String(s)) if s == COUNTY_SCHEDULING_SENTINEL
        );
        if uses_county {
            if let Some(Value::String(county)) = row.get("County") {
                if let Some(url) = reservation_urls.get(county) {
                    row.insert(
                        "Appointment scheduling instructions".to_string(),
                        Value::String(url.clone()),
                    );
                }
            }
        }
        Ok(Some(row))
    }
}

/// Blank the latest report notes unless the latest report was a yes.
/// The notes field may contain details volunteers only intended for a
/// confirmed-yes location, so a missing or malformed flag also redacts.
fn hide_notes(mut row: Record) -> anyhow::Result<Option<Record>> {
    let is_yes = matches!(row.get("Latest report yes?"), Some(Value::Number(n)) if *n == 1.0);
    if !is_yes {
        row.insert(
            "Latest report notes".to_string(),
            Value::String(String::new()),
        );
    }
    Ok(Some(row))
}

/// Drop rows flagged soft-deleted upstream.
fn drop_soft_deleted(row: Record) -> anyhow::Result<Option<Record>> {
    let deleted = matches!(row.get("is_soft_deleted"), Some(Value::Bool(true)));
    Ok((!deleted).then_some(row))
}
