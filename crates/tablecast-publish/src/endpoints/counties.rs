//! Versioned counties endpoints.

use anyhow::Context;
use tablecast_core::{Table, TransformSpec, transform};
use tablecast_source::TableCache;

use super::legacy;

/// v1 is the legacy shape under a versioned path.
pub fn v1(tables: &TableCache) -> anyhow::Result<Table> {
    legacy::counties(tables)
}

const V2_FIELDS: &[(&str, &str)] = &[
    ("County", "name"),
    ("County vaccination reservations URL", "reservationsURL"),
    ("Facebook Page", "facebookURL"),
    ("Notes", "notes"),
    ("Official volunteering opportunities", "officialVolunteering"),
    ("Total reports", "totalReports"),
    ("Twitter Page", "twitterURL"),
    ("Vaccine info URL", "vaccineInfoURL"),
    ("Vaccine locations URL", "vaccineLocationsURL"),
    ("Yeses", "yesses"),
];

pub fn v2(tables: &TableCache) -> anyhow::Result<Table> {
    let raw = tables.counties().context("failed to fetch Counties table")?;
    let spec = TransformSpec::new().with_field_map(V2_FIELDS.iter().copied());
    transform::apply(raw.as_ref().clone(), &spec)
}
