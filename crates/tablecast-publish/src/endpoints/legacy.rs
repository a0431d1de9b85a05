//! The pre-versioning output format.
//!
//! These field lists are load-bearing: the public map and at least one
//! press consumer read them directly, so nothing here may be removed or
//! renamed. Shape changes go in a new version instead.

use anyhow::Context;
use tablecast_core::{Table, TransformSpec, transform};
use tablecast_source::TableCache;

const LOCATION_FIELDS: &[&str] = &[
    "Address",
    "Affiliation",
    "Appointment scheduling instructions",
    "Availability Info",
    "County",
    "Has Report",
    "Latest report",
    "Latest report notes",
    "Latest report yes?",
    "Latitude",
    "Location Type",
    "Longitude",
    "Name",
    "vaccinefinder_location_id",
    "vaccinespotter_location_id",
    "google_places_id",
];

const COUNTY_FIELDS: &[&str] = &[
    "County",
    "County vaccination reservations URL",
    "Facebook Page",
    "Notes",
    "Official volunteering opportunities",
    "Total reports",
    "Twitter Page",
    "Vaccine info URL",
    "Vaccine locations URL",
    "Yeses",
    "age_floor_without_restrictions",
];

pub fn locations(tables: &TableCache) -> anyhow::Result<Table> {
    let raw = tables.locations().context("failed to fetch Locations table")?;
    let spec = TransformSpec::new().with_field_slice(LOCATION_FIELDS);
    transform::apply(raw.as_ref().clone(), &spec)
}

pub fn counties(tables: &TableCache) -> anyhow::Result<Table> {
    let raw = tables.counties().context("failed to fetch Counties table")?;
    let spec = TransformSpec::new().with_field_slice(COUNTY_FIELDS);
    transform::apply(raw.as_ref().clone(), &spec)
}
