//! Provider networks endpoint, v1-only so far.

use anyhow::Context;
use tablecast_core::{Table, TransformSpec, transform};
use tablecast_source::TableCache;

const V1_FIELDS: &[&str] = &[
    "Appointments URL",
    "Last Updated",
    "Phase",
    "Provider",
    "Public Notes",
    "Provider network type",
    "Vaccine info URL",
    "Vaccine locations URL",
];

pub fn v1(tables: &TableCache) -> anyhow::Result<Table> {
    let raw = tables.providers().context("failed to fetch Providers table")?;
    let spec = TransformSpec::new().with_field_slice(V1_FIELDS);
    transform::apply(raw.as_ref().clone(), &spec)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tablecast_core::Deadline;
    use tablecast_source::{Fetch, FetchError};

    use super::*;

    struct StubFetcher;

    impl Fetch for StubFetcher {
        fn download(&self, _deadline: Deadline, table: &str) -> Result<Table, FetchError> {
            assert_eq!(table, "Provider networks");
            Ok(serde_json::from_str(
                r#"[{"id":"p1","Provider":"MediCorp","Phase":"1b",
                     "upstream_row_id":"rec123","Internal contact":"x@gmail.com"}]"#,
            )
            .unwrap())
        }
    }

    #[test]
    fn v1_keeps_only_public_fields() {
        let cache = TableCache::new(Box::new(StubFetcher), Deadline::after(Duration::from_secs(30)));
        let table = v1(&cache).unwrap();
        let row = &table[0];
        assert!(row.contains_key("id"));
        assert!(row.contains_key("Provider"));
        assert!(!row.contains_key("upstream_row_id"));
        assert!(!row.contains_key("Internal contact"));
    }
}
