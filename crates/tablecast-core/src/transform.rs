//! Declarative row transform engine: mungers plus a field allow/rename map.

use std::collections::HashMap;

use crate::value::{Record, Table};

/// A munger takes ownership of a row and returns it (possibly
/// modified), `None` to drop the row, or an error to abort the whole
/// transform. Taking the record by value means a munger never has to
/// reason about whether an earlier munger already rewrote the row it
/// shares with someone else.
pub type Munger = Box<dyn Fn(Record) -> anyhow::Result<Option<Record>> + Send + Sync>;

/// An ordered list of mungers plus an optional field map (old name to
/// new name). With an empty field map every field passes through
/// unchanged; with a non-empty map only mapped fields survive, renamed
/// to the map's values. The `id` field is always retained, and a map
/// holding nothing but that implicit entry still counts as empty.
#[derive(Default)]
pub struct TransformSpec {
    fields: HashMap<String, String>,
    mungers: Vec<Munger>,
}

impl TransformSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a munger; mungers run in registration order.
    pub fn with_munger(
        mut self,
        m: impl Fn(Record) -> anyhow::Result<Option<Record>> + Send + Sync + 'static,
    ) -> Self {
        self.mungers.push(Box::new(m));
        self
    }

    /// Allow-list fields and rename them. Map keys are old names,
    /// values are output names. "id" is always retained.
    pub fn with_field_map<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in fields {
            self.fields.insert(k.into(), v.into());
        }
        self.fields.insert("id".to_string(), "id".to_string());
        self
    }

    /// Allow-list fields, keeping their names unchanged.
    pub fn with_field_slice<S: Into<String> + Clone>(self, allowed: &[S]) -> Self {
        self.with_field_map(allowed.iter().map(|k| (k.clone().into(), k.clone().into())))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.mungers.is_empty()
    }
}

/// Apply a transform spec to a table, producing a new table.
///
/// Per input record, in input order: run each munger in registration
/// order (an error aborts the whole transform; `None` drops the row and
/// skips its remaining mungers), then apply the field map. Dropped rows
/// leave no gap in the output.
pub fn apply(table: Table, spec: &TransformSpec) -> anyhow::Result<Table> {
    let mut out = Table::with_capacity(table.len());

    'rows: for (i, mut row) in table.into_iter().enumerate() {
        for munger in &spec.mungers {
            match munger(row).map_err(|e| e.context(format!("error munging row {i}")))? {
                Some(munged) => row = munged,
                None => continue 'rows,
            }
        }

        // A map holding only the implicit "id" entry filters nothing.
        if spec.fields.len() <= 1 {
            out.push(row);
            continue;
        }

        let filtered = row
            .into_iter()
            .filter_map(|(k, v)| spec.fields.get(&k).map(|nk| (nk.clone(), v)))
            .collect();
        out.push(filtered);
    }

    Ok(out)
}

/// Fail if any expected field appears in no record across the whole
/// table. Catches silently-broken renames; meant for tests and
/// pre-publish sanity checks, not per-row enforcement.
pub fn check_all_fields_present(table: &Table, expected: &[&str]) -> anyhow::Result<()> {
    for field in expected {
        if !table.iter().any(|row| row.contains_key(*field)) {
            anyhow::bail!("missing field: {field} appears in no record");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_spec_passes_through() {
        let table = vec![record(&[("id", "1".into()), ("Name", "A".into())])];
        let got = apply(table.clone(), &TransformSpec::new()).unwrap();
        assert_eq!(got, table);
    }

    #[test]
    fn empty_field_slice_passes_through() {
        let table = vec![record(&[("id", "1".into()), ("Name", "A".into())])];
        let spec = TransformSpec::new().with_field_slice::<&str>(&[]);
        let got = apply(table.clone(), &spec).unwrap();
        assert_eq!(got, table, "an id-only map must not strip fields");
    }

    #[test]
    fn field_map_filters_and_keeps_id() {
        let table = vec![record(&[
            ("id", "1".into()),
            ("Name", "A".into()),
            ("Secret", "x".into()),
        ])];
        let spec = TransformSpec::new().with_field_map([("Name", "Name")]);
        let got = apply(table, &spec).unwrap();
        assert_eq!(
            got,
            vec![record(&[("id", "1".into()), ("Name", "A".into())])]
        );
    }

    #[test]
    fn field_map_renames() {
        let table = vec![record(&[
            ("id", "1".into()),
            ("County", "Alameda".into()),
            ("Yeses", Value::Number(4.0)),
        ])];
        let spec = TransformSpec::new().with_field_map([("County", "name"), ("Yeses", "yesses")]);
        let got = apply(table, &spec).unwrap();
        assert_eq!(
            got,
            vec![record(&[
                ("id", "1".into()),
                ("name", "Alameda".into()),
                ("yesses", Value::Number(4.0)),
            ])]
        );
    }

    #[test]
    fn output_never_contains_unmapped_key() {
        let table = vec![
            record(&[("id", "1".into()), ("Keep", "a".into()), ("Drop", "b".into())]),
            record(&[("id", "2".into()), ("Keep", "c".into()), ("Other", "d".into())]),
        ];
        let spec = TransformSpec::new().with_field_slice(&["Keep"]);
        let got = apply(table, &spec).unwrap();
        for row in &got {
            for key in row.keys() {
                assert!(key == "id" || key == "Keep", "unexpected key {key}");
            }
        }
    }

    #[test]
    fn munger_drops_only_its_row_preserving_order() {
        let table = vec![
            record(&[("id", "1".into())]),
            record(&[("id", "2".into()), ("skip", Value::Bool(true))]),
            record(&[("id", "3".into())]),
        ];
        let spec = TransformSpec::new().with_munger(|row: Record| {
            if row.contains_key("skip") {
                Ok(None)
            } else {
                Ok(Some(row))
            }
        });
        let got = apply(table, &spec).unwrap();
        let ids: Vec<_> = got.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![Value::from("1"), Value::from("3")]);
    }

    #[test]
    fn mungers_run_in_registration_order() {
        let table = vec![record(&[("id", "1".into()), ("n", Value::Number(1.0))])];
        let spec = TransformSpec::new()
            .with_munger(|mut row: Record| {
                let n = row["n"].as_number().unwrap();
                row.insert("n".to_string(), Value::Number(n + 1.0));
                Ok(Some(row))
            })
            .with_munger(|mut row: Record| {
                let n = row["n"].as_number().unwrap();
                row.insert("n".to_string(), Value::Number(n * 10.0));
                Ok(Some(row))
            });
        let got = apply(table, &spec).unwrap();
        assert_eq!(got[0]["n"], Value::Number(20.0));
    }

    #[test]
    fn munger_error_aborts_with_row_context() {
        let table = vec![
            record(&[("id", "1".into())]),
            record(&[("id", "2".into())]),
        ];
        let spec = TransformSpec::new().with_munger(|row: Record| {
            if row["id"] == Value::from("2") {
                anyhow::bail!("boom")
            }
            Ok(Some(row))
        });
        let err = apply(table, &spec).unwrap_err();
        assert!(format!("{err:#}").contains("error munging row 1"));
    }

    #[test]
    fn dropped_row_skips_remaining_mungers() {
        let table = vec![record(&[("id", "1".into())])];
        let spec = TransformSpec::new()
            .with_munger(|_row: Record| Ok(None))
            .with_munger(|_row: Record| anyhow::bail!("must not run"));
        let got = apply(table, &spec).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn check_all_fields_present_ok() {
        let table = vec![
            record(&[("id", "1".into()), ("Name", "A".into())]),
            record(&[("id", "2".into()), ("Address", "B".into())]),
        ];
        assert!(check_all_fields_present(&table, &["Name", "Address"]).is_ok());
    }

    #[test]
    fn check_all_fields_present_missing() {
        let table = vec![record(&[("id", "1".into())])];
        let err = check_all_fields_present(&table, &["Name"]).unwrap_err();
        assert!(err.to_string().contains("missing field: Name"));
    }
}
