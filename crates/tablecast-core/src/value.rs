//! Table data model: dynamically-typed field values, records, tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single field value as it appears in an upstream row.
///
/// This is a deliberately closed union: upstream fields are strings,
/// numbers, booleans, lists of strings, or null. Anything else in a
/// response body is treated as malformed and fails the fetch, rather
/// than being smuggled through as an opaque blob.
///
/// Variant order matters: serde tries untagged variants top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// One table row: field name to value. Key order is irrelevant; a
/// BTreeMap keeps serialized output deterministic.
///
/// The synthetic `id` field is always present on records that came
/// through the fetcher; it is sourced from the upstream row identifier
/// and takes precedence over any upstream field literally named "id".
pub type Record = BTreeMap<String, Value>;

/// A full snapshot of one named upstream resource, in upstream order.
pub type Table = Vec<Record>;
