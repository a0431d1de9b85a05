//! Fetch error taxonomy for upstream table downloads.

/// Error from fetching (and optionally transforming) one table.
///
/// Cloneable by design: the table cache stores the outcome of a failed
/// fetch for the rest of the publish cycle and hands the same error to
/// every consumer of that table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream returned a non-2xx status (429 is retried internally
    /// and never surfaces here).
    Status { table: String, status: u16 },
    /// Connection-level failure or request timeout.
    Transport { table: String, detail: String },
    /// Response body was not decodable as a page of records.
    Decode { table: String, detail: String },
    /// The publish cycle's deadline expired before the fetch finished.
    DeadlineExceeded { table: String },
    /// The table's registered transform failed after a successful fetch.
    Transform { table: String, detail: String },
}

impl FetchError {
    /// The table this error is about.
    pub fn table(&self) -> &str {
        match self {
            Self::Status { table, .. }
            | Self::Transport { table, .. }
            | Self::Decode { table, .. }
            | Self::DeadlineExceeded { table }
            | Self::Transform { table, .. } => table,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { table, status } => {
                write!(f, "[{table}] upstream returned status {status}")
            }
            Self::Transport { table, detail } => write!(f, "[{table}] transport error: {detail}"),
            Self::Decode { table, detail } => {
                write!(f, "[{table}] undecodable response body: {detail}")
            }
            Self::DeadlineExceeded { table } => {
                write!(f, "[{table}] publish deadline exceeded during fetch")
            }
            Self::Transform { table, detail } => write!(f, "[{table}] transform failed: {detail}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_table_name() {
        let err = FetchError::Status {
            table: "Counties".to_string(),
            status: 500,
        };
        assert_eq!(format!("{err}"), "[Counties] upstream returned status 500");
        assert_eq!(err.table(), "Counties");
    }

    #[test]
    fn clones_compare_equal() {
        let err = FetchError::Transport {
            table: "Locations".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(err.clone(), err);
    }
}
