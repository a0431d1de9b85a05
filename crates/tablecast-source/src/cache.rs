//! Just-in-time table cache: at most one fetch per table per cache
//! lifetime, shared by every concurrent consumer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tablecast_core::{Deadline, Table, TransformSpec, transform};

use crate::error::FetchError;

/// Downloads one named table in full. The seam that lets tests stub
/// the network out from under the cache.
pub trait Fetch: Send + Sync {
    fn download(&self, deadline: Deadline, table: &str) -> Result<Table, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    fn download(&self, deadline: Deadline, table: &str) -> Result<Table, FetchError> {
        (**self).download(deadline, table)
    }
}

type Outcome = Result<Arc<Table>, FetchError>;

/// Per-cycle table cache.
///
/// Not intended for long-term use: each table is fetched and cached
/// exactly once, errors included, and the whole cache is discarded at
/// the end of the publish cycle. A cached error is returned to every
/// later caller without retrying, even if the underlying condition has
/// cleared.
pub struct TableCache {
    fetcher: Box<dyn Fetch>,
    deadline: Deadline,
    // locks holds one mutex per table name, so concurrent requests for
    // the same table coalesce onto a single fetch. The registry mutex
    // is only ever held long enough to look up or create an entry,
    // never across a fetch.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    outcomes: Mutex<HashMap<String, Outcome>>,
}

impl TableCache {
    pub fn new(fetcher: Box<dyn Fetch>, deadline: Deadline) -> Self {
        Self {
            fetcher,
            deadline,
            locks: Mutex::new(HashMap::new()),
            outcomes: Mutex::new(HashMap::new()),
        }
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Thread-safe, just-in-time fetch of a table.
    pub fn get_table(&self, name: &str) -> Result<Arc<Table>, FetchError> {
        self.get_table_with(name, &TransformSpec::new())
    }

    /// Like [`TableCache::get_table`], applying `spec` to the raw table
    /// on first fetch. The cache is keyed by table name alone; the
    /// transformed result (or a transform failure) is what gets cached.
    pub fn get_table_with(&self, name: &str, spec: &TransformSpec) -> Result<Arc<Table>, FetchError> {
        // Hold the table's own lock for the whole check-fetch-populate
        // sequence, so concurrent requesters genuinely wait for one
        // fetch instead of each issuing their own.
        let table_lock = self.table_lock(name);
        let _guard = table_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(outcome) = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            log::debug!("[{name}] serving cached outcome");
            return outcome.clone();
        }

        let outcome = self.fetch_and_transform(name, spec);
        if let Err(e) = &outcome {
            log::warn!("caching fetch failure: {e}");
        }
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), outcome.clone());
        outcome
    }

    fn fetch_and_transform(&self, name: &str, spec: &TransformSpec) -> Outcome {
        let table = self.fetcher.download(self.deadline, name)?;
        if spec.is_empty() {
            return Ok(Arc::new(table));
        }
        match transform::apply(table, spec) {
            Ok(table) => Ok(Arc::new(table)),
            Err(e) => Err(FetchError::Transform {
                table: name.to_string(),
                detail: format!("{e:#}"),
            }),
        }
    }

    /// The lock for the named table, created on first use. The
    /// registry's own lock makes creation race-free.
    fn table_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(name.to_string()).or_default().clone()
    }
}
