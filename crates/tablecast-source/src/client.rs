//! Paginated upstream table client.
//!
//! Uses async reqwest internally through a shared tokio runtime, but
//! presents a sync interface so callers (per-endpoint worker threads)
//! can hold the table cache's locks across a fetch.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tablecast_core::{Deadline, Record, Table, Value};

use crate::cache::Fetch;
use crate::error::FetchError;

/// Upstream serves at most this many records per page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Pause between page requests, and after a rate-limit response.
/// The upstream allows 5 requests per second; 200ms keeps one table
/// fetch safely under that as a throughput cap, not an error-recovery
/// measure.
const PAGE_PAUSE: Duration = Duration::from_millis(200);

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

const DEFAULT_BASE_URL: &str = "https://api.gridbase.io/v0";
const DEFAULT_BASE: &str = "appRZp2fuomqV9sDT";

/// Where the upstream lives: API root plus the workspace/base holding
/// the directory's tables.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub base: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base: DEFAULT_BASE.to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Config from `UPSTREAM_BASE_URL` / `UPSTREAM_BASE`, falling back
    /// to the production defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("UPSTREAM_BASE_URL").unwrap_or(defaults.base_url),
            base: std::env::var("UPSTREAM_BASE").unwrap_or(defaults.base),
        }
    }
}

/// One row as returned by the upstream API.
#[derive(Debug, Deserialize)]
struct PageRow {
    id: String,
    #[serde(default)]
    fields: Record,
}

/// One page of the upstream response: records plus an opaque cursor
/// for the next page (absent or empty on the final page).
#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    offset: Option<String>,
    #[serde(default)]
    records: Vec<PageRow>,
}

/// Downloads whole tables from the upstream API, one page at a time.
pub struct UpstreamClient {
    config: UpstreamConfig,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig, api_key: String) -> Self {
        Self { config, api_key }
    }

    /// Download a full table. Pages are strictly sequential (the next
    /// cursor comes from the previous page); a rate-limit response
    /// pauses and retries the same page; any other failure aborts the
    /// whole fetch with no partial table.
    pub fn download(&self, deadline: Deadline, table: &str) -> Result<Table, FetchError> {
        let mut rows = Table::new();
        let mut offset = String::new();
        loop {
            let (page_rows, next) = self.fetch_page(deadline, table, &offset)?;
            rows.extend(page_rows);
            match next {
                Some(next_offset) => {
                    offset = next_offset;
                    std::thread::sleep(PAGE_PAUSE);
                }
                None => break,
            }
        }
        log::info!("[{table}] downloaded {} records", rows.len());
        Ok(rows)
    }

    /// Fetch one page, retrying in place on rate-limit responses.
    fn fetch_page(
        &self,
        deadline: Deadline,
        table: &str,
        offset: &str,
    ) -> Result<(Table, Option<String>), FetchError> {
        let url = format!("{}/{}/{}", self.config.base_url, self.config.base, table);
        loop {
            let Some(remaining) = deadline.remaining() else {
                return Err(FetchError::DeadlineExceeded {
                    table: table.to_string(),
                });
            };

            let result = SHARED_RUNTIME.handle().block_on(async {
                let mut req = http_client()
                    .get(&url)
                    .bearer_auth(&self.api_key)
                    .timeout(remaining);
                if !offset.is_empty() {
                    req = req.query(&[("offset", offset)]);
                }
                let resp = req.send().await?;
                let status = resp.status().as_u16();
                let body = if (200..300).contains(&status) {
                    resp.bytes().await?.to_vec()
                } else {
                    Vec::new()
                };
                Ok::<_, reqwest::Error>((status, body))
            });

            let (status, body) = result.map_err(|e| FetchError::Transport {
                table: table.to_string(),
                detail: e.to_string(),
            })?;

            if status == 429 {
                log::debug!("[{table}] rate limited, pausing before retrying page");
                std::thread::sleep(PAGE_PAUSE);
                continue;
            }
            if !(200..300).contains(&status) {
                return Err(FetchError::Status {
                    table: table.to_string(),
                    status,
                });
            }

            let page: PageResponse =
                serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
                    table: table.to_string(),
                    detail: e.to_string(),
                })?;

            let mut rows = Table::with_capacity(page.records.len().min(MAX_PAGE_SIZE));
            for row in page.records {
                let mut fields = row.fields;
                // The synthetic id from the upstream row identifier wins
                // over any upstream field literally named "id".
                fields.insert("id".to_string(), Value::String(row.id));
                rows.push(fields);
            }
            let next = page.offset.filter(|o| !o.is_empty());
            return Ok((rows, next));
        }
    }
}

impl Fetch for UpstreamClient {
    fn download(&self, deadline: Deadline, table: &str) -> Result<Table, FetchError> {
        UpstreamClient::download(self, deadline, table)
    }
}

/// Load a table snapshot from a local JSON file (offline runs, tests).
pub fn table_from_file(path: &std::path::Path) -> anyhow::Result<Table> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("couldn't read file {}", path.display()))?;
    let table: Table = serde_json::from_str(&content)
        .with_context(|| format!("invalid table JSON in {}", path.display()))?;
    log::debug!("read {} records from {}", table.len(), path.display());
    Ok(table)
}
