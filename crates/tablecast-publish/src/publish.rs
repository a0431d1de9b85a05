//! The publish orchestrator: one cycle fetches, transforms, wraps and
//! stores every registered endpoint, with per-endpoint failure
//! isolation.

use std::time::{Duration, Instant};

use anyhow::Context;
use tablecast_core::Deadline;
use tablecast_source::{Fetch, TableCache};

use crate::deploys::DeployConfig;
use crate::endpoints::{Endpoint, all_endpoints};
use crate::metadata;
use crate::metrics::Metrics;
use crate::storage::{self, Storage};

/// Outcome of one endpoint's publish job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResult {
    pub endpoint: String,
    pub ok: bool,
    pub error: Option<String>,
}

/// Outcome of a whole publish cycle.
#[derive(Debug)]
pub struct PublishSummary {
    /// True only if every endpoint published.
    pub ok: bool,
    pub results: Vec<EndpointResult>,
    pub elapsed: Duration,
}

pub struct Publisher {
    store: Box<dyn Storage>,
    metrics: Box<dyn Metrics>,
    config: DeployConfig,
    endpoints: Vec<Endpoint>,
}

impl Publisher {
    pub fn new(store: Box<dyn Storage>, metrics: Box<dyn Metrics>, config: DeployConfig) -> Self {
        Self::with_endpoints(store, metrics, config, all_endpoints())
    }

    pub fn with_endpoints(
        store: Box<dyn Storage>,
        metrics: Box<dyn Metrics>,
        config: DeployConfig,
        endpoints: Vec<Endpoint>,
    ) -> Self {
        Self {
            store,
            metrics,
            config,
            endpoints,
        }
    }

    /// Run one publish cycle: a fresh table cache shared by all
    /// endpoint jobs, one worker thread per endpoint. A failing job
    /// never aborts its siblings; the summary is the AND of every
    /// job's outcome.
    pub fn publish_all(&self, fetcher: Box<dyn Fetch>, deadline: Deadline) -> PublishSummary {
        let started = Instant::now();
        let tables = TableCache::new(fetcher, deadline);

        let results: Vec<EndpointResult> = std::thread::scope(|s| {
            let tables = &tables;
            let handles: Vec<_> = self
                .endpoints
                .iter()
                .map(|ep| s.spawn(move || self.publish_endpoint(tables, ep)))
                .collect();
            handles
                .into_iter()
                .zip(&self.endpoints)
                .map(|(handle, ep)| {
                    handle.join().unwrap_or_else(|_| EndpointResult {
                        endpoint: ep.to_string(),
                        ok: false,
                        error: Some("publish job panicked".to_string()),
                    })
                })
                .collect()
        });

        let ok = results.iter().all(|r| r.ok);
        let elapsed = started.elapsed();
        self.metrics.timing("publish.total_latency", elapsed);
        log::info!(
            "publish cycle finished: {}/{} endpoints ok in {}ms",
            results.iter().filter(|r| r.ok).count(),
            results.len(),
            elapsed.as_millis()
        );
        PublishSummary {
            ok,
            results,
            elapsed,
        }
    }

    fn publish_endpoint(&self, tables: &TableCache, ep: &Endpoint) -> EndpointResult {
        let started = Instant::now();
        let outcome = self.publish_endpoint_inner(tables, ep);
        let result = match outcome {
            Ok(()) => {
                self.metrics.incr("publish.success");
                log::info!("[{ep}] successfully published");
                EndpointResult {
                    endpoint: ep.to_string(),
                    ok: true,
                    error: None,
                }
            }
            Err(e) => {
                self.metrics.incr("publish.failure");
                log::error!("[{ep}] failed to export and publish: {e:#}");
                EndpointResult {
                    endpoint: ep.to_string(),
                    ok: false,
                    error: Some(format!("{e:#}")),
                }
            }
        };
        self.metrics
            .timing(&format!("publish.latency.{ep}"), started.elapsed());
        result
    }

    fn publish_endpoint_inner(&self, tables: &TableCache, ep: &Endpoint) -> anyhow::Result<()> {
        log::debug!("[{ep}] transforming data");
        let content = (ep.transform)(tables)?;
        let payload = metadata::wrap(ep.version, content);
        let bytes = storage::serialize(&payload)?;

        let destination = format!("{}/{}.json", self.config.upload_url(ep.version), ep.resource);
        log::debug!("[{ep}] publishing to {destination}");
        self.store
            .store(tables.deadline(), &destination, &bytes)
            .with_context(|| format!("failed to store {destination}"))
    }
}
