//! Publish-cycle metrics.

use std::time::Duration;

pub trait Metrics: Send + Sync {
    fn incr(&self, name: &str);
    fn timing(&self, name: &str, elapsed: Duration);
}

/// Default sink: counters and timings go to the debug log. A real
/// exporter can replace this without touching the orchestrator.
pub struct LogMetrics;

impl Metrics for LogMetrics {
    fn incr(&self, name: &str) {
        log::debug!("metric {name} +1");
    }

    fn timing(&self, name: &str, elapsed: Duration) {
        log::debug!("metric {name} {}ms", elapsed.as_millis());
    }
}
