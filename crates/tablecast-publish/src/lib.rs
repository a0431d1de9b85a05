//! Endpoint registry, metadata envelopes, deploy targets, storage
//! backends, and the publish orchestrator.

pub mod deploys;
pub mod endpoints;
pub mod metadata;
pub mod metrics;
pub mod publish;
pub mod storage;

// Re-exports for convenience
pub use deploys::{Deploy, DeployConfig, Version};
pub use endpoints::{Endpoint, all_endpoints};
pub use metrics::{LogMetrics, Metrics};
pub use publish::{EndpointResult, PublishSummary, Publisher};
pub use storage::{DebugStorage, GcsStorage, LocalStorage, Storage};
