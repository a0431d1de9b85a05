//! Upstream table access: the paginated HTTP fetcher and the
//! just-in-time, once-per-cycle table cache, plus the domain accessors
//! layered on top of it.

pub mod cache;
pub mod client;
pub mod error;
pub mod secrets;
pub mod tables;

// Re-exports for convenience
pub use cache::{Fetch, TableCache};
pub use client::{UpstreamClient, UpstreamConfig, table_from_file};
pub use error::FetchError;
pub use secrets::upstream_api_key;
