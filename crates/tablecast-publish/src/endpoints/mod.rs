//! The registry of published endpoints.
//!
//! An endpoint is one (version, resource) pair with the transform that
//! produces its content. Adding fields to an endpoint within a version
//! is fine; removing or renaming a field, or changing its semantics,
//! means a new version with new endpoints. Existing versions never
//! change shape once consumers exist.

pub mod counties;
pub mod legacy;
pub mod locations;
pub mod providers;

use std::fmt;

use tablecast_core::Table;
use tablecast_source::TableCache;

use crate::deploys::{DeployConfig, Version};

pub type TransformFn = fn(&TableCache) -> anyhow::Result<Table>;

pub struct Endpoint {
    pub version: Version,
    pub resource: &'static str,
    pub transform: TransformFn,
}

impl Endpoint {
    /// The public https:// URL this endpoint is served from.
    pub fn url(&self, config: &DeployConfig) -> String {
        format!("{}/{}.json", config.download_url(self.version), self.resource)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.version, self.resource)
    }
}

/// Every endpoint currently published, across all versions.
pub fn all_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            version: Version::Legacy,
            resource: "Locations",
            transform: legacy::locations,
        },
        Endpoint {
            version: Version::Legacy,
            resource: "Counties",
            transform: legacy::counties,
        },
        Endpoint {
            version: Version::V1,
            resource: "locations",
            transform: locations::v1,
        },
        Endpoint {
            version: Version::V1,
            resource: "counties",
            transform: counties::v1,
        },
        Endpoint {
            version: Version::V1,
            resource: "providers",
            transform: providers::v1,
        },
        Endpoint {
            version: Version::V2,
            resource: "locations",
            transform: locations::v2,
        },
        Endpoint {
            version: Version::V2,
            resource: "counties",
            transform: counties::v2,
        },
    ]
}
