//! Deploy targets and their buckets.
//!
//! Legacy output shares one bucket across deploys with a per-deploy
//! path; versioned output gets a per-deploy bucket, optionally fronted
//! by a CDN hostname.

use std::fmt;

/// Published API versions. A version's output format never changes
/// once consumers exist; breaking changes add a new variant instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Predates the CDN domain and the versioned bucket layout;
    /// emitted bare with no version path segment.
    Legacy,
    V1,
    V2,
}

impl Version {
    /// The version's URL path segment; legacy has none.
    pub fn segment(self) -> Option<&'static str> {
        match self {
            Self::Legacy => None,
            Self::V1 => Some("v1"),
            Self::V2 => Some("v2"),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deploy {
    Testing,
    Staging,
    Production,
}

impl Deploy {
    /// The deploy from the `DEPLOY` env var; unset or empty defaults
    /// to testing, anything unrecognized is a configuration error.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var("DEPLOY").as_deref() {
            Err(_) | Ok("") | Ok("testing") => Ok(Self::Testing),
            Ok("staging") => Ok(Self::Staging),
            Ok("prod") => Ok(Self::Production),
            Ok(other) => anyhow::bail!("unknown deploy environment: {other}"),
        }
    }

    /// The deploy's bucket layout. The testing deploy points both
    /// buckets at the caller's own bucket, named by `TESTING_BUCKET`.
    pub fn config(self) -> anyhow::Result<DeployConfig> {
        match self {
            Self::Testing => {
                let bucket = std::env::var("TESTING_BUCKET").ok().filter(|b| !b.is_empty());
                let Some(bucket) = bucket else {
                    anyhow::bail!("set TESTING_BUCKET to the name of your bucket (see README.md)");
                };
                Ok(DeployConfig {
                    legacy: Bucket::new(&bucket, "legacy", None),
                    api: Bucket::new(&bucket, "api", None),
                })
            }
            Self::Staging => Ok(DeployConfig {
                legacy: Bucket::new("tablecast-sitedata", "table-sync-staging", None),
                api: Bucket::new("tablecast-api-staging", "", Some("staging-api.tablecast.org")),
            }),
            Self::Production => Ok(DeployConfig {
                legacy: Bucket::new("tablecast-sitedata", "table-sync", None),
                api: Bucket::new("tablecast-api", "", Some("api.tablecast.org")),
            }),
        }
    }
}

/// One GCS bucket, with an optional path prefix and an optional CDN
/// hostname that fronts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub path: String,
    pub hosted_at: Option<String>,
}

impl Bucket {
    fn new(name: &str, path: &str, hosted_at: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            hosted_at: hosted_at.map(str::to_string),
        }
    }

    fn suffix(&self) -> String {
        if self.path.is_empty() {
            String::new()
        } else {
            format!("/{}", self.path)
        }
    }

    fn upload_url(&self) -> String {
        format!("gs://{}{}", self.name, self.suffix())
    }

    fn download_url(&self) -> String {
        match &self.hosted_at {
            Some(host) => format!("https://{host}{}", self.suffix()),
            None => format!("https://storage.googleapis.com/{}{}", self.name, self.suffix()),
        }
    }
}

/// Where one deploy's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub legacy: Bucket,
    pub api: Bucket,
}

impl DeployConfig {
    /// The gs:// URL uploads for `version` go to; never ends in `/`.
    pub fn upload_url(&self, version: Version) -> String {
        match version.segment() {
            None => self.legacy.upload_url(),
            Some(segment) => format!("{}/{segment}", self.api.upload_url()),
        }
    }

    /// The https:// URL the published files can be read from; never
    /// ends in `/`.
    pub fn download_url(&self, version: Version) -> String {
        match version.segment() {
            None => self.legacy.download_url(),
            Some(segment) => format!("{}/{segment}", self.api.download_url()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_urls() {
        let config = Deploy::Production.config().unwrap();
        assert_eq!(
            config.upload_url(Version::Legacy),
            "gs://tablecast-sitedata/table-sync"
        );
        assert_eq!(config.upload_url(Version::V1), "gs://tablecast-api/v1");
        assert_eq!(
            config.download_url(Version::Legacy),
            "https://storage.googleapis.com/tablecast-sitedata/table-sync"
        );
        assert_eq!(
            config.download_url(Version::V2),
            "https://api.tablecast.org/v2"
        );
    }

    #[test]
    fn staging_api_uses_cdn_host() {
        let config = Deploy::Staging.config().unwrap();
        assert_eq!(
            config.download_url(Version::V1),
            "https://staging-api.tablecast.org/v1"
        );
    }

    #[test]
    fn testing_requires_bucket() {
        // Env-var state is process-global; exercise both arms in one
        // test to avoid ordering hazards between parallel tests.
        std::env::remove_var("TESTING_BUCKET");
        assert!(Deploy::Testing.config().is_err());

        std::env::set_var("TESTING_BUCKET", "my-sandbox");
        let config = Deploy::Testing.config().unwrap();
        assert_eq!(config.upload_url(Version::Legacy), "gs://my-sandbox/legacy");
        assert_eq!(config.upload_url(Version::V1), "gs://my-sandbox/api/v1");
        std::env::remove_var("TESTING_BUCKET");
    }

    #[test]
    fn deploy_from_env() {
        // As above: one test, sequential arms.
        std::env::remove_var("DEPLOY");
        assert_eq!(Deploy::from_env().unwrap(), Deploy::Testing);
        std::env::set_var("DEPLOY", "prod");
        assert_eq!(Deploy::from_env().unwrap(), Deploy::Production);
        std::env::set_var("DEPLOY", "staging");
        assert_eq!(Deploy::from_env().unwrap(), Deploy::Staging);
        std::env::set_var("DEPLOY", "bogus");
        assert!(Deploy::from_env().is_err());
        std::env::remove_var("DEPLOY");
    }
}
