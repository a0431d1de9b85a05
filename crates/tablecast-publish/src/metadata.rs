//! Usage/contact envelopes around published content.
//!
//! Legacy consumers predate the envelope and keep getting the bare
//! array; every later version wraps the table so the usage notice
//! travels with the data.

use serde::Serialize;
use tablecast_core::Table;

use crate::deploys::Version;

const PARTNERS_EMAIL: &str = "api@tablecast.org";
const DOCUMENTATION_URL: &str = "https://docs.tablecast.org";
const NOTICE_TEXT: &str = "Please contact the directory team and let us know if you plan \
to rely on or publish this data. This data is provided with best-effort accuracy. If you \
are displaying this data, we expect you to display it responsibly. Please do not display \
it in a way that is easy to misread.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    #[serde(rename = "partnersEmail")]
    pub partners_email: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub contact: Contact,
    pub documentation: &'static str,
    pub notice: &'static str,
}

impl Usage {
    pub fn default_usage() -> Self {
        Self {
            contact: Contact {
                partners_email: PARTNERS_EMAIL,
            },
            documentation: DOCUMENTATION_URL,
            notice: NOTICE_TEXT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub usage: Usage,
}

/// A publishable payload: table content in the envelope its version
/// promises.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Bare(Table),
    V1 { usage: Usage, content: Table },
    V2 { metadata: Metadata, content: Table },
}

/// Wrap table content for the given version.
pub fn wrap(version: Version, content: Table) -> Payload {
    match version {
        Version::Legacy => Payload::Bare(content),
        Version::V1 => Payload::V1 {
            usage: Usage::default_usage(),
            content,
        },
        Version::V2 => Payload::V2 {
            metadata: Metadata {
                usage: Usage::default_usage(),
            },
            content,
        },
    }
}
