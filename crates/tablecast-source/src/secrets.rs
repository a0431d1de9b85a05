//! Process-lifetime secret lookup.

use std::sync::OnceLock;

static UPSTREAM_API_KEY: OnceLock<Result<String, String>> = OnceLock::new();

/// The upstream API key from `UPSTREAM_API_KEY`.
///
/// Read once and cached for the life of the process, including the
/// failure case: an unset or empty variable keeps failing even if the
/// environment later changes.
pub fn upstream_api_key() -> anyhow::Result<String> {
    let cached = UPSTREAM_API_KEY.get_or_init(|| match std::env::var("UPSTREAM_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        Ok(_) => Err("UPSTREAM_API_KEY is set but empty".to_string()),
        Err(_) => Err("UPSTREAM_API_KEY is not set".to_string()),
    });
    cached.clone().map_err(|e| anyhow::anyhow!(e))
}
