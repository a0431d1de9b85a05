//! Fetch subcommand - download one raw table for inspection.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use tablecast_core::Deadline;
use tablecast_source::{UpstreamClient, UpstreamConfig, upstream_api_key};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Table name, e.g. "Locations"
    pub table: String,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}

pub fn run(args: FetchArgs) -> Result<()> {
    let api_key = upstream_api_key()?;
    let client = UpstreamClient::new(UpstreamConfig::from_env(), api_key);
    let deadline = Deadline::after(Duration::from_secs(args.timeout_secs));

    let table = client.download(deadline, &args.table)?;
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}
