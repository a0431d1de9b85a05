//! Publish subcommand - run one full publish cycle.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use tablecast_core::Deadline;
use tablecast_publish::deploys::Deploy;
use tablecast_publish::metrics::LogMetrics;
use tablecast_publish::publish::Publisher;
use tablecast_publish::storage::{DebugStorage, GcsStorage, LocalStorage, Storage};
use tablecast_source::{UpstreamClient, UpstreamConfig, upstream_api_key};

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Overall cycle timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Write under ./local/ instead of uploading (no credentials needed)
    #[arg(long, conflicts_with_all = ["noop", "bucket"])]
    pub local: bool,

    /// Log what would be written, write nothing
    #[arg(long, conflicts_with = "bucket")]
    pub noop: bool,

    /// Publish to this bucket (testing deploys)
    #[arg(long)]
    pub bucket: Option<String>,
}

pub fn run(args: PublishArgs) -> Result<()> {
    if let Some(bucket) = &args.bucket {
        std::env::set_var("TESTING_BUCKET", bucket);
    }
    let storage: Box<dyn Storage> = if args.noop {
        std::env::set_var("TESTING_BUCKET", "noop");
        Box::new(DebugStorage)
    } else if args.local {
        std::env::set_var("TESTING_BUCKET", "local");
        Box::new(LocalStorage::new("local"))
    } else {
        Box::new(GcsStorage)
    };

    let deploy = Deploy::from_env()?;
    let config = deploy.config()?;
    log::info!("publishing {deploy:?} deploy with a {}s budget", args.timeout_secs);
    let api_key = upstream_api_key()?;
    let client = UpstreamClient::new(UpstreamConfig::from_env(), api_key);

    let deadline = Deadline::after(Duration::from_secs(args.timeout_secs));
    let publisher = Publisher::new(storage, Box::new(LogMetrics), config);
    let summary = publisher.publish_all(Box::new(client), deadline);

    if !summary.ok {
        let failed: Vec<&str> = summary
            .results
            .iter()
            .filter(|r| !r.ok)
            .map(|r| r.endpoint.as_str())
            .collect();
        anyhow::bail!("publish cycle failed for: {}", failed.join(", "));
    }
    Ok(())
}
