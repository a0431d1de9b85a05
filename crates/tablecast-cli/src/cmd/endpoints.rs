//! Endpoints subcommand - list public download URLs.

use anyhow::Result;

use tablecast_publish::deploys::Deploy;
use tablecast_publish::endpoints::all_endpoints;

pub fn run() -> Result<()> {
    let config = Deploy::from_env()?.config()?;
    for ep in all_endpoints() {
        println!("{}", ep.url(&config));
    }
    Ok(())
}
