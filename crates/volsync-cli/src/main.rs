//! volsync - shared volume sync supervisor
//!
//! Runs the sync listener and periodic outbound syncs for one node of a
//! peer group.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    volsync_cli::run().await
}
