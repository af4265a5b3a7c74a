//! Waiting for the node to finish syncing before submitting.

use crate::{TimeoutPhase, TrackError};
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::info;
use zkv_core::{ChainClient, NodeHealth};

/// Poll node health every `poll_interval` until it reports not syncing.
///
/// With `max_wait` set, gives up with a [`TimeoutPhase::Sync`] timeout once
/// that much time has passed.
pub async fn wait_for_node_sync<C: ChainClient>(
    client: &C,
    poll_interval: Duration,
    max_wait: Option<Duration>,
) -> Result<NodeHealth, TrackError> {
    info!("Waiting for the node to sync...");
    let start = Instant::now();

    loop {
        let health = client.health().await?;
        if !health.is_syncing {
            info!(peers = health.peers, "Node has finished syncing");
            return Ok(health);
        }

        if let Some(max_wait) = max_wait {
            if start.elapsed() >= max_wait {
                return Err(TrackError::Timeout {
                    phase: TimeoutPhase::Sync,
                    label: "node".to_string(),
                    budget: max_wait,
                    elapsed: start.elapsed(),
                });
            }
        }

        info!(peers = health.peers, "Node is syncing...");
        time::sleep(poll_interval).await;
    }
}
