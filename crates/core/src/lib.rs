//! Chain-client boundary for proof submission.
//!
//! Everything the tracker needs from a node is expressed by [`ChainClient`]:
//! submitting an extrinsic with a status stream, subscribing to per-block
//! events, resolving module errors against metadata, and health checks.

mod error;
mod registry;
mod subscription;
mod traits;

pub use error::ClientError;
pub use registry::{ErrorRegistry, ModuleErrorEntry};
pub use subscription::Subscription;
pub use traits::ChainClient;

use serde::{Deserialize, Serialize};

/// Node health as reported by `system_health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeHealth {
    /// Node is still importing blocks.
    pub is_syncing: bool,
    /// Number of connected peers.
    #[serde(default)]
    pub peers: u64,
    /// Whether the node is expected to have peers.
    #[serde(default)]
    pub should_have_peers: bool,
}
