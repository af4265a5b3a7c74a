//! The chain-client collaborator consumed by the tracker.

use crate::{ClientError, NodeHealth, Subscription};
use async_trait::async_trait;
use zkv_types::{ChainEventBatch, ModuleError, ModuleErrorMeta, StatusUpdate};

/// Capability to submit extrinsics to a chain and observe its events.
///
/// Connection management, extrinsic encoding and signing live behind this
/// trait. The tracker only consumes the streams it hands out.
///
/// # Example
///
/// ```ignore
/// let mut updates = client.submit(extrinsic, &signer).await?;
/// while let Some(update) = updates.next().await {
///     if let TxStatus::Finalized(block) = update.status {
///         // ...
///     }
/// }
/// // `updates` is unsubscribed when dropped
/// ```
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Signed-but-unsent extrinsic handle.
    type Transaction: Send + 'static;

    /// Account and submission options used to send the extrinsic.
    type Signer: Send + Sync;

    /// Submit the extrinsic and subscribe to its status updates.
    ///
    /// Updates arrive in pool order: `InBlock` before `Finalized`. The
    /// stream may end after a terminal status.
    async fn submit(
        &self,
        transaction: Self::Transaction,
        signer: &Self::Signer,
    ) -> Result<Subscription<StatusUpdate>, ClientError>;

    /// Subscribe to the event batch of every new block.
    async fn subscribe_system_events(&self) -> Result<Subscription<ChainEventBatch>, ClientError>;

    /// Resolve a module error against the runtime metadata.
    fn decode_module_error(&self, error: &ModuleError) -> Result<ModuleErrorMeta, ClientError>;

    /// Query node health (sync state and peers).
    async fn health(&self) -> Result<NodeHealth, ClientError>;

    /// Free balance of the signer's account, in the chain's smallest unit.
    async fn free_balance(&self, signer: &Self::Signer) -> Result<u128, ClientError>;
}
