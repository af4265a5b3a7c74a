//! Transaction pool status updates for a submitted extrinsic.

use crate::{BlockHash, ChainEvent, DispatchError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an extrinsic as reported by the node's transaction pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "block", rename_all = "snake_case")]
pub enum TxStatus {
    /// Waiting for an earlier nonce.
    Future,
    /// Ready to be included.
    Ready,
    /// Gossiped to peers.
    Broadcast,
    /// Included in the given block.
    InBlock(BlockHash),
    /// The including block was retracted.
    Retracted(BlockHash),
    /// Finality was not reached within the node's own bound.
    FinalityTimeout(BlockHash),
    /// The including block was finalized.
    Finalized(BlockHash),
    /// Replaced by another extrinsic with the same nonce.
    Usurped,
    /// Dropped from the pool.
    Dropped,
    /// Deemed invalid by the pool.
    Invalid,
}

impl TxStatus {
    /// Whether the pool will send nothing further for this extrinsic.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TxStatus::Finalized(_)
                | TxStatus::FinalityTimeout(_)
                | TxStatus::Usurped
                | TxStatus::Dropped
                | TxStatus::Invalid
        )
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Future => write!(f, "Future"),
            TxStatus::Ready => write!(f, "Ready"),
            TxStatus::Broadcast => write!(f, "Broadcast"),
            TxStatus::InBlock(h) => write!(f, "InBlock({})", h),
            TxStatus::Retracted(h) => write!(f, "Retracted({})", h),
            TxStatus::FinalityTimeout(h) => write!(f, "FinalityTimeout({})", h),
            TxStatus::Finalized(h) => write!(f, "Finalized({})", h),
            TxStatus::Usurped => write!(f, "Usurped"),
            TxStatus::Dropped => write!(f, "Dropped"),
            TxStatus::Invalid => write!(f, "Invalid"),
        }
    }
}

/// One status callback for a submitted extrinsic.
///
/// Once the extrinsic is in a block, `events` carries the events it emitted
/// and `dispatch_error` is set if its dispatch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: TxStatus,
    #[serde(default)]
    pub events: Vec<ChainEvent>,
    #[serde(default)]
    pub dispatch_error: Option<DispatchError>,
}

impl StatusUpdate {
    /// An update with no events and no dispatch error.
    pub fn new(status: TxStatus) -> Self {
        Self {
            status,
            events: Vec::new(),
            dispatch_error: None,
        }
    }

    /// Attach events.
    pub fn with_events(mut self, events: Vec<ChainEvent>) -> Self {
        self.events = events;
        self
    }

    /// Attach a dispatch error.
    pub fn with_dispatch_error(mut self, error: DispatchError) -> Self {
        self.dispatch_error = Some(error);
        self
    }
}
