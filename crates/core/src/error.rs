//! Errors surfaced by chain clients.

use thiserror::Error;

/// Errors from the chain-client collaborator.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Connection or request failure talking to the node.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node refused the extrinsic before inclusion.
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// No metadata entry for the module error.
    #[error("Unknown module error: pallet {index}, variant {variant}")]
    UnknownModuleError { index: u8, variant: u8 },

    /// Response payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}
