//! Chain-facing data types for proof submission and attestation tracking.

mod attestation;
mod dispatch;
mod event;
mod hash;
mod proof;
mod status;

pub use attestation::{is_attestation_hex, AttestationError, AttestationRecord, ATTESTATION_HEX_DIGITS};
pub use dispatch::{DecodedDispatchError, DispatchError, ModuleError, ModuleErrorMeta};
pub use event::{ChainEvent, ChainEventBatch, EventField, EventSignature};
pub use hash::{BlockHash, HexError};
pub use proof::{ProofSystem, UnknownProofSystem};
pub use status::{StatusUpdate, TxStatus};
