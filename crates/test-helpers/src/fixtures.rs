//! Event and status fixtures.

use zkv_core::ErrorRegistry;
use zkv_types::{BlockHash, ChainEvent, DispatchError, EventField, EventSignature, ModuleError, StatusUpdate, TxStatus};

/// Pallet index of the verifier pallet in [`registry`].
pub const VERIFIER_PALLET: u8 = 12;

/// Error variant of `VerifyError` in [`registry`].
pub const VERIFY_ERROR: u8 = 1;

/// Deterministic hash derived from a seed byte.
pub fn hash(seed: u8) -> BlockHash {
    BlockHash::new([seed; 32])
}

/// `poe.NewElement` carrying `[leaf, attestation_id]`.
pub fn new_element(leaf: BlockHash, attestation_id: u64) -> ChainEvent {
    event(
        EventSignature::NEW_ELEMENT,
        vec![EventField::Hash(leaf), EventField::U64(attestation_id)],
    )
}

/// `poe.NewAttestation` carrying `[id, attestation_root]`.
pub fn new_attestation(id: u64, root: BlockHash) -> ChainEvent {
    event(
        EventSignature::NEW_ATTESTATION,
        vec![EventField::U64(id), EventField::Hash(root)],
    )
}

/// An event with an arbitrary signature.
pub fn event(signature: EventSignature, fields: Vec<EventField>) -> ChainEvent {
    ChainEvent::new(signature.section, signature.method, fields)
}

/// Unrelated events that show up in most blocks.
pub fn noise() -> Vec<ChainEvent> {
    vec![
        ChainEvent::new("system", "ExtrinsicSuccess", vec![]),
        ChainEvent::new(
            "balances",
            "Withdraw",
            vec![EventField::Text("5GrwvaEF".into()), EventField::U64(1_000)],
        ),
    ]
}

/// `InBlock` update with the given events.
pub fn in_block(block: BlockHash, events: Vec<ChainEvent>) -> StatusUpdate {
    StatusUpdate::new(TxStatus::InBlock(block)).with_events(events)
}

/// `Finalized` update with the given events.
pub fn finalized(block: BlockHash, events: Vec<ChainEvent>) -> StatusUpdate {
    StatusUpdate::new(TxStatus::Finalized(block)).with_events(events)
}

/// The module error [`registry`] resolves to `VerifyError`.
pub fn verify_error() -> DispatchError {
    DispatchError::Module(ModuleError::new(VERIFIER_PALLET, VERIFY_ERROR))
}

/// Metadata resolving [`verify_error`].
pub fn registry() -> ErrorRegistry {
    ErrorRegistry::new().with_error(
        VERIFIER_PALLET,
        VERIFY_ERROR,
        "settlementGroth16Pallet",
        "VerifyError",
        &["Provided data has not valid", "proof."],
    )
}
