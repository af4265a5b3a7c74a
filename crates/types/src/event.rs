//! Chain events as delivered with status updates and system event batches.
//!
//! The chain client parses raw runtime events into this fixed schema once,
//! at the boundary, so the tracking logic only ever sees typed fields.

use crate::BlockHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (section, method) pair identifying one runtime event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventSignature {
    /// Pallet section, e.g. `poe`.
    pub section: &'static str,
    /// Event name within the section, e.g. `NewElement`.
    pub method: &'static str,
}

impl EventSignature {
    /// A proof was verified and added as a leaf of the pending attestation.
    ///
    /// Fields: `[leaf: H256, attestation_id: u64]`.
    pub const NEW_ELEMENT: Self = Self::new("poe", "NewElement");

    /// An attestation was published.
    ///
    /// Fields: `[id: u64, attestation: H256]`.
    pub const NEW_ATTESTATION: Self = Self::new("poe", "NewAttestation");

    pub const fn new(section: &'static str, method: &'static str) -> Self {
        Self { section, method }
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.method)
    }
}

/// One typed data field of a chain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventField {
    /// Unsigned integer (ids, counters, balances that fit).
    U64(u64),
    /// 32-byte hash.
    Hash(BlockHash),
    /// Account id or other value the client renders as text.
    Text(String),
    /// Opaque byte payload.
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
}

impl EventField {
    /// Runtime type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            EventField::U64(_) => "u64",
            EventField::Hash(_) => "H256",
            EventField::Text(_) => "Text",
            EventField::Bytes(_) => "Bytes",
        }
    }
}

/// The stringified form the chain client would print for this value.
impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventField::U64(v) => write!(f, "{}", v),
            EventField::Hash(h) => write!(f, "{}", h),
            EventField::Text(s) => write!(f, "{}", s),
            EventField::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

/// A single event emitted by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub section: String,
    pub method: String,
    #[serde(default)]
    pub fields: Vec<EventField>,
}

impl ChainEvent {
    /// Create a new event.
    pub fn new(
        section: impl Into<String>,
        method: impl Into<String>,
        fields: Vec<EventField>,
    ) -> Self {
        Self {
            section: section.into(),
            method: method.into(),
            fields,
        }
    }

    /// Check whether this event has the given (section, method) pair.
    pub fn is(&self, signature: EventSignature) -> bool {
        self.section == signature.section && self.method == signature.method
    }
}

/// Ordered events of one block, as delivered by a system-event subscription.
pub type ChainEventBatch = Vec<ChainEvent>;

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}
