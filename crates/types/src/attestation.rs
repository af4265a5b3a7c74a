//! Published attestations.

use crate::EventField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the hex digits in an attestation root (32 bytes).
pub const ATTESTATION_HEX_DIGITS: usize = 64;

/// An attestation as published by a `poe.NewAttestation` event.
///
/// `proofs_attestation` is always `0x` followed by exactly 64 hex digits;
/// both constructors enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    pub id: u64,
    pub proofs_attestation: String,
}

impl AttestationRecord {
    /// Build a record, validating the attestation root.
    pub fn new(id: u64, proofs_attestation: impl Into<String>) -> Result<Self, AttestationError> {
        let proofs_attestation = proofs_attestation.into();
        if !is_attestation_hex(&proofs_attestation) {
            return Err(AttestationError::InvalidAttestationHex(proofs_attestation));
        }
        Ok(Self {
            id,
            proofs_attestation,
        })
    }

    /// Build a record from the first two fields of a `NewAttestation` event.
    pub fn from_fields(fields: &[EventField]) -> Result<Self, AttestationError> {
        let (id_field, root_field) = match fields {
            [id, root, ..] => (id, root),
            _ => return Err(AttestationError::MissingFields(fields.len())),
        };

        let id_str = id_field.to_string();
        let id = id_str
            .parse::<u64>()
            .map_err(|_| AttestationError::InvalidId(id_str))?;

        Self::new(id, root_field.to_string())
    }
}

impl fmt::Display for AttestationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attestation {} ({})", self.id, self.proofs_attestation)
    }
}

/// Check for `0x` followed by exactly 64 hex digits (either case).
pub fn is_attestation_hex(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => {
            digits.len() == ATTESTATION_HEX_DIGITS && digits.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Errors building an [`AttestationRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttestationError {
    #[error("Attestation event carries {0} fields, expected at least 2")]
    MissingFields(usize),

    #[error("Attestation id is not an integer: {0}")]
    InvalidId(String),

    #[error("Attestation root is not 0x followed by 64 hex digits: {0}")]
    InvalidAttestationHex(String),
}
