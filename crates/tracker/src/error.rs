//! Error types for transaction tracking.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use zkv_core::ClientError;
use zkv_types::{AttestationError, DecodedDispatchError};

/// Which budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    /// Submission until finalization.
    Finalization,
    /// Finalization until the matching attestation.
    Attestation,
    /// Waiting for the node to finish syncing.
    Sync,
}

impl fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutPhase::Finalization => write!(f, "proof transaction finalization"),
            TimeoutPhase::Attestation => write!(f, "NewAttestation event"),
            TimeoutPhase::Sync => write!(f, "node sync"),
        }
    }
}

/// The chain did something the submission contract rules out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("{label} transaction was expected to fail but succeeded")]
    UnexpectedSuccess { label: String },

    #[error("No attestation ID found for {label} transaction")]
    MissingAttestationId { label: String },

    #[error("Invalid attestation data: {0}")]
    MalformedAttestation(#[from] AttestationError),
}

/// Errors returned by [`TransactionTracker::track`](crate::TransactionTracker::track)
/// and the attestation waiter.
#[derive(Debug, Error)]
pub enum TrackError {
    /// Caller broke a precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The runtime rejected the extrinsic and failure was not expected.
    #[error("{label} transaction failed with dispatch error after {elapsed:.2?}: {error}")]
    Dispatch {
        label: String,
        error: DecodedDispatchError,
        elapsed: Duration,
    },

    /// A deadline elapsed.
    #[error("Timed out waiting for {label} {phase} after {budget:?} (elapsed {elapsed:.2?})")]
    Timeout {
        phase: TimeoutPhase,
        label: String,
        budget: Duration,
        elapsed: Duration,
    },

    #[error("Protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),

    /// The submitting account cannot pay fees.
    #[error("The account has insufficient funds")]
    InsufficientFunds,

    /// The chain client failed (submission refused, subscription not opened).
    #[error("Chain client error: {0}")]
    Client(#[from] ClientError),
}

impl TrackError {
    /// Timeout phase, if this is a timeout.
    pub fn timeout_phase(&self) -> Option<TimeoutPhase> {
        match self {
            TrackError::Timeout { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl From<AttestationError> for TrackError {
    fn from(err: AttestationError) -> Self {
        TrackError::ProtocolViolation(ProtocolViolation::MalformedAttestation(err))
    }
}
