//! Per-transaction tracking state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use zkv_types::DecodedDispatchError;

/// Lifecycle phase of a tracked transaction. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrackPhase {
    Pending,
    Submitted,
    InBlock,
    Finalized,
}

impl fmt::Display for TrackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackPhase::Pending => write!(f, "pending"),
            TrackPhase::Submitted => write!(f, "submitted"),
            TrackPhase::InBlock => write!(f, "in block"),
            TrackPhase::Finalized => write!(f, "finalized"),
        }
    }
}

/// One in-flight transaction.
///
/// Lives for a single tracking call and is consumed by it.
#[derive(Debug)]
pub struct TransactionSubmission {
    proof_label: String,
    expects_failure: bool,
    skip_attestation_wait: bool,
    /// Learned from `NewElement` while in block. Set at most once.
    attestation_id: Option<String>,
    /// First dispatch error observed, if any.
    dispatch_error: Option<DecodedDispatchError>,
    /// Shared with the progress task so it goes quiet once finalized.
    finalized: Arc<AtomicBool>,
    phase: TrackPhase,
    started_at: Instant,
}

impl TransactionSubmission {
    /// Start tracking a submission for the given proof label.
    pub fn new(proof_label: impl Into<String>) -> Self {
        Self {
            proof_label: proof_label.into(),
            expects_failure: false,
            skip_attestation_wait: false,
            attestation_id: None,
            dispatch_error: None,
            finalized: Arc::new(AtomicBool::new(false)),
            phase: TrackPhase::Pending,
            started_at: Instant::now(),
        }
    }

    /// Treat a dispatch error as the expected outcome.
    pub fn expecting_failure(mut self, expects_failure: bool) -> Self {
        self.expects_failure = expects_failure;
        self
    }

    /// Resolve at finalization without waiting for the attestation.
    pub fn skipping_attestation_wait(mut self, skip: bool) -> Self {
        self.skip_attestation_wait = skip;
        self
    }

    pub fn proof_label(&self) -> &str {
        &self.proof_label
    }

    pub fn expects_failure(&self) -> bool {
        self.expects_failure
    }

    pub fn skip_attestation_wait(&self) -> bool {
        self.skip_attestation_wait
    }

    /// "Valid" or "Invalid", for log lines.
    pub fn validity_prefix(&self) -> &'static str {
        if self.expects_failure {
            "Invalid"
        } else {
            "Valid"
        }
    }

    pub fn attestation_id(&self) -> Option<&str> {
        self.attestation_id.as_deref()
    }

    /// Record the attestation id. Returns `false` if a different id was
    /// already recorded; the first one is kept.
    pub fn record_attestation_id(&mut self, id: String) -> bool {
        match &self.attestation_id {
            None => {
                self.attestation_id = Some(id);
                true
            }
            Some(existing) if *existing == id => true,
            Some(existing) => {
                warn!(
                    proof = %self.proof_label,
                    recorded = %existing,
                    ignored = %id,
                    "Attestation ID already recorded, ignoring a second one"
                );
                false
            }
        }
    }

    pub fn dispatch_error(&self) -> Option<&DecodedDispatchError> {
        self.dispatch_error.as_ref()
    }

    /// Remember the first dispatch error seen across status updates.
    pub fn record_dispatch_error(&mut self, error: DecodedDispatchError) {
        if self.dispatch_error.is_none() {
            self.dispatch_error = Some(error);
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::SeqCst)
    }

    /// Flip to finalized. Returns `true` only for the first call.
    pub fn mark_finalized(&mut self) -> bool {
        let first = !self.finalized.swap(true, Ordering::SeqCst);
        self.advance(TrackPhase::Finalized);
        first
    }

    /// Flag observed by the finalization progress task.
    pub fn finalized_flag(&self) -> Arc<AtomicBool> {
        self.finalized.clone()
    }

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    /// Move to `phase` if it is ahead of the current one.
    pub fn advance(&mut self, phase: TrackPhase) {
        if phase > self.phase {
            debug!(proof = %self.proof_label, from = %self.phase, to = %phase, "Phase transition");
            self.phase = phase;
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
