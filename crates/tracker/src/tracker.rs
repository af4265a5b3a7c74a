//! Transaction tracker: drives one submitted extrinsic to a terminal outcome.
//!
//! # State machine
//!
//! ```text
//! Pending ──submit──▶ Submitted ──InBlock──▶ InBlock ──Finalized──▶ Finalized
//!                                                                     │
//!                             ┌───────────────────────────────────────┤
//!                             ▼                 ▼                     ▼
//!                         Succeeded      FailedAsExpected     ProtocolViolation
//!
//! any phase ──deadline──▶ Timeout
//! any phase ──unexpected dispatch error──▶ Dispatch
//! ```
//!
//! Success is returned as data ([`TrackOutcome`]); every other terminal state
//! is a [`TrackError`]. The [`TimerSet`] is cleared before `track` returns on
//! every path.

use crate::correlator;
use crate::decoder::decode_dispatch_error;
use crate::{
    AttestationWaiter, ProtocolViolation, TimeoutPhase, TimerSet, TrackError, TrackPhase,
    TrackerConfig, TransactionSubmission,
};
use std::fmt;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, warn};
use zkv_core::ChainClient;
use zkv_types::{AttestationRecord, ChainEvent, EventSignature, StatusUpdate, TxStatus};

/// The benign terminal results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackResult {
    Succeeded,
    FailedAsExpected,
}

impl fmt::Display for TrackResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackResult::Succeeded => write!(f, "succeeded"),
            TrackResult::FailedAsExpected => write!(f, "failed as expected"),
        }
    }
}

/// What a successful `track` call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
    pub result: TrackResult,
    /// Id recorded from `poe.NewElement`, if any.
    pub attestation_id: Option<String>,
    /// The published attestation, when it was waited for.
    pub attestation: Option<AttestationRecord>,
}

/// Outcome of handling one status update.
enum Step {
    Continue,
    Finalized,
}

/// Submits extrinsics and follows them to a terminal outcome.
pub struct TransactionTracker<'a, C: ChainClient> {
    client: &'a C,
    config: TrackerConfig,
}

impl<'a, C: ChainClient> TransactionTracker<'a, C> {
    /// Create a tracker over the given chain client.
    pub fn new(client: &'a C, config: TrackerConfig) -> Self {
        Self { client, config }
    }

    /// Submit `transaction` and track it until a terminal outcome.
    ///
    /// Arms the finalization deadline on `timers` first, and leaves `timers`
    /// clear on return whatever the outcome. The attestation wait that may
    /// follow finalization runs under its own budget.
    pub async fn track(
        &self,
        transaction: C::Transaction,
        signer: &C::Signer,
        mut submission: TransactionSubmission,
        timers: &mut TimerSet,
    ) -> Result<TrackOutcome, TrackError> {
        timers.arm_deadline(self.config.finalization_timeout);

        let finalized = self
            .await_finalization(transaction, signer, &mut submission, timers)
            .await;
        timers.clear();

        if let Err(e) = &finalized {
            error!(
                proof = %submission.proof_label(),
                phase = %submission.phase(),
                error = %e,
                "{} {} transaction submission failed",
                submission.validity_prefix(),
                submission.proof_label()
            );
        }
        finalized?;

        self.resolve(&submission).await
    }

    /// Submit and consume status updates until finalization.
    async fn await_finalization(
        &self,
        transaction: C::Transaction,
        signer: &C::Signer,
        submission: &mut TransactionSubmission,
        timers: &mut TimerSet,
    ) -> Result<(), TrackError> {
        info!(
            proof = %submission.proof_label(),
            "Sending {} {} transaction...",
            submission.validity_prefix(),
            submission.proof_label()
        );

        let mut updates = tokio::select! {
            biased;
            _ = timers.deadline_elapsed() => return Err(self.finalization_timeout(submission)),
            result = self.client.submit(transaction, signer) => result?,
        };
        submission.advance(TrackPhase::Submitted);

        let mut stream_open = true;
        loop {
            let update = tokio::select! {
                biased;
                _ = timers.deadline_elapsed() => return Err(self.finalization_timeout(submission)),
                update = updates.next(), if stream_open => update,
            };

            let Some(update) = update else {
                warn!(
                    proof = %submission.proof_label(),
                    phase = %submission.phase(),
                    "Status subscription ended before finalization, waiting for deadline"
                );
                stream_open = false;
                continue;
            };

            if let Step::Finalized = self.on_status(update, submission, timers)? {
                return Ok(());
            }
        }
    }

    /// Handle one status update.
    ///
    /// An unexpected dispatch error is checked before any block or
    /// finalization handling, so it always wins.
    fn on_status(
        &self,
        update: StatusUpdate,
        submission: &mut TransactionSubmission,
        timers: &mut TimerSet,
    ) -> Result<Step, TrackError> {
        let label = submission.proof_label().to_string();
        let prefix = submission.validity_prefix();

        if let Some(dispatch_error) = &update.dispatch_error {
            let decoded = decode_dispatch_error(self.client, dispatch_error);
            if submission.expects_failure() {
                warn!(
                    proof = %label,
                    error = %decoded,
                    "{} {} transaction failed with dispatch error",
                    prefix,
                    label
                );
                submission.record_dispatch_error(decoded);
            } else {
                error!(
                    proof = %label,
                    error = %decoded,
                    "{} {} transaction unexpectedly failed with dispatch error",
                    prefix,
                    label
                );
                return Err(TrackError::Dispatch {
                    label,
                    error: decoded,
                    elapsed: submission.elapsed(),
                });
            }
        }

        match update.status {
            TxStatus::InBlock(block) => {
                submission.advance(TrackPhase::InBlock);
                info!(
                    proof = %label,
                    block = %block,
                    elapsed_secs = submission.elapsed().as_secs_f64(),
                    "{} {} transaction included in block",
                    prefix,
                    label
                );
                self.record_new_elements(&update.events, submission);
                self.start_finalization_progress(submission, timers);
                Ok(Step::Continue)
            }
            TxStatus::Finalized(block) => {
                if !submission.mark_finalized() {
                    debug!(proof = %label, "Duplicate finalization ignored");
                    return Ok(Step::Continue);
                }
                timers.clear();
                info!(
                    proof = %label,
                    block = %block,
                    elapsed_secs = submission.elapsed().as_secs_f64(),
                    "{} {} transaction finalized",
                    prefix,
                    label
                );
                Ok(Step::Finalized)
            }
            TxStatus::Retracted(_)
            | TxStatus::FinalityTimeout(_)
            | TxStatus::Usurped
            | TxStatus::Dropped
            | TxStatus::Invalid => {
                warn!(proof = %label, status = %update.status, "Transaction left the happy path, still waiting");
                Ok(Step::Continue)
            }
            TxStatus::Future | TxStatus::Ready | TxStatus::Broadcast => {
                debug!(proof = %label, status = %update.status, "Transaction status");
                Ok(Step::Continue)
            }
        }
    }

    /// Record the attestation id from the block's `poe.NewElement` events.
    fn record_new_elements(&self, events: &[ChainEvent], submission: &mut TransactionSubmission) {
        if submission.expects_failure() {
            let ignored = correlator::matching(events, EventSignature::NEW_ELEMENT).count();
            if ignored > 0 {
                warn!(
                    proof = %submission.proof_label(),
                    count = ignored,
                    "Ignoring NewElement events for a transaction expected to fail"
                );
            }
            return;
        }

        correlator::for_each_matching(events, EventSignature::NEW_ELEMENT, |fields| {
            if let [leaf, attestation_id, ..] = fields {
                let attestation_id = attestation_id.to_string();
                info!(
                    proof = %submission.proof_label(),
                    attestation_id = %attestation_id,
                    proof_leaf = %leaf,
                    "{} Proof Verified",
                    submission.proof_label()
                );
                submission.record_attestation_id(attestation_id);
            }
        });
    }

    /// (Re)start the periodic "waiting to finalize" log.
    fn start_finalization_progress(
        &self,
        submission: &TransactionSubmission,
        timers: &mut TimerSet,
    ) {
        let finalized = submission.finalized_flag();
        let label = submission.proof_label().to_string();
        let prefix = submission.validity_prefix();
        let started_at = submission.started_at();

        timers.start_progress(self.config.finalization_progress_period, move || {
            if !finalized.load(Ordering::SeqCst) {
                info!(
                    proof = %label,
                    elapsed_secs = started_at.elapsed().as_secs_f64(),
                    "Waiting for {} {} transaction to finalize...",
                    prefix,
                    label
                );
            }
        });
    }

    /// Decide the terminal outcome after finalization.
    async fn resolve(&self, submission: &TransactionSubmission) -> Result<TrackOutcome, TrackError> {
        let label = submission.proof_label();
        let attestation_id = submission.attestation_id().map(str::to_string);

        match (submission.dispatch_error(), submission.expects_failure()) {
            (Some(error), true) => {
                info!(
                    proof = %label,
                    error = %error,
                    "Invalid {} transaction failed as expected",
                    label
                );
                Ok(TrackOutcome {
                    result: TrackResult::FailedAsExpected,
                    attestation_id,
                    attestation: None,
                })
            }
            (None, true) => Err(ProtocolViolation::UnexpectedSuccess {
                label: label.to_string(),
            }
            .into()),
            // Unexpected dispatch errors short-circuit in `on_status`
            (Some(error), false) => Err(TrackError::Dispatch {
                label: label.to_string(),
                error: error.clone(),
                elapsed: submission.elapsed(),
            }),
            (None, false) => {
                let Some(id) = attestation_id else {
                    return Err(ProtocolViolation::MissingAttestationId {
                        label: label.to_string(),
                    }
                    .into());
                };

                if submission.skip_attestation_wait() {
                    info!(proof = %label, attestation_id = %id, "Skipping attestation wait");
                    return Ok(TrackOutcome {
                        result: TrackResult::Succeeded,
                        attestation_id: Some(id),
                        attestation: None,
                    });
                }

                let record = AttestationWaiter::new(self.client)
                    .with_label(label)
                    .with_progress_period(self.config.attestation_progress_period)
                    .wait_for_attestation(
                        self.config.attestation_timeout,
                        Some(id.as_str()),
                        submission.started_at(),
                    )
                    .await?;

                Ok(TrackOutcome {
                    result: TrackResult::Succeeded,
                    attestation_id: Some(id),
                    attestation: Some(record),
                })
            }
        }
    }

    fn finalization_timeout(&self, submission: &TransactionSubmission) -> TrackError {
        TrackError::Timeout {
            phase: TimeoutPhase::Finalization,
            label: format!(
                "{} {}",
                submission.validity_prefix(),
                submission.proof_label()
            ),
            budget: self.config.finalization_timeout,
            elapsed: submission.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing_test::traced_test;
    use zkv_test_helpers::{fixtures, MockChain};

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_logs_phase_transitions() {
        let block = fixtures::hash(0xd1);
        let chain = MockChain::new()
            .with_status(
                Duration::from_secs(1),
                fixtures::in_block(block, vec![fixtures::new_element(fixtures::hash(9), 42)]),
            )
            .with_status(Duration::from_secs(1), fixtures::finalized(block, vec![]));
        let mut timers = TimerSet::new();

        let submission = TransactionSubmission::new("groth16").skipping_attestation_wait(true);
        TransactionTracker::new(&chain, TrackerConfig::default())
            .track(vec![], &(), submission, &mut timers)
            .await
            .unwrap();

        assert!(logs_contain("Sending Valid groth16 transaction"));
        assert!(logs_contain("Valid groth16 transaction included in block"));
        assert!(logs_contain("groth16 Proof Verified"));
        assert!(logs_contain("Valid groth16 transaction finalized"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_in_block_keeps_first_attestation_id() {
        let chain = MockChain::new();
        let tracker = TransactionTracker::new(&chain, TrackerConfig::default());
        let mut submission = TransactionSubmission::new("fflonk");
        let mut timers = TimerSet::new();

        for id in [5, 6] {
            let update = fixtures::in_block(
                fixtures::hash(id as u8),
                vec![fixtures::new_element(fixtures::hash(1), id)],
            );
            assert!(matches!(
                tracker.on_status(update, &mut submission, &mut timers),
                Ok(Step::Continue)
            ));
        }

        assert_eq!(submission.attestation_id(), Some("5"));
        assert!(timers.has_progress());
        timers.clear();
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalization_clears_timers() {
        let chain = MockChain::new();
        let tracker = TransactionTracker::new(&chain, TrackerConfig::default());
        let mut submission = TransactionSubmission::new("fflonk");
        let mut timers = TimerSet::new();
        timers.arm_deadline(Duration::from_secs(60));

        tracker
            .on_status(fixtures::in_block(fixtures::hash(1), vec![]), &mut submission, &mut timers)
            .unwrap();
        assert!(timers.has_progress());

        let step = tracker
            .on_status(fixtures::finalized(fixtures::hash(1), vec![]), &mut submission, &mut timers)
            .unwrap();
        assert!(matches!(step, Step::Finalized));
        assert!(timers.is_clear());
        assert!(submission.is_finalized());
    }
}
