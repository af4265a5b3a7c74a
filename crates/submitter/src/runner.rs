//! One proof submission, end to end.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;
use zkv_core::ChainClient;
use zkv_tracker::{
    TimerSet, TrackError, TrackOutcome, TrackerConfig, TransactionSubmission, TransactionTracker,
};
use zkv_types::ProofSystem;

/// What to submit and how to judge it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofRequest {
    pub proof: ProofSystem,
    pub expects_failure: bool,
    pub skip_attestation_wait: bool,
}

impl ProofRequest {
    pub fn new(proof: ProofSystem) -> Self {
        Self {
            proof,
            expects_failure: false,
            skip_attestation_wait: false,
        }
    }

    pub fn expecting_failure(mut self, expects_failure: bool) -> Self {
        self.expects_failure = expects_failure;
        self
    }

    pub fn skipping_attestation_wait(mut self, skip: bool) -> Self {
        self.skip_attestation_wait = skip;
        self
    }

    fn submission(&self) -> TransactionSubmission {
        TransactionSubmission::new(self.proof.label())
            .expecting_failure(self.expects_failure)
            .skipping_attestation_wait(self.skip_attestation_wait)
    }
}

/// Result of a finished submission, printed as the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub proof: ProofSystem,
    pub outcome: TrackOutcome,
    pub elapsed: Duration,
}

impl fmt::Display for SubmitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sent 1 proof, elapsed time: {:.2}s, result: {}, attestationId: {}",
            self.elapsed.as_secs_f64(),
            self.outcome.result,
            self.outcome.attestation_id.as_deref().unwrap_or("none"),
        )
    }
}

/// Submit `transaction` and track it to a terminal outcome.
pub async fn submit_proof<C: ChainClient>(
    client: &C,
    config: TrackerConfig,
    transaction: C::Transaction,
    signer: &C::Signer,
    request: ProofRequest,
) -> Result<SubmitReport, TrackError> {
    info!(
        proof = %request.proof,
        pallet = request.proof.pallet(),
        expects_failure = request.expects_failure,
        "Submitting proof"
    );

    let start = Instant::now();
    let mut timers = TimerSet::new();
    let outcome = TransactionTracker::new(client, config)
        .track(transaction, signer, request.submission(), &mut timers)
        .await?;

    Ok(SubmitReport {
        proof: request.proof,
        outcome,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkv_test_helpers::{fixtures, MockChain};
    use zkv_tracker::TrackResult;
    use zkv_types::{StatusUpdate, TxStatus};

    fn finalizing_chain(attestation_id: u64) -> MockChain {
        let block = fixtures::hash(0xd1);
        MockChain::new()
            .with_status(Duration::ZERO, StatusUpdate::new(TxStatus::Broadcast))
            .with_status(
                Duration::from_secs(6),
                fixtures::in_block(
                    block,
                    vec![fixtures::new_element(fixtures::hash(0x1e), attestation_id)],
                ),
            )
            .with_status(Duration::from_secs(6), fixtures::finalized(block, vec![]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_summary() {
        let chain = finalizing_chain(8).with_events(
            Duration::from_secs(20),
            vec![fixtures::new_attestation(8, fixtures::hash(0xa1))],
        );

        let report = submit_proof(
            &chain,
            TrackerConfig::default(),
            b"extrinsic".to_vec(),
            &(),
            ProofRequest::new(ProofSystem::Fflonk),
        )
        .await
        .unwrap();

        assert_eq!(report.outcome.result, TrackResult::Succeeded);
        assert!(report.elapsed >= Duration::from_secs(32));
        let summary = report.to_string();
        assert!(summary.starts_with("Sent 1 proof, elapsed time: "), "{summary}");
        assert!(summary.ends_with("s, result: succeeded, attestationId: 8"), "{summary}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_attestation_request() {
        let chain = finalizing_chain(3);
        let counters = chain.counters();

        let request = ProofRequest::new(ProofSystem::Groth16).skipping_attestation_wait(true);
        let report = submit_proof(&chain, TrackerConfig::default(), vec![], &(), request)
            .await
            .unwrap();

        assert_eq!(report.outcome.attestation_id.as_deref(), Some("3"));
        assert_eq!(counters.event_subscriptions(), 0);
    }

    #[test]
    fn test_summary_without_attestation_id() {
        let report = SubmitReport {
            proof: ProofSystem::Risc0,
            outcome: TrackOutcome {
                result: TrackResult::FailedAsExpected,
                attestation_id: None,
                attestation: None,
            },
            elapsed: Duration::from_millis(12_345),
        };
        assert_eq!(
            report.to_string(),
            "Sent 1 proof, elapsed time: 12.35s, result: failed as expected, attestationId: none"
        );
    }
}
