//! Waiting for the attestation that covers a verified proof.
//!
//! After finalization the proof sits in a pending attestation identified by
//! the id learned from `poe.NewElement`. The attestation itself is published
//! later as `poe.NewAttestation` in some unrelated block, so the only way to
//! see it is to watch the system event stream.

use crate::correlator;
use crate::{TimeoutPhase, TimerSet, TrackError, TrackerConfig};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};
use zkv_core::ChainClient;
use zkv_types::{AttestationRecord, ChainEvent, EventField, EventSignature};

/// Subscribes to system events and resolves on the matching attestation.
pub struct AttestationWaiter<'a, C: ChainClient> {
    client: &'a C,
    label: String,
    progress_period: Duration,
}

impl<'a, C: ChainClient> AttestationWaiter<'a, C> {
    /// Create a waiter using the given chain client.
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            label: "proof".to_string(),
            progress_period: TrackerConfig::default().attestation_progress_period,
        }
    }

    /// Proof label used in logs and timeout errors.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the progress-log period.
    pub fn with_progress_period(mut self, period: Duration) -> Self {
        self.progress_period = period;
        self
    }

    /// Wait for the `NewAttestation` event whose id equals `attestation_id`.
    ///
    /// Fails immediately with [`TrackError::InvalidArgument`] if no id is
    /// given. On a match, or on timeout, the subscription, deadline and
    /// progress task are all released before returning. A matching event
    /// with a malformed payload is a protocol violation.
    pub async fn wait_for_attestation(
        &self,
        timeout: Duration,
        attestation_id: Option<&str>,
        started_at: Instant,
    ) -> Result<AttestationRecord, TrackError> {
        let attestation_id = attestation_id.ok_or_else(|| {
            TrackError::InvalidArgument(
                "attestation ID is absent, cannot wait for NewAttestation event".to_string(),
            )
        })?;

        let mut subscription = self.client.subscribe_system_events().await?;

        let mut timers = TimerSet::new();
        timers.arm_deadline(timeout);
        let label = self.label.clone();
        timers.start_progress(self.progress_period, move || {
            info!(
                proof = %label,
                elapsed_secs = started_at.elapsed().as_secs_f64(),
                "Waiting for NewAttestation event..."
            );
        });

        let mut stream_open = true;
        loop {
            tokio::select! {
                biased;

                batch = subscription.next(), if stream_open => {
                    let Some(events) = batch else {
                        warn!(proof = %self.label, "System event subscription closed, waiting for deadline");
                        stream_open = false;
                        continue;
                    };
                    if let Some(fields) = find_attestation(&events, attestation_id) {
                        subscription.unsubscribe();
                        timers.clear();

                        info!(
                            proof = %self.label,
                            attestation_id,
                            elapsed_secs = started_at.elapsed().as_secs_f64(),
                            "Matched NewAttestation event"
                        );
                        for field in fields {
                            info!(field_type = field.type_name(), value = %field, "Attestation field");
                        }

                        return Ok(AttestationRecord::from_fields(fields)?);
                    }
                }

                _ = timers.deadline_elapsed() => {
                    subscription.unsubscribe();
                    timers.clear();
                    error!(proof = %self.label, attestation_id, "Timeout expired while waiting for NewAttestation event");
                    return Err(TrackError::Timeout {
                        phase: TimeoutPhase::Attestation,
                        label: self.label.clone(),
                        budget: timeout,
                        elapsed: started_at.elapsed(),
                    });
                }
            }
        }
    }
}

/// First `NewAttestation` in the batch whose id field equals `attestation_id`.
fn find_attestation<'e>(events: &'e [ChainEvent], attestation_id: &str) -> Option<&'e [EventField]> {
    correlator::matching(events, EventSignature::NEW_ATTESTATION).find(|fields| {
        fields
            .first()
            .is_some_and(|id| id.to_string() == attestation_id)
    })
}
