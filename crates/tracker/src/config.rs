//! Timing budgets for transaction tracking.

use std::time::Duration;

/// Deadlines and progress-log periods used while tracking one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Overall budget from submission until the including block is finalized.
    pub finalization_timeout: Duration,

    /// How often to log while waiting for finalization.
    pub finalization_progress_period: Duration,

    /// Budget for the matching `NewAttestation` event, counted from finalization.
    pub attestation_timeout: Duration,

    /// How often to log while waiting for the attestation.
    pub attestation_progress_period: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            finalization_timeout: Duration::from_secs(60),
            finalization_progress_period: Duration::from_secs(5),
            // Attestations are published on a much slower cadence than blocks
            attestation_timeout: Duration::from_secs(360),
            attestation_progress_period: Duration::from_secs(15),
        }
    }
}

impl TrackerConfig {
    /// Set the finalization deadline.
    pub fn with_finalization_timeout(mut self, timeout: Duration) -> Self {
        self.finalization_timeout = timeout;
        self
    }

    /// Set the attestation deadline.
    pub fn with_attestation_timeout(mut self, timeout: Duration) -> Self {
        self.attestation_timeout = timeout;
        self
    }

    /// Set both progress-log periods.
    pub fn with_progress_periods(mut self, finalization: Duration, attestation: Duration) -> Self {
        self.finalization_progress_period = finalization;
        self.attestation_progress_period = attestation;
        self
    }
}
