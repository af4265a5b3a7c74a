//! Proof submission tracking.
//!
//! Follows one signed proof-verification extrinsic from submission through
//! block inclusion and finalization, then waits for the attestation that
//! aggregates the proof.
//!
//! # Components
//!
//! - [`decode_dispatch_error`] → human-readable dispatch failures
//! - [`for_each_matching`] → pick `(section, method)` events out of a batch
//! - [`AttestationWaiter`] → resolve on the matching `poe.NewAttestation`
//! - [`TransactionTracker`] → the lifecycle state machine tying them together
//!
//! Every tracking call owns its own [`TimerSet`] and subscriptions; all of
//! them are released before the call returns.

mod account;
mod config;
mod correlator;
mod decoder;
mod error;
mod submission;
mod sync;
mod timers;
mod tracker;
mod waiter;

pub use account::ensure_account_funded;
pub use config::TrackerConfig;
pub use correlator::{for_each_matching, matching};
pub use decoder::decode_dispatch_error;
pub use error::{ProtocolViolation, TimeoutPhase, TrackError};
pub use submission::{TrackPhase, TransactionSubmission};
pub use sync::wait_for_node_sync;
pub use timers::TimerSet;
pub use tracker::{TrackOutcome, TrackResult, TransactionTracker};
pub use waiter::AttestationWaiter;
