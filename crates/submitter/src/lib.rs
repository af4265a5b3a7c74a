//! Proof submission against a zkVerify-style chain gateway.
//!
//! [`GatewayClient`] implements [`zkv_core::ChainClient`] over the gateway's
//! JSON API; [`submit_proof`] sends one signed extrinsic and tracks it to its
//! attestation with [`zkv_tracker::TransactionTracker`].

pub mod client;
pub mod config;
pub mod runner;

pub use client::{GatewayAccount, GatewayClient, GatewayConfig, GatewayError, SignedExtrinsic};
pub use config::{ConfigError, SubmitterConfig, TrackerSection};
pub use runner::{submit_proof, ProofRequest, SubmitReport};
