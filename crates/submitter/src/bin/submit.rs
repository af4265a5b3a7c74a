//! zkVerify proof submitter CLI
//!
//! Sends one signed proof-verification extrinsic through a chain gateway and
//! tracks it through finalization to its attestation.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use zkv_submitter::{
    submit_proof, GatewayClient, ProofRequest, SignedExtrinsic, SubmitterConfig,
};
use zkv_tracker::{ensure_account_funded, wait_for_node_sync};
use zkv_types::ProofSystem;

#[derive(Parser)]
#[command(name = "zkv-submit")]
#[command(about = "Submit a proof to zkVerify and wait for its attestation")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gateway URL (overrides config and ZKV_ENDPOINT)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Submitting account (overrides config and ZKV_ACCOUNT)
    #[arg(short, long)]
    account: Option<String>,

    /// Proof system (groth16, fflonk, zksync, risc0)
    #[arg(short, long, value_parser = parse_proof_system)]
    proof: ProofSystem,

    /// File holding the hex-encoded signed extrinsic
    #[arg(short, long)]
    transaction: PathBuf,

    /// The proof is invalid and its verification must fail
    #[arg(long)]
    expect_failure: bool,

    /// Resolve once finalized without waiting for the attestation
    #[arg(long)]
    skip_attestation: bool,

    /// Explicit account nonce
    #[arg(long)]
    nonce: Option<u64>,

    /// Wait for the node to finish syncing before submitting
    #[arg(long)]
    wait_sync: bool,

    /// Finalization deadline (e.g., "60s", "2m")
    #[arg(long)]
    finalization_timeout: Option<humantime::Duration>,

    /// Attestation deadline (e.g., "6m")
    #[arg(long)]
    attestation_timeout: Option<humantime::Duration>,
}

fn parse_proof_system(s: &str) -> Result<ProofSystem, String> {
    s.parse().map_err(|e: zkv_types::UnknownProofSystem| e.to_string())
}

fn load_config(cli: &Cli) -> anyhow::Result<SubmitterConfig> {
    let mut config = match &cli.config {
        Some(path) => SubmitterConfig::from_file(path)?,
        None => SubmitterConfig::default(),
    }
    .with_env_overrides();

    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint);
    }
    if let Some(account) = &cli.account {
        config = config.with_account(account);
    }
    if let Some(nonce) = cli.nonce {
        config = config.with_nonce(nonce);
    }
    if cli.wait_sync {
        config.wait_for_sync = true;
    }
    if let Some(timeout) = &cli.finalization_timeout {
        config = config.with_finalization_timeout(**timeout);
    }
    if let Some(timeout) = &cli.attestation_timeout {
        config = config.with_attestation_timeout(**timeout);
    }

    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let text = std::fs::read_to_string(&cli.transaction)
        .with_context(|| format!("reading {}", cli.transaction.display()))?;
    let extrinsic = SignedExtrinsic::from_hex(&text)?;

    let client = GatewayClient::connect(&config.gateway_config()).await?;

    if config.wait_for_sync {
        wait_for_node_sync(&client, Duration::from_secs(5), config.sync_timeout()).await?;
    }

    let account = config.account();
    ensure_account_funded(&client, &account).await?;

    let request = ProofRequest::new(cli.proof)
        .expecting_failure(cli.expect_failure)
        .skipping_attestation_wait(cli.skip_attestation);
    info!(bytes = extrinsic.len(), "Loaded signed extrinsic");

    let report = submit_proof(
        &client,
        config.tracker_config(),
        extrinsic,
        &account,
        request,
    )
    .await?;

    if let Some(record) = &report.outcome.attestation {
        info!(
            attestation_id = record.id,
            proofs_attestation = %record.proofs_attestation,
            "Attestation published"
        );
    }
    println!("{report}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "Proof submission failed");
        return Err(e);
    }
    Ok(())
}
