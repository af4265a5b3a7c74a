//! HTTP gateway client.
//!
//! Talks to a chain gateway that exposes extrinsic submission, per-transaction
//! status, per-block events and runtime error metadata over JSON. Streams are
//! produced by polling tasks that stop when their [`Subscription`] is torn
//! down.

pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zkv_core::{
    ChainClient, ClientError, ErrorRegistry, ModuleErrorEntry, NodeHealth, Subscription,
};
use zkv_types::{ChainEventBatch, ModuleError, ModuleErrorMeta, StatusUpdate};

use types::{BalanceResponse, EventsResponse, SubmitTransactionRequest, SubmitTransactionResponse};

const STREAM_CAPACITY: usize = 16;

/// Errors from the gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Timed out connecting to {endpoint} after {timeout:?}")]
    ConnectTimeout { endpoint: String, timeout: Duration },

    #[error("Invalid extrinsic: {0}")]
    InvalidExtrinsic(String),
}

impl From<GatewayError> for ClientError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidExtrinsic(msg) => ClientError::Rejected(msg),
            other => ClientError::Transport(other.to_string()),
        }
    }
}

/// A signed extrinsic ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedExtrinsic(Vec<u8>);

impl SignedExtrinsic {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse a hex-encoded extrinsic, with or without `0x` and surrounding
    /// whitespace.
    pub fn from_hex(s: &str) -> Result<Self, GatewayError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(GatewayError::InvalidExtrinsic("empty extrinsic".into()));
        }
        hex::decode(digits)
            .map(Self)
            .map_err(|e| GatewayError::InvalidExtrinsic(e.to_string()))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Account submitting the extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayAccount {
    pub address: String,
    /// Explicit nonce; the gateway picks the next one when unset.
    pub nonce: Option<u64>,
}

impl GatewayAccount {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            nonce: None,
        }
    }

    pub fn with_nonce(mut self, nonce: Option<u64>) -> Self {
        self.nonce = nonce;
        self
    }
}

/// Connection settings for [`GatewayClient`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080".to_string(),
            poll_interval: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(20),
        }
    }
}

/// [`ChainClient`] backed by the JSON gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base: String,
    poll_interval: Duration,
    registry: ErrorRegistry,
}

impl GatewayClient {
    /// Connect to the gateway and load its module error metadata.
    ///
    /// Fails with [`GatewayError::ConnectTimeout`] when the metadata fetch
    /// does not complete within `connect_timeout`.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        let mut client = Self {
            http,
            base: config.endpoint.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval,
            registry: ErrorRegistry::new(),
        };

        let entries: Vec<ModuleErrorEntry> =
            tokio::time::timeout(config.connect_timeout, client.get_json("/metadata/errors"))
                .await
                .map_err(|_| GatewayError::ConnectTimeout {
                    endpoint: client.base.clone(),
                    timeout: config.connect_timeout,
                })??;
        client.registry = entries.into_iter().collect();

        info!(
            endpoint = %client.base,
            module_errors = client.registry.len(),
            "Connected to gateway"
        );
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        fetch_json(&self.http, &self.url(path)).await
    }

    fn subscription<T>(&self) -> (mpsc::Sender<T>, Subscription<T>, Poller) {
        let token = CancellationToken::new();
        let hook_token = token.clone();
        let (tx, subscription) =
            Subscription::channel(STREAM_CAPACITY, move || hook_token.cancel());
        let poller = Poller::new(self.http.clone(), token, self.poll_interval);
        (tx, subscription, poller)
    }
}

async fn fetch_json<T: DeserializeOwned>(http: &Client, url: &str) -> Result<T, GatewayError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

/// Periodic GET loop owned by one subscription.
///
/// Stops when the token is cancelled by the subscription's unsubscribe hook.
struct Poller {
    http: Client,
    token: CancellationToken,
    interval: tokio::time::Interval,
}

impl Poller {
    fn new(http: Client, token: CancellationToken, period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            http,
            token,
            interval,
        }
    }

    /// Wait for the next tick and fetch `url`.
    ///
    /// Returns `None` once cancelled. Fetch failures are logged and retried on
    /// the next tick.
    async fn next<T: DeserializeOwned>(&mut self, url: &str) -> Option<T> {
        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return None,
                _ = self.interval.tick() => {}
            }
            let result = tokio::select! {
                biased;
                _ = self.token.cancelled() => return None,
                result = fetch_json(&self.http, url) => result,
            };
            match result {
                Ok(value) => return Some(value),
                Err(e) => warn!(error = %e, url, "Gateway poll failed"),
            }
        }
    }

    /// Forward status updates until a terminal status or cancellation.
    async fn run_status(mut self, url: String, tx: mpsc::Sender<StatusUpdate>) {
        let mut last = None;
        while let Some(update) = self.next::<StatusUpdate>(&url).await {
            // Only exact repeats are dropped; a repeated status can carry new events
            if last.as_ref() == Some(&update) {
                continue;
            }
            last = Some(update.clone());
            let terminal = update.status.is_terminal();
            if tx.send(update).await.is_err() || terminal {
                break;
            }
        }
        debug!(url = %url, "Status poller stopped");
    }

    /// Forward each new block's events until cancellation.
    async fn run_events(mut self, base: String, tx: mpsc::Sender<ChainEventBatch>) {
        let mut after: Option<u64> = None;
        loop {
            let url = match after {
                Some(number) => format!("{base}/events?after={number}"),
                None => format!("{base}/events"),
            };
            let Some(response) = self.next::<EventsResponse>(&url).await else {
                break;
            };
            for block in response.blocks {
                if after.is_some_and(|seen| block.number <= seen) {
                    continue;
                }
                after = Some(block.number);
                debug!(block = block.number, hash = %block.hash, events = block.events.len(), "New block events");
                if tx.send(block.events).await.is_err() {
                    return;
                }
            }
        }
        debug!("Event poller stopped");
    }
}

#[async_trait]
impl ChainClient for GatewayClient {
    type Transaction = SignedExtrinsic;
    type Signer = GatewayAccount;

    async fn submit(
        &self,
        transaction: SignedExtrinsic,
        signer: &GatewayAccount,
    ) -> Result<Subscription<StatusUpdate>, ClientError> {
        let request = SubmitTransactionRequest {
            transaction_hex: transaction.to_hex(),
            account: signer.address.clone(),
            nonce: signer.nonce,
        };

        let response = self
            .http
            .post(self.url("/transactions"))
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::from)?;
        let status = response.status();
        let body: SubmitTransactionResponse = response.json().await.map_err(GatewayError::from)?;

        let hash = match (body.accepted, body.hash) {
            (true, Some(hash)) => hash,
            (true, None) => {
                return Err(ClientError::Decode(
                    "accepted submission without a transaction hash".into(),
                ))
            }
            (false, _) => {
                return Err(ClientError::Rejected(
                    body.error
                        .unwrap_or_else(|| format!("gateway returned {}", status.as_u16())),
                ))
            }
        };
        debug!(tx_hash = %hash, "Extrinsic accepted by gateway");

        let url = self.url(&format!("/transactions/{}/status", hash.to_hex()));
        let (tx, subscription, poller) = self.subscription();
        tokio::spawn(poller.run_status(url, tx));
        Ok(subscription)
    }

    async fn subscribe_system_events(&self) -> Result<Subscription<ChainEventBatch>, ClientError> {
        let (tx, subscription, poller) = self.subscription();
        tokio::spawn(poller.run_events(self.base.clone(), tx));
        Ok(subscription)
    }

    fn decode_module_error(&self, error: &ModuleError) -> Result<ModuleErrorMeta, ClientError> {
        self.registry.find(error).cloned()
    }

    async fn health(&self) -> Result<NodeHealth, ClientError> {
        Ok(self.get_json("/health").await?)
    }

    async fn free_balance(&self, signer: &GatewayAccount) -> Result<u128, ClientError> {
        let response: BalanceResponse = self
            .get_json(&format!("/accounts/{}/balance", signer.address))
            .await?;
        response
            .free()
            .map_err(|e| ClientError::Decode(format!("free balance {:?}: {e}", response.free)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrinsic_from_hex() {
        let extrinsic = SignedExtrinsic::from_hex("  0xdeadbeef\n").unwrap();
        assert_eq!(extrinsic.len(), 4);
        assert_eq!(extrinsic.to_hex(), "0xdeadbeef");

        let bare = SignedExtrinsic::from_hex("00ff").unwrap();
        assert_eq!(bare, SignedExtrinsic::new(vec![0x00, 0xff]));
    }

    #[test]
    fn test_extrinsic_rejects_bad_hex() {
        assert!(matches!(
            SignedExtrinsic::from_hex("0x"),
            Err(GatewayError::InvalidExtrinsic(_))
        ));
        assert!(matches!(
            SignedExtrinsic::from_hex("0xabc"),
            Err(GatewayError::InvalidExtrinsic(_))
        ));
        assert!(matches!(
            SignedExtrinsic::from_hex("nothex"),
            Err(GatewayError::InvalidExtrinsic(_))
        ));
    }

    #[test]
    fn test_gateway_error_maps_to_client_error() {
        let rejected: ClientError = GatewayError::InvalidExtrinsic("empty extrinsic".into()).into();
        assert!(matches!(rejected, ClientError::Rejected(_)));

        let transport: ClientError = GatewayError::Status {
            status: 503,
            body: "syncing".into(),
        }
        .into();
        match transport {
            ClientError::Transport(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_account_nonce() {
        let account = GatewayAccount::new("5GrwvaEF").with_nonce(Some(7));
        assert_eq!(account.nonce, Some(7));
        assert_eq!(GatewayAccount::new("5GrwvaEF").nonce, None);
    }

    #[tokio::test]
    async fn test_unsubscribe_cancels_poller() {
        let client = GatewayClient {
            http: Client::new(),
            base: "http://127.0.0.1:9".to_string(),
            poll_interval: Duration::from_secs(3600),
            registry: ErrorRegistry::new(),
        };
        let (tx, mut subscription, poller) = client.subscription::<StatusUpdate>();
        let token = poller.token.clone();
        let handle = tokio::spawn(poller.run_status("http://127.0.0.1:9/x".into(), tx));

        subscription.unsubscribe();
        assert!(token.is_cancelled());
        handle.await.unwrap();
    }
}
