//! Test helpers for proof submission tracking.
//!
//! [`MockChain`] is an in-memory [`ChainClient`] that replays scripted
//! status updates and event batches on tokio's clock, and counts every
//! subscription and unsubscribe so tests can assert nothing leaks.

pub mod fixtures;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zkv_core::{ChainClient, ClientError, ErrorRegistry, NodeHealth, Subscription};
use zkv_types::{ChainEventBatch, ModuleError, ModuleErrorMeta, StatusUpdate};

/// A scripted item delivered `delay` after the previous one.
#[derive(Debug, Clone)]
pub struct Scripted<T> {
    pub delay: Duration,
    pub item: T,
}

/// Subscription and call counters shared with the test body.
#[derive(Debug, Default)]
pub struct MockCounters {
    pub submissions: AtomicUsize,
    pub status_unsubscribes: AtomicUsize,
    pub event_subscriptions: AtomicUsize,
    pub event_unsubscribes: AtomicUsize,
    pub health_checks: AtomicUsize,
    pub balance_checks: AtomicUsize,
}

impl MockCounters {
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn status_unsubscribes(&self) -> usize {
        self.status_unsubscribes.load(Ordering::SeqCst)
    }

    pub fn event_subscriptions(&self) -> usize {
        self.event_subscriptions.load(Ordering::SeqCst)
    }

    pub fn event_unsubscribes(&self) -> usize {
        self.event_unsubscribes.load(Ordering::SeqCst)
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    pub fn balance_checks(&self) -> usize {
        self.balance_checks.load(Ordering::SeqCst)
    }
}

/// Balance a fresh [`MockChain`] reports for the signer.
pub const DEFAULT_FREE_BALANCE: u128 = 1_000_000_000_000_000_000;

/// In-memory chain client driven by a script.
pub struct MockChain {
    registry: ErrorRegistry,
    status_script: Vec<Scripted<StatusUpdate>>,
    event_script: Vec<Scripted<ChainEventBatch>>,
    health_script: Mutex<VecDeque<NodeHealth>>,
    free_balance: u128,
    submit_error: Option<ClientError>,
    subscribe_error: Option<ClientError>,
    /// Keep streams open after the script is exhausted.
    hold_open: bool,
    counters: Arc<MockCounters>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    /// A chain with an empty script whose streams stay open.
    pub fn new() -> Self {
        Self {
            registry: ErrorRegistry::new(),
            status_script: Vec::new(),
            event_script: Vec::new(),
            health_script: Mutex::new(VecDeque::new()),
            free_balance: DEFAULT_FREE_BALANCE,
            submit_error: None,
            subscribe_error: None,
            hold_open: true,
            counters: Arc::new(MockCounters::default()),
        }
    }

    /// Use the given metadata for module error lookups.
    pub fn with_registry(mut self, registry: ErrorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Queue a status update `delay` after the previous one.
    pub fn with_status(mut self, delay: Duration, update: StatusUpdate) -> Self {
        self.status_script.push(Scripted {
            delay,
            item: update,
        });
        self
    }

    /// Queue an event batch `delay` after the previous one.
    pub fn with_events(mut self, delay: Duration, batch: ChainEventBatch) -> Self {
        self.event_script.push(Scripted { delay, item: batch });
        self
    }

    /// Health responses, returned in order; the last one repeats.
    pub fn with_health(self, responses: Vec<NodeHealth>) -> Self {
        *self.health_script.lock() = responses.into();
        self
    }

    /// Free balance reported for the signer.
    pub fn with_free_balance(mut self, free: u128) -> Self {
        self.free_balance = free;
        self
    }

    /// Make `submit` fail.
    pub fn failing_submit(mut self, error: ClientError) -> Self {
        self.submit_error = Some(error);
        self
    }

    /// Make `subscribe_system_events` fail.
    pub fn failing_subscribe(mut self, error: ClientError) -> Self {
        self.subscribe_error = Some(error);
        self
    }

    /// Close streams once their script is exhausted.
    pub fn closing_streams(mut self) -> Self {
        self.hold_open = false;
        self
    }

    /// Counters shared with this chain.
    pub fn counters(&self) -> Arc<MockCounters> {
        self.counters.clone()
    }

    fn replay<T: Send + 'static>(
        script: Vec<Scripted<T>>,
        hold_open: bool,
        on_unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Subscription<T> {
        let (tx, subscription) = Subscription::channel(script.len().max(1), on_unsubscribe);
        tokio::spawn(async move {
            for Scripted { delay, item } in script {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(item).await.is_err() {
                    return;
                }
            }
            if hold_open {
                tx.closed().await;
            }
        });
        subscription
    }
}

#[async_trait]
impl ChainClient for MockChain {
    type Transaction = Vec<u8>;
    type Signer = ();

    async fn submit(
        &self,
        _transaction: Self::Transaction,
        _signer: &Self::Signer,
    ) -> Result<Subscription<StatusUpdate>, ClientError> {
        self.counters.submissions.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }

        let counters = self.counters.clone();
        Ok(Self::replay(
            self.status_script.clone(),
            self.hold_open,
            move || {
                counters.status_unsubscribes.fetch_add(1, Ordering::SeqCst);
            },
        ))
    }

    async fn subscribe_system_events(&self) -> Result<Subscription<ChainEventBatch>, ClientError> {
        if let Some(err) = &self.subscribe_error {
            return Err(err.clone());
        }
        self.counters
            .event_subscriptions
            .fetch_add(1, Ordering::SeqCst);

        let counters = self.counters.clone();
        Ok(Self::replay(
            self.event_script.clone(),
            self.hold_open,
            move || {
                counters.event_unsubscribes.fetch_add(1, Ordering::SeqCst);
            },
        ))
    }

    fn decode_module_error(&self, error: &ModuleError) -> Result<ModuleErrorMeta, ClientError> {
        self.registry.find(error).cloned()
    }

    async fn health(&self) -> Result<NodeHealth, ClientError> {
        self.counters.health_checks.fetch_add(1, Ordering::SeqCst);
        let mut script = self.health_script.lock();
        let health = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };
        Ok(health.unwrap_or_default())
    }

    async fn free_balance(&self, _signer: &Self::Signer) -> Result<u128, ClientError> {
        self.counters.balance_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.free_balance)
    }
}
