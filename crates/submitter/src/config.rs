//! Submitter configuration.
//!
//! Loaded from a TOML file, then overridden by `ZKV_ENDPOINT` / `ZKV_ACCOUNT`
//! from the environment and finally by command-line flags.
//!
//! ```toml
//! endpoint = "http://127.0.0.1:8080"
//! account = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
//! poll_interval_ms = 1000
//! wait_for_sync = true
//!
//! [tracker]
//! finalization_timeout_secs = 60
//! attestation_timeout_secs = 360
//! ```

use crate::client::{GatewayAccount, GatewayConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use zkv_tracker::TrackerConfig;

/// Environment variable overriding the gateway endpoint.
pub const ENDPOINT_ENV: &str = "ZKV_ENDPOINT";
/// Environment variable overriding the submitting account.
pub const ACCOUNT_ENV: &str = "ZKV_ACCOUNT";

const ACCOUNT_PLACEHOLDER: &str = "INSERT_ACCOUNT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Required setting {0} is not set")]
    Missing(&'static str),

    #[error("Setting {0} still holds the placeholder value")]
    Placeholder(&'static str),

    #[error("Invalid endpoint {0}: expected an http:// or https:// URL")]
    InvalidEndpoint(String),
}

/// Timeouts for the `[tracker]` table, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerSection {
    pub finalization_timeout_secs: u64,
    pub finalization_progress_secs: u64,
    pub attestation_timeout_secs: u64,
    pub attestation_progress_secs: u64,
}

impl Default for TrackerSection {
    fn default() -> Self {
        let defaults = TrackerConfig::default();
        Self {
            finalization_timeout_secs: defaults.finalization_timeout.as_secs(),
            finalization_progress_secs: defaults.finalization_progress_period.as_secs(),
            attestation_timeout_secs: defaults.attestation_timeout.as_secs(),
            attestation_progress_secs: defaults.attestation_progress_period.as_secs(),
        }
    }
}

impl TrackerSection {
    pub fn to_tracker_config(&self) -> TrackerConfig {
        TrackerConfig::default()
            .with_finalization_timeout(Duration::from_secs(self.finalization_timeout_secs))
            .with_attestation_timeout(Duration::from_secs(self.attestation_timeout_secs))
            .with_progress_periods(
                Duration::from_secs(self.finalization_progress_secs.max(1)),
                Duration::from_secs(self.attestation_progress_secs.max(1)),
            )
    }
}

/// Complete submitter configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmitterConfig {
    /// Gateway base URL.
    pub endpoint: String,
    /// Submitting account address.
    pub account: String,
    /// Explicit account nonce.
    pub nonce: Option<u64>,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Wait for the node to finish syncing before submitting.
    pub wait_for_sync: bool,
    /// Give up waiting for sync after this many seconds; unbounded when unset.
    pub sync_timeout_secs: Option<u64>,
    pub tracker: TrackerSection,
    /// Deadlines set from the command line, taking precedence over `tracker`.
    #[serde(skip)]
    pub finalization_timeout: Option<Duration>,
    #[serde(skip)]
    pub attestation_timeout: Option<Duration>,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        let gateway = GatewayConfig::default();
        Self {
            endpoint: gateway.endpoint,
            account: String::new(),
            nonce: None,
            poll_interval_ms: gateway.poll_interval.as_millis() as u64,
            request_timeout_secs: gateway.request_timeout.as_secs(),
            connect_timeout_secs: gateway.connect_timeout.as_secs(),
            wait_for_sync: false,
            sync_timeout_secs: None,
            tracker: TrackerSection::default(),
            finalization_timeout: None,
            attestation_timeout: None,
        }
    }
}

impl SubmitterConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `ZKV_ENDPOINT` / `ZKV_ACCOUNT` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides from an arbitrary lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(account) = lookup(ACCOUNT_ENV).filter(|v| !v.is_empty()) {
            self.account = account;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn with_finalization_timeout(mut self, timeout: Duration) -> Self {
        self.finalization_timeout = Some(timeout);
        self
    }

    pub fn with_attestation_timeout(mut self, timeout: Duration) -> Self {
        self.attestation_timeout = Some(timeout);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Check that every required setting is present and usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Missing(ENDPOINT_ENV));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
        }

        let account = self.account.trim();
        if account.is_empty() {
            return Err(ConfigError::Missing(ACCOUNT_ENV));
        }
        if account == ACCOUNT_PLACEHOLDER {
            return Err(ConfigError::Placeholder(ACCOUNT_ENV));
        }
        Ok(())
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            endpoint: self.endpoint.trim().to_string(),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn account(&self) -> GatewayAccount {
        GatewayAccount::new(self.account.trim()).with_nonce(self.nonce)
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        let mut config = self.tracker.to_tracker_config();
        if let Some(timeout) = self.finalization_timeout {
            config = config.with_finalization_timeout(timeout);
        }
        if let Some(timeout) = self.attestation_timeout {
            config = config.with_attestation_timeout(timeout);
        }
        config
    }

    pub fn sync_timeout(&self) -> Option<Duration> {
        self.sync_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn valid() -> SubmitterConfig {
        SubmitterConfig::default().with_account("5GrwvaEF")
    }

    #[test]
    fn test_defaults_match_tracker_defaults() {
        let config = SubmitterConfig::default();
        let tracker = config.tracker_config();
        assert_eq!(tracker.finalization_timeout, Duration::from_secs(60));
        assert_eq!(tracker.attestation_timeout, Duration::from_secs(360));
        assert_eq!(config.gateway_config().connect_timeout, Duration::from_secs(20));
        assert!(!config.wait_for_sync);
    }

    #[test]
    fn test_parse_toml() {
        let config = SubmitterConfig::from_toml_str(
            r#"
            endpoint = "https://gateway.example:443/"
            account = "5GrwvaEF"
            nonce = 12
            poll_interval_ms = 250
            wait_for_sync = true
            sync_timeout_secs = 30

            [tracker]
            finalization_timeout_secs = 90
            attestation_progress_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.nonce, Some(12));
        assert_eq!(config.account().nonce, Some(12));
        assert_eq!(config.gateway_config().poll_interval, Duration::from_millis(250));
        assert_eq!(config.sync_timeout(), Some(Duration::from_secs(30)));

        let tracker = config.tracker_config();
        assert_eq!(tracker.finalization_timeout, Duration::from_secs(90));
        assert_eq!(tracker.attestation_timeout, Duration::from_secs(360));
        assert_eq!(tracker.attestation_progress_period, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_overrides_keep_subsecond_precision() {
        let config = SubmitterConfig::from_toml_str("[tracker]\nfinalization_timeout_secs = 90")
            .unwrap()
            .with_finalization_timeout(Duration::from_millis(500))
            .with_attestation_timeout(Duration::from_millis(2_250));

        let tracker = config.tracker_config();
        assert_eq!(tracker.finalization_timeout, Duration::from_millis(500));
        assert_eq!(tracker.attestation_timeout, Duration::from_millis(2_250));
        assert_eq!(tracker.finalization_progress_period, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_rejects_unknown_types() {
        let err = SubmitterConfig::from_toml_str("poll_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "account = \"5GrwvaEF\"").unwrap();

        let config = SubmitterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.account, "5GrwvaEF");
        assert_eq!(config.endpoint, GatewayConfig::default().endpoint);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SubmitterConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENDPOINT_ENV, "http://10.0.0.1:9944"),
            (ACCOUNT_ENV, "5FHneW46"),
        ]
        .into_iter()
        .collect();

        let config = valid().with_overrides_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.endpoint, "http://10.0.0.1:9944");
        assert_eq!(config.account, "5FHneW46");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = valid().with_overrides_from(|_| Some(String::new()));
        assert_eq!(config.account, "5GrwvaEF");
    }

    #[test]
    fn test_validate_rejects_missing_account() {
        let err = SubmitterConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ACCOUNT_ENV)));
    }

    #[test]
    fn test_validate_rejects_placeholder() {
        let err = valid().with_account("INSERT_ACCOUNT").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder(_)));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        assert!(matches!(
            valid().with_endpoint("").validate(),
            Err(ConfigError::Missing(ENDPOINT_ENV))
        ));
        assert!(matches!(
            valid().with_endpoint("ws://127.0.0.1:9944").validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }
}
