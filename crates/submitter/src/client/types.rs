//! Types for gateway communication.

use serde::{Deserialize, Serialize};
use zkv_types::{BlockHash, ChainEvent};

/// Request to submit a signed extrinsic.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    pub transaction_hex: String,
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

/// Response from extrinsic submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTransactionResponse {
    pub accepted: bool,
    #[serde(default)]
    pub hash: Option<BlockHash>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Events of one block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEvents {
    pub number: u64,
    pub hash: BlockHash,
    #[serde(default)]
    pub events: Vec<ChainEvent>,
}

/// Response from the events endpoint, oldest block first.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub blocks: Vec<BlockEvents>,
}

/// Account balance. Amounts are decimal strings since they exceed `u64`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub free: String,
}

impl BalanceResponse {
    pub fn free(&self) -> Result<u128, std::num::ParseIntError> {
        self.free.trim().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_omits_missing_nonce() {
        let request = SubmitTransactionRequest {
            transaction_hex: "0x00".into(),
            account: "5GrwvaEF".into(),
            nonce: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("nonce"));
    }

    #[test]
    fn test_submit_response_rejected() {
        let response: SubmitTransactionResponse =
            serde_json::from_str(r#"{"accepted": false, "error": "Invalid Transaction: bad proof"}"#)
                .unwrap();
        assert!(!response.accepted);
        assert!(response.hash.is_none());
        assert_eq!(response.error.as_deref(), Some("Invalid Transaction: bad proof"));
    }

    #[test]
    fn test_balance_response() {
        let response: BalanceResponse =
            serde_json::from_str(r#"{"free": "340282366920938463463374607431768211455"}"#).unwrap();
        assert_eq!(response.free().unwrap(), u128::MAX);

        let bad: BalanceResponse = serde_json::from_str(r#"{"free": "-1"}"#).unwrap();
        assert!(bad.free().is_err());
    }

    #[test]
    fn test_events_response() {
        let json = format!(
            r#"{{"blocks": [{{"number": 10, "hash": "0x{}", "events": [
                {{"section": "poe", "method": "NewAttestation", "fields": [
                    {{"type": "u64", "value": 3}},
                    {{"type": "hash", "value": "0x{}"}}
                ]}}
            ]}}]}}"#,
            "01".repeat(32),
            "02".repeat(32)
        );
        let response: EventsResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(response.blocks.len(), 1);
        assert_eq!(response.blocks[0].number, 10);
        assert_eq!(response.blocks[0].events[0].fields.len(), 2);
    }
}
