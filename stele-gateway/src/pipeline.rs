//! Request-to-transaction pipeline and response assembly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stele_core::{hash, Hash};
use tracing::{info, warn};

use crate::address::resolve_destination;
use crate::config::GatewayConfig;
use crate::engine::{Anchored, FundingEngine};
use crate::error::{FailureKind, GatewayError, Result};
use crate::payload::compose_anchor_data;
use crate::relay::Relay;
use crate::tx::TransactionDraft;
use crate::wallet::Wallet;

/// One inbound anchoring call.
///
/// Immutable; discarded after the pipeline completes.
#[derive(Debug, Clone)]
pub struct AnchorRequest {
    /// The bytes to anchor.
    pub payload: Vec<u8>,
    /// Raw SEC-encoded public key naming the payment destination.
    pub destination_key: Vec<u8>,
    /// Content identifier correlating this request with its response.
    pub content_id: Hash,
}

impl AnchorRequest {
    /// Create a request; the content identifier is the payload's SHA-256.
    pub fn new(payload: impl Into<Vec<u8>>, destination_key: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        let content_id = hash(&payload);
        Self {
            payload,
            destination_key: destination_key.into(),
            content_id,
        }
    }
}

/// The anchoring outcome carried by a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnchorOutcome {
    /// The payload was committed to the ledger network.
    Committed {
        /// Identifier of the broadcast transaction.
        txid: String,
    },
    /// The request failed; `kind` tells the caller how to react.
    Failed {
        /// Failure classification.
        kind: FailureKind,
        /// Human-readable reason.
        reason: String,
    },
}

/// Confirmation record returned for every request — exactly one per
/// [`AnchorRequest`], success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorResponse {
    /// Content identifier echoed from the request.
    pub content_id: Hash,
    /// Success or classified failure.
    pub outcome: AnchorOutcome,
}

impl AnchorResponse {
    fn committed(content_id: Hash, txid: String) -> Self {
        Self {
            content_id,
            outcome: AnchorOutcome::Committed { txid },
        }
    }

    fn failed(content_id: Hash, error: &GatewayError) -> Self {
        Self {
            content_id,
            outcome: AnchorOutcome::Failed {
                kind: error.classify(),
                reason: error.to_string(),
            },
        }
    }

    /// Whether the payload was committed.
    pub fn is_committed(&self) -> bool {
        matches!(self.outcome, AnchorOutcome::Committed { .. })
    }

    /// The transaction identifier, if committed.
    pub fn txid(&self) -> Option<&str> {
        match &self.outcome {
            AnchorOutcome::Committed { txid } => Some(txid),
            AnchorOutcome::Failed { .. } => None,
        }
    }

    /// Serialize for the transport boundary.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The anchoring gateway.
///
/// Holds its collaborators explicitly — config, wallet and relay are
/// injected at assembly time, never reached through global state. The
/// pipeline is stateless per request and safe to invoke concurrently; the
/// wallet serializes funding internally.
pub struct AnchorGateway {
    config: GatewayConfig,
    engine: FundingEngine,
}

impl AnchorGateway {
    /// Assemble the pipeline. Fails if the configuration is invalid.
    pub fn new(config: GatewayConfig, wallet: Arc<Wallet>, relay: Arc<dyn Relay>) -> Result<Self> {
        config.validate()?;
        let engine = FundingEngine::new(
            wallet,
            relay,
            config.fee_rate_sat_vb,
            config.allow_spend_unconfirmed,
        );
        Ok(Self { config, engine })
    }

    /// The gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Anchor one request.
    ///
    /// Runs validate → resolve/draft → fund & broadcast, fails fast at
    /// each stage, and always produces a response correlated with the
    /// request's content identifier — errors are classified, never
    /// dropped.
    pub fn anchor(&self, request: &AnchorRequest) -> AnchorResponse {
        match self.try_anchor(request) {
            Ok(anchored) => {
                info!(
                    content_id = %request.content_id,
                    txid = %anchored.txid,
                    "payload anchored"
                );
                AnchorResponse::committed(request.content_id, anchored.txid.to_string())
            }
            Err(e) => {
                warn!(
                    content_id = %request.content_id,
                    error = %e,
                    "anchoring failed"
                );
                AnchorResponse::failed(request.content_id, &e)
            }
        }
    }

    fn try_anchor(&self, request: &AnchorRequest) -> Result<Anchored> {
        // Budget check first: an oversized payload never touches the wallet.
        let data = compose_anchor_data(
            &self.config.marker,
            &request.payload,
            self.config.max_data_bytes,
        )?;

        let destination = resolve_destination(&request.destination_key, self.config.network)?;
        let draft = TransactionDraft::new(destination, self.config.anchor_cost, &data)?;

        self.engine.send(&draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_is_payload_hash() {
        let request = AnchorRequest::new(&b"some payload"[..], &b"key"[..]);
        assert_eq!(request.content_id, hash(b"some payload"));
    }

    #[test]
    fn test_outcome_json_shape() {
        let response = AnchorResponse::committed(hash(b"p"), "ab".repeat(32));
        let json = response.to_json().unwrap();
        assert!(json.contains("\"status\": \"committed\""));
        assert!(json.contains("txid"));

        let response =
            AnchorResponse::failed(hash(b"p"), &GatewayError::NotEnoughFunds { need: 2, have: 1 });
        let json = response.to_json().unwrap();
        assert!(json.contains("\"status\": \"failed\""));
        assert!(json.contains("\"kind\": \"not_enough_funds\""));
    }

    #[test]
    fn test_gateway_rejects_invalid_config() {
        use crate::config::{GatewayConfig, Network};
        use crate::mock::MockRelay;
        use bitcoin::secp256k1::SecretKey;

        let config = GatewayConfig::new(Network::Regtest).with_fee_rate(0);
        let wallet =
            Wallet::new(SecretKey::from_slice(&[0x31; 32]).unwrap(), Network::Regtest).unwrap();

        let result = AnchorGateway::new(config, Arc::new(wallet), Arc::new(MockRelay::new()));
        assert!(result.is_err());
    }
}
