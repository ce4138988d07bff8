//! Error types for the anchoring gateway.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while anchoring a payload.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Marker plus payload exceed the data-output budget. `overflow` is
    /// `max_data_bytes - (marker + payload)`, negative by construction
    /// and surfaced signed to the caller.
    #[error("data too long by {overflow} bytes")]
    PayloadTooLarge {
        /// Remaining budget, negative when exceeded.
        overflow: i64,
    },

    /// The client-supplied destination key is not a valid EC point.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The wallet cannot cover the anchor cost plus the network fee.
    #[error("not enough funds: need {need} sat, have {have} sat")]
    NotEnoughFunds {
        /// Satoshis required (anchor cost + fee).
        need: u64,
        /// Satoshis spendable.
        have: u64,
    },

    /// Transaction building error.
    #[error("transaction building failed: {0}")]
    TxBuild(String),

    /// Signing error.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Transaction broadcast error.
    #[error("transaction broadcast failed: {0}")]
    Broadcast(String),

    /// RPC connection error.
    #[error("RPC connection failed: {0}")]
    RpcConnection(String),

    /// Network mismatch between config and the connected node.
    #[error("network mismatch: expected {expected}, got {got}")]
    NetworkMismatch {
        /// Expected network.
        expected: String,
        /// Actual network.
        got: String,
    },

    /// Invalid data-carrying script.
    #[error("invalid data script: {0}")]
    InvalidDataScript(String),

    /// Keeper replication error.
    #[error("keeper replication failed: {0}")]
    Keeper(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure classification surfaced to callers in an [`AnchorResponse`].
///
/// `NotEnoughFunds` is deliberately distinct from the input errors: it
/// signals an operational funding problem (replenish the wallet) rather
/// than a bad request.
///
/// [`AnchorResponse`]: crate::pipeline::AnchorResponse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Payload exceeds the data-output budget; shrink and retry.
    PayloadTooLarge,
    /// Malformed destination key; fix and retry.
    InvalidPublicKey,
    /// Wallet cannot fund the transaction; replenish the wallet.
    NotEnoughFunds,
    /// Network submission failed; not retried by the gateway.
    Broadcast,
    /// Anything else.
    Internal,
}

impl GatewayError {
    /// Classify this error for the response record.
    pub fn classify(&self) -> FailureKind {
        match self {
            GatewayError::PayloadTooLarge { .. } => FailureKind::PayloadTooLarge,
            GatewayError::InvalidPublicKey(_) => FailureKind::InvalidPublicKey,
            GatewayError::NotEnoughFunds { .. } => FailureKind::NotEnoughFunds,
            GatewayError::Broadcast(_) | GatewayError::RpcConnection(_) => FailureKind::Broadcast,
            _ => FailureKind::Internal,
        }
    }
}
