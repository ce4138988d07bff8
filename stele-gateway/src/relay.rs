//! Peer-network broadcast relay.

use bitcoin::consensus::encode;
use bitcoin::{Transaction, Txid};
use bitcoincore_rpc::{Auth, Client, RpcApi};
use tracing::info;

use crate::config::Network;
use crate::error::{GatewayError, Result};

/// Submits signed transactions to the peer network for relay.
///
/// Fire-and-forget: a successful broadcast means the node accepted the
/// transaction for relay, nothing more. The gateway never waits for
/// confirmation and never retries.
pub trait Relay: Send + Sync {
    /// Broadcast a signed transaction, returning its txid.
    fn broadcast(&self, tx: &Transaction) -> Result<Txid>;
}

/// Connection settings for [`CoreRelay`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// RPC endpoint URL.
    pub rpc_url: String,
    /// RPC username (optional).
    pub rpc_user: Option<String>,
    /// RPC password (optional).
    pub rpc_password: Option<String>,
    /// Wallet name (optional, for multi-wallet nodes).
    pub wallet: Option<String>,
}

impl RelayConfig {
    /// Create a new relay configuration.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            rpc_user: None,
            rpc_password: None,
            wallet: None,
        }
    }

    /// Set RPC authentication.
    pub fn with_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.rpc_user = Some(user.into());
        self.rpc_password = Some(password.into());
        self
    }

    /// Set wallet name.
    pub fn with_wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet = Some(wallet.into());
        self
    }
}

/// Relay backed by a Bitcoin Core node over RPC.
#[derive(Debug)]
pub struct CoreRelay {
    client: Client,
}

impl CoreRelay {
    /// Connect to the node and verify it serves the expected network.
    pub fn connect(config: RelayConfig, network: Network) -> Result<Self> {
        if config.rpc_url.is_empty() {
            return Err(GatewayError::Config("RPC URL is required".into()));
        }

        let auth = match (&config.rpc_user, &config.rpc_password) {
            (Some(user), Some(pass)) => Auth::UserPass(user.clone(), pass.clone()),
            _ => Auth::None,
        };

        let url = if let Some(ref wallet) = config.wallet {
            format!("{}/wallet/{}", config.rpc_url, wallet)
        } else {
            config.rpc_url.clone()
        };

        let client =
            Client::new(&url, auth).map_err(|e| GatewayError::RpcConnection(e.to_string()))?;

        let info = client
            .get_blockchain_info()
            .map_err(|e| GatewayError::RpcConnection(e.to_string()))?;

        let expected = network.to_bitcoin_network();
        if info.chain != expected {
            return Err(GatewayError::NetworkMismatch {
                expected: format!("{expected:?}"),
                got: format!("{:?}", info.chain),
            });
        }

        Ok(Self { client })
    }
}

impl Relay for CoreRelay {
    fn broadcast(&self, tx: &Transaction) -> Result<Txid> {
        let hex = encode::serialize_hex(tx);
        let txid = self
            .client
            .send_raw_transaction(hex)
            .map_err(|e| GatewayError::Broadcast(e.to_string()))?;

        info!(%txid, "transaction submitted for relay");
        Ok(txid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_builder() {
        let config = RelayConfig::new("http://localhost:18443")
            .with_auth("user", "pass")
            .with_wallet("anchoring");

        assert_eq!(config.rpc_url, "http://localhost:18443");
        assert_eq!(config.rpc_user, Some("user".to_string()));
        assert_eq!(config.wallet, Some("anchoring".to_string()));
    }

    #[test]
    fn test_connect_rejects_empty_url() {
        let err = CoreRelay::connect(RelayConfig::new(""), Network::Regtest).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
