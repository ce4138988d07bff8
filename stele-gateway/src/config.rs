//! Gateway configuration.

use std::str::FromStr;

use bitcoin::Amount;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
pub use crate::keeper::KeeperEndpoint;
use crate::{
    DEFAULT_ANCHOR_COST_SATS, DEFAULT_FEE_RATE_SAT_VB, DEFAULT_MARKER, DEFAULT_MAX_DATA_BYTES,
    DUST_LIMIT_SATS,
};

/// Target ledger network.
///
/// A closed set: an unrecognized name is a construction-time error, never a
/// silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin mainnet.
    Mainnet,
    /// Bitcoin testnet.
    #[default]
    Testnet,
    /// Bitcoin regtest (local development).
    Regtest,
}

impl Network {
    /// Get the network name.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }

    /// Convert to bitcoin crate network type.
    pub fn to_bitcoin_network(&self) -> bitcoin::Network {
        match self {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
            Network::Regtest => bitcoin::Network::Regtest,
        }
    }
}

impl FromStr for Network {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(GatewayError::Config(format!(
                "unknown network: {other} (expected mainnet, testnet or regtest)"
            ))),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for the anchoring gateway.
///
/// Read-only after startup; constructed explicitly and handed to
/// [`AnchorGateway::new`](crate::AnchorGateway::new), never looked up
/// through ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Target network.
    pub network: Network,

    /// Maximum size of the data-carrying output in bytes.
    pub max_data_bytes: usize,

    /// Application marker prepended to every anchored payload.
    #[serde(with = "hex::serde")]
    pub marker: Vec<u8>,

    /// Fixed value sent to the destination address per anchor.
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub anchor_cost: Amount,

    /// Fee rate in sat/vB.
    pub fee_rate_sat_vb: u64,

    /// Whether change from an unconfirmed anchor transaction may fund the
    /// next one.
    pub allow_spend_unconfirmed: bool,

    /// Keeper endpoints for optional replication (consumed only by the
    /// out-of-scope replication collaborator).
    pub keepers: Vec<KeeperEndpoint>,
}

impl GatewayConfig {
    /// Create a configuration with defaults for the given network.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            max_data_bytes: DEFAULT_MAX_DATA_BYTES,
            marker: DEFAULT_MARKER.to_vec(),
            anchor_cost: Amount::from_sat(DEFAULT_ANCHOR_COST_SATS),
            fee_rate_sat_vb: DEFAULT_FEE_RATE_SAT_VB,
            allow_spend_unconfirmed: false,
            keepers: Vec::new(),
        }
    }

    /// Set the data-output byte budget.
    pub fn with_max_data_bytes(mut self, max: usize) -> Self {
        self.max_data_bytes = max;
        self
    }

    /// Set the application marker.
    pub fn with_marker(mut self, marker: impl Into<Vec<u8>>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set the anchor cost.
    pub fn with_anchor_cost(mut self, cost: Amount) -> Self {
        self.anchor_cost = cost;
        self
    }

    /// Set the fee rate in sat/vB.
    pub fn with_fee_rate(mut self, sat_per_vb: u64) -> Self {
        self.fee_rate_sat_vb = sat_per_vb;
        self
    }

    /// Allow spending change from unconfirmed anchor transactions.
    pub fn with_spend_unconfirmed(mut self, allow: bool) -> Self {
        self.allow_spend_unconfirmed = allow;
        self
    }

    /// Set the keeper endpoints.
    pub fn with_keepers(mut self, keepers: Vec<KeeperEndpoint>) -> Self {
        self.keepers = keepers;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.marker.len() >= self.max_data_bytes {
            return Err(GatewayError::Config(format!(
                "marker ({} bytes) leaves no room in the {}-byte data budget",
                self.marker.len(),
                self.max_data_bytes
            )));
        }

        if self.anchor_cost.to_sat() < DUST_LIMIT_SATS {
            return Err(GatewayError::Config(format!(
                "anchor cost {} sat is below the {} sat dust limit",
                self.anchor_cost.to_sat(),
                DUST_LIMIT_SATS
            )));
        }

        if self.fee_rate_sat_vb == 0 {
            return Err(GatewayError::Config("fee rate must be at least 1 sat/vB".into()));
        }

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(Network::Testnet)
    }
}
