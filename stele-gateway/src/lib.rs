//! Bitcoin data-anchoring gateway.
//!
//! Accepts an arbitrary byte payload, embeds it (prefixed by a fixed
//! application marker) into an OP_RETURN output of a Bitcoin transaction,
//! pays a fixed anchor cost to an address derived from the client-supplied
//! public key, funds and signs the transaction from a locally managed
//! wallet, broadcasts it, and returns the txid bound to the request's
//! content hash.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       ANCHORING PIPELINE                          │
//! │                                                                   │
//! │  AnchorRequest (payload, destination key, content id)             │
//! │        │                                                          │
//! │        ▼                                                          │
//! │  1. Budget Validator                                              │
//! │     └─ marker ‖ payload must fit max_data_bytes                  │
//! │        │                                                          │
//! │        ▼                                                          │
//! │  2. Address Resolver          3. Transaction Drafter              │
//! │     └─ pubkey → P2PKH addr       └─ payment out + OP_RETURN out  │
//! │        │                                                          │
//! │        ▼                                                          │
//! │  4. Funding & Broadcast Engine                                    │
//! │     └─ select coins → sign → mark spent   (wallet critical        │
//! │        section) → broadcast outside the lock                      │
//! │        │                                                          │
//! │        ▼                                                          │
//! │  AnchorResponse (content id, txid | classified failure)           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Broadcast is fire-and-forget: a successful response means the
//! transaction was accepted for relay, not that it is confirmed.
//!
//! # Example
//!
//! ```ignore
//! use stele_gateway::{AnchorGateway, AnchorRequest, GatewayConfig, Network, Wallet};
//!
//! let config = GatewayConfig::new(Network::Regtest);
//! let wallet = Wallet::generate(Network::Regtest)?;
//! let gateway = AnchorGateway::new(config, wallet.into(), relay);
//!
//! let response = gateway.anchor(&AnchorRequest::new(payload, pubkey_bytes));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod keeper;
pub mod mock;
pub mod payload;
pub mod pipeline;
pub mod relay;
pub mod tx;
pub mod wallet;

pub use config::{GatewayConfig, Network};
pub use engine::{Anchored, FundingEngine};
pub use error::{FailureKind, GatewayError, Result};
pub use keeper::{KeeperEndpoint, KeeperReplicator};
pub use mock::MockRelay;
pub use pipeline::{AnchorGateway, AnchorOutcome, AnchorRequest, AnchorResponse};
pub use relay::{CoreRelay, Relay, RelayConfig};
pub use tx::TransactionDraft;
pub use wallet::{Utxo, Wallet};

/// Default maximum size of the data-carrying output (the 80-byte OP_RETURN
/// relay standard).
pub const DEFAULT_MAX_DATA_BYTES: usize = 80;

/// Default application marker prepended to every anchored payload.
pub const DEFAULT_MARKER: &[u8] = b"STL1";

/// Output value below which a change output is folded into the fee.
pub const DUST_LIMIT_SATS: u64 = 546;

/// Default fee rate in sat/vB.
pub const DEFAULT_FEE_RATE_SAT_VB: u64 = 10;

/// Default anchor cost in satoshis paid to the destination address.
pub const DEFAULT_ANCHOR_COST_SATS: u64 = 10_000;
