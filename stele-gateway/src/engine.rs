//! Funding & broadcast engine.

use std::sync::Arc;

use bitcoin::{Transaction, Txid};
use tracing::info;

use crate::error::Result;
use crate::relay::Relay;
use crate::tx::TransactionDraft;
use crate::wallet::Wallet;

/// Outcome of a successful funding + broadcast.
#[derive(Debug, Clone)]
pub struct Anchored {
    /// Identifier of the broadcast transaction.
    pub txid: Txid,
    /// The signed transaction record.
    pub tx: Transaction,
}

/// Funds drafts from the wallet and submits them for relay.
pub struct FundingEngine {
    wallet: Arc<Wallet>,
    relay: Arc<dyn Relay>,
    fee_rate_sat_vb: u64,
    allow_spend_unconfirmed: bool,
}

impl FundingEngine {
    /// Create an engine over the given wallet and relay.
    ///
    /// `allow_spend_unconfirmed` lets change from an unconfirmed anchor
    /// transaction fund later anchors.
    pub fn new(
        wallet: Arc<Wallet>,
        relay: Arc<dyn Relay>,
        fee_rate_sat_vb: u64,
        allow_spend_unconfirmed: bool,
    ) -> Self {
        Self {
            wallet,
            relay,
            fee_rate_sat_vb,
            allow_spend_unconfirmed,
        }
    }

    /// Fund, sign and broadcast a draft.
    ///
    /// Coin selection, signing and spent-marking happen inside the
    /// wallet's critical section; the broadcast happens outside it, since
    /// it only needs the already-signed transaction. Returns as soon as
    /// the relay accepts the transaction: no confirmation wait, no retry.
    ///
    /// If the broadcast fails after signing, the selected outputs stay
    /// reserved: the transaction may already have reached peers, and
    /// releasing them could double-spend.
    pub fn send(&self, draft: &TransactionDraft) -> Result<Anchored> {
        let tx = self
            .wallet
            .fund_and_sign(draft, self.fee_rate_sat_vb, self.allow_spend_unconfirmed)?;
        let txid = self.relay.broadcast(&tx)?;

        info!(%txid, cost_sat = draft.anchor_cost.to_sat(), "anchor transaction broadcast");
        Ok(Anchored { txid, tx })
    }
}
