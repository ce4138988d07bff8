//! Mock relay for testing and development.

use bitcoin::{Transaction, Txid};
use parking_lot::Mutex;

use crate::error::{GatewayError, Result};
use crate::relay::Relay;

/// A relay that records broadcast transactions instead of submitting them.
///
/// Can be armed to fail the next broadcasts, for exercising the
/// classified-failure paths.
#[derive(Default)]
pub struct MockRelay {
    sent: Mutex<Vec<Transaction>>,
    failure: Mutex<Option<String>>,
}

impl MockRelay {
    /// Create a new mock relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent broadcast fail with the given reason.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    /// Restore successful broadcasting.
    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    /// Transactions broadcast so far.
    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().clone()
    }

    /// Number of broadcasts performed.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Relay for MockRelay {
    fn broadcast(&self, tx: &Transaction) -> Result<Txid> {
        if let Some(reason) = self.failure.lock().clone() {
            return Err(GatewayError::Broadcast(reason));
        }

        let txid = tx.compute_txid();
        self.sent.lock().push(tx.clone());
        Ok(txid)
    }
}
