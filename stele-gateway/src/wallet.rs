//! Locally managed wallet: UTXO set plus signing key.
//!
//! The wallet is the only shared mutable resource in the pipeline. All
//! coin selection, change handling, signing and spent-marking happen
//! inside one critical section, so two concurrent anchors can never
//! select the same output.

use std::collections::BTreeMap;

use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash as _;
use bitcoin::secp256k1::{All, Message, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{
    transaction, Address, Amount, CompressedPublicKey, OutPoint, PrivateKey, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Witness,
};
use parking_lot::Mutex;
use tracing::debug;

use crate::config::Network;
use crate::error::{GatewayError, Result};
use crate::tx::{estimate_fee, TransactionDraft};
use crate::DUST_LIMIT_SATS;

/// A spendable wallet output.
#[derive(Debug, Clone)]
pub struct Utxo {
    /// Previous output point.
    pub outpoint: OutPoint,
    /// Amount in satoshis.
    pub amount: Amount,
    /// Script pubkey.
    pub script_pubkey: ScriptBuf,
}

/// Mutable wallet state, guarded by the wallet mutex.
#[derive(Debug, Default)]
struct WalletState {
    utxos: BTreeMap<OutPoint, Utxo>,
}

/// A P2WPKH wallet funding anchor transactions.
pub struct Wallet {
    secp: Secp256k1<All>,
    secret: SecretKey,
    public: CompressedPublicKey,
    network: Network,
    state: Mutex<WalletState>,
}

impl Wallet {
    /// Create a wallet from an existing secret key.
    pub fn new(secret: SecretKey, network: Network) -> Result<Self> {
        let secp = Secp256k1::new();
        let private = PrivateKey::new(secret, network.to_bitcoin_network());
        let public = CompressedPublicKey::from_private_key(&secp, &private)
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        Ok(Self {
            secp,
            secret,
            public,
            network,
            state: Mutex::new(WalletState::default()),
        })
    }

    /// Generate a wallet with a fresh random key.
    pub fn generate(network: Network) -> Result<Self> {
        let secret = SecretKey::new(&mut bitcoin::secp256k1::rand::thread_rng());
        Self::new(secret, network)
    }

    /// The wallet's own receive/change address.
    pub fn address(&self) -> Address {
        Address::p2wpkh(&self.public, self.network.to_bitcoin_network())
    }

    fn script_pubkey(&self) -> ScriptBuf {
        self.address().script_pubkey()
    }

    /// Credit the wallet with an output paying to its own address.
    pub fn receive(&self, outpoint: OutPoint, amount: Amount) {
        let utxo = Utxo {
            outpoint,
            amount,
            script_pubkey: self.script_pubkey(),
        };
        self.state.lock().utxos.insert(outpoint, utxo);
    }

    /// Total spendable value.
    pub fn balance(&self) -> Amount {
        let state = self.state.lock();
        Amount::from_sat(state.utxos.values().map(|u| u.amount.to_sat()).sum())
    }

    /// Number of spendable outputs.
    pub fn utxo_count(&self) -> usize {
        self.state.lock().utxos.len()
    }

    /// Fund, sign and reserve a transaction for the given draft.
    ///
    /// One critical section spans select inputs → add change → sign →
    /// mark spent. Coin selection accumulates largest-first, recomputing
    /// the fee for the running input count. Fails with
    /// [`GatewayError::NotEnoughFunds`] before touching wallet state when
    /// no combination covers `anchor_cost + fee`.
    ///
    /// Change below the dust limit folds into the fee. Change at or above
    /// it pays back to the wallet's own address and re-enters the
    /// spendable set only when `allow_spend_unconfirmed` is set, since the
    /// funding transaction is unconfirmed at that point.
    pub fn fund_and_sign(
        &self,
        draft: &TransactionDraft,
        fee_rate_sat_vb: u64,
        allow_spend_unconfirmed: bool,
    ) -> Result<Transaction> {
        let mut state = self.state.lock();

        let mut candidates: Vec<Utxo> = state.utxos.values().cloned().collect();
        candidates.sort_by(|a, b| b.amount.cmp(&a.amount));
        let have = Amount::from_sat(candidates.iter().map(|u| u.amount.to_sat()).sum());

        // Fee planning assumes a change output; if change ends up folded
        // into the fee the estimate is slightly generous, never short.
        let mut planned = draft.outputs();
        planned.push(TxOut {
            value: Amount::ZERO,
            script_pubkey: self.script_pubkey(),
        });

        let mut selected: Vec<Utxo> = Vec::new();
        let mut selected_value = Amount::ZERO;
        let mut fee = estimate_fee(0, &planned, fee_rate_sat_vb);
        let mut funded = false;

        for utxo in candidates {
            selected_value += utxo.amount;
            selected.push(utxo);
            fee = estimate_fee(selected.len(), &planned, fee_rate_sat_vb);
            if selected_value >= draft.target() + fee {
                funded = true;
                break;
            }
        }

        if !funded {
            return Err(GatewayError::NotEnoughFunds {
                need: (draft.target() + fee).to_sat(),
                have: have.to_sat(),
            });
        }

        let change = selected_value - draft.target() - fee;
        let mut outputs = draft.outputs();
        let change_index = outputs.len() as u32;
        let has_change = change.to_sat() >= DUST_LIMIT_SATS;
        if has_change {
            outputs.push(TxOut {
                value: change,
                script_pubkey: self.script_pubkey(),
            });
        }

        let input: Vec<TxIn> = selected
            .iter()
            .map(|u| TxIn {
                previous_output: u.outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                witness: Witness::new(),
            })
            .collect();

        let mut tx = Transaction {
            version: transaction::Version::TWO,
            lock_time: LockTime::ZERO,
            input,
            output: outputs,
        };

        let witnesses = self.sign_p2wpkh(&tx, &selected)?;
        for (txin, witness) in tx.input.iter_mut().zip(witnesses) {
            txin.witness = witness;
        }

        // Mark selected outputs spent while still holding the lock.
        for utxo in &selected {
            state.utxos.remove(&utxo.outpoint);
        }

        if allow_spend_unconfirmed && has_change {
            let outpoint = OutPoint {
                txid: tx.compute_txid(),
                vout: change_index,
            };
            state.utxos.insert(
                outpoint,
                Utxo {
                    outpoint,
                    amount: change,
                    script_pubkey: self.script_pubkey(),
                },
            );
        }

        debug!(
            inputs = selected.len(),
            fee_sat = fee.to_sat(),
            change_sat = change.to_sat(),
            "funded and signed anchor transaction"
        );

        Ok(tx)
    }

    /// Produce a P2WPKH witness for every input of `tx`.
    fn sign_p2wpkh(&self, tx: &Transaction, spent: &[Utxo]) -> Result<Vec<Witness>> {
        let mut sighasher = SighashCache::new(tx);
        let mut witnesses = Vec::with_capacity(spent.len());

        for (index, utxo) in spent.iter().enumerate() {
            let sighash = sighasher
                .p2wpkh_signature_hash(
                    index,
                    &utxo.script_pubkey,
                    utxo.amount,
                    EcdsaSighashType::All,
                )
                .map_err(|e| GatewayError::Signing(e.to_string()))?;

            let message = Message::from_digest(sighash.to_byte_array());
            let signature = bitcoin::ecdsa::Signature {
                signature: self.secp.sign_ecdsa(&message, &self.secret),
                sighash_type: EcdsaSighashType::All,
            };
            witnesses.push(Witness::p2wpkh(&signature, &self.public.0));
        }

        Ok(witnesses)
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::hashes::Hash as _;
    use bitcoin::Txid;

    use super::*;
    use crate::tx::TransactionDraft;

    fn wallet() -> Wallet {
        let secret = SecretKey::from_slice(&[0x11; 32]).unwrap();
        Wallet::new(secret, Network::Regtest).unwrap()
    }

    fn fund(wallet: &Wallet, sats: &[u64]) {
        for (i, amount) in sats.iter().enumerate() {
            let outpoint = OutPoint {
                txid: Txid::from_byte_array([i as u8 + 1; 32]),
                vout: 0,
            };
            wallet.receive(outpoint, Amount::from_sat(*amount));
        }
    }

    fn draft(wallet: &Wallet) -> TransactionDraft {
        TransactionDraft::new(wallet.address(), Amount::from_sat(10_000), b"STL1data").unwrap()
    }

    #[test]
    fn test_balance_tracks_received_outputs() {
        let w = wallet();
        fund(&w, &[5_000, 7_000]);
        assert_eq!(w.balance(), Amount::from_sat(12_000));
        assert_eq!(w.utxo_count(), 2);
    }

    #[test]
    fn test_fund_and_sign_produces_witnesses() {
        let w = wallet();
        fund(&w, &[100_000]);

        let tx = w.fund_and_sign(&draft(&w), 10, false).unwrap();

        assert_eq!(tx.input.len(), 1);
        assert!(!tx.input[0].witness.is_empty());
        // Payment, data output and change.
        assert_eq!(tx.output.len(), 3);
        assert_eq!(tx.output[0].value, Amount::from_sat(10_000));
        assert!(tx.output[1].script_pubkey.is_op_return());
        // Selected output is reserved.
        assert_eq!(w.utxo_count(), 0);
    }

    #[test]
    fn test_accumulates_multiple_inputs() {
        let w = wallet();
        fund(&w, &[6_000, 6_000, 6_000]);

        let tx = w.fund_and_sign(&draft(&w), 1, false).unwrap();
        assert!(tx.input.len() >= 2);
        for txin in &tx.input {
            assert!(!txin.witness.is_empty());
        }
    }

    #[test]
    fn test_insufficient_funds_leaves_wallet_untouched() {
        let w = wallet();
        fund(&w, &[4_000]);

        let err = w.fund_and_sign(&draft(&w), 10, false).unwrap_err();
        match err {
            GatewayError::NotEnoughFunds { need, have } => {
                assert_eq!(have, 4_000);
                assert!(need > 10_000);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(w.utxo_count(), 1);
    }

    #[test]
    fn test_dust_change_folds_into_fee() {
        let w = wallet();
        // Leaves ~100 sat of change at fee rate 1, below the dust limit.
        let plan = draft(&w);
        let fee = crate::tx::estimate_fee(1, &{
            let mut outs = plan.outputs();
            outs.push(TxOut {
                value: Amount::ZERO,
                script_pubkey: w.script_pubkey(),
            });
            outs
        }, 1);
        fund(&w, &[10_000 + fee.to_sat() + 100]);

        let tx = w.fund_and_sign(&plan, 1, false).unwrap();
        assert_eq!(tx.output.len(), 2);
    }

    #[test]
    fn test_change_not_spendable_by_default() {
        let w = wallet();
        fund(&w, &[100_000]);
        w.fund_and_sign(&draft(&w), 10, false).unwrap();
        assert_eq!(w.balance(), Amount::ZERO);
    }

    #[test]
    fn test_change_spendable_when_unconfirmed_allowed() {
        let w = wallet();
        fund(&w, &[100_000]);
        let tx = w.fund_and_sign(&draft(&w), 10, true).unwrap();

        assert_eq!(w.utxo_count(), 1);
        assert_eq!(w.balance(), tx.output[2].value);
    }
}
