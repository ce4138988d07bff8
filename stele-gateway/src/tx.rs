//! Transaction drafting for OP_RETURN anchoring.

use bitcoin::blockdata::opcodes;
use bitcoin::blockdata::script::{Builder, PushBytesBuf, ScriptBuf};
use bitcoin::{Address, Amount, TxOut};

use crate::error::{GatewayError, Result};

/// Build the data-carrying script: an OP_RETURN push of `data`.
///
/// OP_RETURN outputs are provably unspendable, which is what makes them
/// suitable for anchoring arbitrary bytes.
pub fn build_data_script(data: &[u8]) -> Result<ScriptBuf> {
    let push_bytes = PushBytesBuf::try_from(data.to_vec())
        .map_err(|e| GatewayError::TxBuild(e.to_string()))?;

    Ok(Builder::new()
        .push_opcode(opcodes::all::OP_RETURN)
        .push_slice(push_bytes)
        .into_script())
}

/// Parse a data-carrying script back to the anchored bytes.
pub fn parse_data_script(script: &ScriptBuf) -> Result<Vec<u8>> {
    let bytes = script.as_bytes();

    if bytes.is_empty() || bytes[0] != opcodes::all::OP_RETURN.to_u8() {
        return Err(GatewayError::InvalidDataScript(
            "not an OP_RETURN script".into(),
        ));
    }

    // Skip OP_RETURN and the push opcode.
    let data = if bytes.len() > 2 && bytes[1] <= 75 {
        // Direct push
        &bytes[2..]
    } else if bytes.len() > 3 && bytes[1] == opcodes::all::OP_PUSHDATA1.to_u8() {
        // OP_PUSHDATA1
        &bytes[3..]
    } else {
        return Err(GatewayError::InvalidDataScript(
            "unexpected script format".into(),
        ));
    };

    Ok(data.to_vec())
}

/// A transaction skeleton: outputs only, inputs and fee still unselected.
///
/// Funding is delegated to the wallet, which keeps the drafter testable
/// without wallet access.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Resolved destination address.
    pub destination: Address,
    /// Fixed value paid to the destination.
    pub anchor_cost: Amount,
    /// Data-carrying script holding `marker || payload`.
    pub data_script: ScriptBuf,
}

impl TransactionDraft {
    /// Create a draft from the resolved address, the fixed anchor cost and
    /// the validated marker+payload bytes.
    pub fn new(destination: Address, anchor_cost: Amount, data: &[u8]) -> Result<Self> {
        Ok(Self {
            destination,
            anchor_cost,
            data_script: build_data_script(data)?,
        })
    }

    /// The two fixed outputs: the payment, then the zero-value data output.
    pub fn outputs(&self) -> Vec<TxOut> {
        vec![
            TxOut {
                value: self.anchor_cost,
                script_pubkey: self.destination.script_pubkey(),
            },
            TxOut {
                value: Amount::ZERO,
                script_pubkey: self.data_script.clone(),
            },
        ]
    }

    /// Total value the wallet must cover before fees.
    pub fn target(&self) -> Amount {
        self.anchor_cost
    }
}

/// Estimate transaction virtual size.
///
/// Inputs are assumed P2WPKH:
/// - Version: 4 bytes, marker + flag: 2 bytes, locktime: 4 bytes
/// - Input/output counts: 1 byte each
/// - Per input: 32 (txid) + 4 (vout) + 1 (script len) + 4 (sequence),
///   plus ~27 vbytes of discounted witness
/// - Per output: 8 (value) + 1 (script len) + script bytes
pub fn estimate_vsize(num_inputs: usize, outputs: &[TxOut]) -> usize {
    let base = 4 + 2 + 1 + 1 + 4;
    let inputs = num_inputs * (41 + 27);
    let outs: usize = outputs
        .iter()
        .map(|o| 8 + 1 + o.script_pubkey.len())
        .sum();

    base + inputs + outs
}

/// Fee for a transaction of the given shape at `fee_rate_sat_vb`.
pub fn estimate_fee(num_inputs: usize, outputs: &[TxOut], fee_rate_sat_vb: u64) -> Amount {
    Amount::from_sat(estimate_vsize(num_inputs, outputs) as u64 * fee_rate_sat_vb)
}
