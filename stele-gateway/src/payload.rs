//! Payload budget validation.
//!
//! First stage of the pipeline: runs before any wallet resource is
//! touched, so an oversized payload never costs a coin selection.

use crate::error::{GatewayError, Result};

/// Compose the bytes of the data-carrying output.
///
/// Returns exactly `marker || payload`, never reordered or padded. If the
/// combined length exceeds `max_data_bytes` the request is rejected with
/// [`GatewayError::PayloadTooLarge`] reporting the (negative) remaining
/// budget. Oversized payloads are rejected outright, never truncated.
pub fn compose_anchor_data(marker: &[u8], payload: &[u8], max_data_bytes: usize) -> Result<Vec<u8>> {
    let total = marker.len() + payload.len();
    if total > max_data_bytes {
        return Err(GatewayError::PayloadTooLarge {
            overflow: max_data_bytes as i64 - total as i64,
        });
    }

    let mut data = Vec::with_capacity(total);
    data.extend_from_slice(marker);
    data.extend_from_slice(payload);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_concatenation() {
        let data = compose_anchor_data(b"STL1", b"hello", 80).unwrap();
        assert_eq!(data, b"STL1hello");
    }

    #[test]
    fn test_fills_budget_exactly() {
        // 4-byte marker + 76-byte payload = exactly 80 bytes.
        let payload = vec![0xaa; 76];
        let data = compose_anchor_data(b"STL1", &payload, 80).unwrap();
        assert_eq!(data.len(), 80);
        assert_eq!(&data[..4], b"STL1");
        assert_eq!(&data[4..], &payload[..]);
    }

    #[test]
    fn test_one_byte_over_reports_minus_one() {
        let payload = vec![0xaa; 77];
        let err = compose_anchor_data(b"STL1", &payload, 80).unwrap_err();
        match err {
            GatewayError::PayloadTooLarge { overflow } => assert_eq!(overflow, -1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflow_scales_with_excess() {
        let payload = vec![0; 100];
        let err = compose_anchor_data(b"STL1", &payload, 80).unwrap_err();
        match err {
            GatewayError::PayloadTooLarge { overflow } => assert_eq!(overflow, -24),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_payload_is_fine() {
        let data = compose_anchor_data(b"STL1", b"", 80).unwrap();
        assert_eq!(data, b"STL1");
    }
}
