//! Destination address resolution.

use bitcoin::{Address, PublicKey};

use crate::config::Network;
use crate::error::{GatewayError, Result};

/// Derive the canonical P2PKH address for a client-supplied public key on
/// the selected network.
///
/// `pubkey` is a raw SEC-encoded EC point (33 bytes compressed or 65
/// uncompressed). Pure and deterministic; the only failure mode is a
/// malformed key.
pub fn resolve_destination(pubkey: &[u8], network: Network) -> Result<Address> {
    let key = PublicKey::from_slice(pubkey)
        .map_err(|e| GatewayError::InvalidPublicKey(e.to_string()))?;

    Ok(Address::p2pkh(key.pubkey_hash(), network.to_bitcoin_network()))
}

#[cfg(test)]
mod tests {
    use bitcoin::secp256k1::{Secp256k1, SecretKey};

    use super::*;

    fn test_pubkey() -> Vec<u8> {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[0x42; 32]).unwrap();
        sk.public_key(&secp).serialize().to_vec()
    }

    #[test]
    fn test_resolves_compressed_key() {
        let addr = resolve_destination(&test_pubkey(), Network::Regtest).unwrap();
        assert!(addr
            .is_related_to_pubkey(&PublicKey::from_slice(&test_pubkey()).unwrap()));
    }

    #[test]
    fn test_deterministic() {
        let a = resolve_destination(&test_pubkey(), Network::Testnet).unwrap();
        let b = resolve_destination(&test_pubkey(), Network::Testnet).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_network_changes_address() {
        let main = resolve_destination(&test_pubkey(), Network::Mainnet).unwrap();
        let test = resolve_destination(&test_pubkey(), Network::Testnet).unwrap();
        assert_ne!(main.to_string(), test.to_string());
    }

    #[test]
    fn test_rejects_malformed_key() {
        let err = resolve_destination(&[0u8; 33], Network::Regtest).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidPublicKey(_)));

        let err = resolve_destination(b"not a key", Network::Regtest).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidPublicKey(_)));
    }
}
