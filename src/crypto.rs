//! Cryptographic primitives for keelchain
//!
//! Addresses are the hex encoding of a compressed secp256k1 public key, so an
//! address decodes back to the exact key that must verify a transaction's
//! signature. Signatures are compact ECDSA (r ‖ s, 64 bytes) over the SHA-256
//! digest of the signed payload.

use crate::error::{ChainError, Result};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::COMPACT_SIGNATURE_SIZE,
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
/// This prevents repeated, unnecessary context creation.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// A textual account address, derived bijectively from a public key.
pub type Address = String;

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(bytes)
            .map_err(|e| ChainError::KeyDerivation(format!("invalid secret key bytes: {e}")))?;
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        Ok(KeyPair {
            secret_key,
            public_key,
        })
    }

    /// Returns the textual address of this key pair's public key.
    pub fn address(&self) -> Address {
        encode_address(&self.public_key)
    }

    /// Signs a message (hashed with SHA-256 first) and returns the compact
    /// signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; COMPACT_SIGNATURE_SIZE]> {
        let digest = Sha256::digest(message);
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| ChainError::KeyDerivation(format!("failed to create message: {e}")))?;
        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);
        Ok(signature.serialize_compact())
    }
}

/// Encodes a public key as a textual address.
pub fn encode_address(public_key: &PublicKey) -> Address {
    hex::encode(public_key.serialize())
}

/// Decodes a textual address back to the public key it was derived from.
pub fn decode_address(address: &str) -> Result<PublicKey> {
    let bytes = hex::decode(address)
        .map_err(|e| ChainError::InvalidAddress(format!("{address}: {e}")))?;
    PublicKey::from_slice(&bytes).map_err(|e| ChainError::InvalidAddress(format!("{address}: {e}")))
}

/// Verifies a compact ECDSA signature over `message` against a public key.
/// Returns `false` on cryptographic mismatch; only malformed signature bytes
/// are an error.
pub fn verify_signature(
    public_key: &PublicKey,
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<bool> {
    let digest = Sha256::digest(message);
    let message = Message::from_digest_slice(&digest)
        .map_err(|e| ChainError::KeyDerivation(format!("failed to create message: {e}")))?;
    let signature = Signature::from_compact(signature_bytes)
        .map_err(|e| ChainError::MalformedTransaction(format!("invalid signature bytes: {e}")))?;

    Ok(SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, public_key)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_round_trip() {
        let keypair = KeyPair::generate();
        let address = keypair.address();

        // Compressed key is 33 bytes, hex doubles it
        assert_eq!(address.len(), 66);

        let decoded = decode_address(&address).unwrap();
        assert_eq!(decoded, keypair.public_key);
        // Deterministic: re-encoding yields the same address
        assert_eq!(encode_address(&decoded), address);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_address("not hex at all").is_err());
        // Valid hex, not a valid public key
        assert!(decode_address("deadbeef").is_err());
    }

    #[test]
    fn test_signing_and_verification() {
        let keypair = KeyPair::generate();
        let message = b"hello, keelchain";

        let signature = keypair.sign(message).unwrap();
        assert!(verify_signature(&keypair.public_key, message, &signature).unwrap());
    }

    #[test]
    fn test_wrong_key_fails_verification() {
        let keypair1 = KeyPair::generate();
        let keypair2 = KeyPair::generate();

        let message = b"test message";
        let signature = keypair1.sign(message).unwrap();

        assert!(!verify_signature(&keypair2.public_key, message, &signature).unwrap());
    }

    #[test]
    fn test_tampered_message_fails_verification() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(b"original message").unwrap();

        assert!(!verify_signature(&keypair.public_key, b"tampered message", &signature).unwrap());
    }

    #[test]
    fn test_from_secret_bytes() {
        let keypair = KeyPair::generate();
        let restored = KeyPair::from_secret_bytes(&keypair.secret_key.secret_bytes()).unwrap();
        assert_eq!(restored.address(), keypair.address());

        assert!(KeyPair::from_secret_bytes(&[0u8; 31]).is_err());
    }
}
