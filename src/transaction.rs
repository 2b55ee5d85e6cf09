//! Signed asset transfers and block-reward mints

use crate::crypto::{self, Address, KeyPair};
use crate::error::{ChainError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Memo marking a self-mint transaction crediting the validator.
pub const REWARD_MEMO: &str = "block reward";

/// A transfer of one asset between two addresses, or a self-directed
/// block-reward mint.
///
/// `id` is the hex SHA-256 of the canonical JSON payload excluding `id` and
/// `signature`; the signature covers the canonical payload including `id`.
/// Both fields are omitted from JSON while unset, which is what keeps the
/// canonical payloads stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub symbol: String,
    pub source: Address,
    pub destination: Address,
    pub amount: f64,
    pub memo: String,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Transaction {
    /// Builds a transaction and computes its id.
    pub fn new(
        symbol: impl Into<String>,
        source: impl Into<Address>,
        destination: impl Into<Address>,
        amount: f64,
        memo: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Result<Self> {
        let mut tx = Transaction {
            id: String::new(),
            symbol: symbol.into(),
            source: source.into(),
            destination: destination.into(),
            amount,
            memo: memo.into(),
            time,
            signature: None,
        };
        tx.id = tx.compute_id()?;
        Ok(tx)
    }

    /// Recomputes the id from the current field values. Idempotent for
    /// unchanged fields.
    pub fn compute_id(&self) -> Result<String> {
        let mut unsealed = self.clone();
        unsealed.id = String::new();
        unsealed.signature = None;
        let payload = serde_json::to_vec(&unsealed)?;
        Ok(hex::encode(Sha256::digest(payload)))
    }

    /// The byte payload covered by the signature: everything but the
    /// signature itself.
    pub fn signable_payload(&self) -> Result<Vec<u8>> {
        let mut unsigned = self.clone();
        unsigned.signature = None;
        Ok(serde_json::to_vec(&unsigned)?)
    }

    /// Signs the transaction with the sender's key, overwriting any previous
    /// signature. Expects the id to be computed already.
    pub fn sign(&mut self, keypair: &KeyPair) -> Result<()> {
        let payload = self.signable_payload()?;
        let signature = keypair.sign(&payload)?;
        self.signature = Some(hex::encode(signature));
        Ok(())
    }

    /// Checks the signature against the public key decoded from `source`.
    ///
    /// Returns `false` on cryptographic mismatch or a missing signature; an
    /// undecodable source address is an `InvalidAddress` error.
    pub fn verify(&self) -> Result<bool> {
        let public_key = crypto::decode_address(&self.source)?;
        let signature = match &self.signature {
            Some(sig) => hex::decode(sig)
                .map_err(|e| ChainError::MalformedTransaction(format!("signature hex: {e}")))?,
            None => return Ok(false),
        };
        let payload = self.signable_payload()?;
        crypto::verify_signature(&public_key, &payload, &signature)
    }

    /// True for a self-mint transaction crediting the validator.
    pub fn is_reward(&self) -> bool {
        self.memo == REWARD_MEMO && self.source == self.destination
    }
}
