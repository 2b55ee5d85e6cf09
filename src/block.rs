//! Hash-linked ledger entries

use crate::crypto::Address;
use crate::error::Result;
use crate::transaction::Transaction;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type Sha256Hash = [u8; 32];

/// One ledger step. Immutable once appended; `hash` is a pure function of the
/// other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub time: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub validator: Address,
    pub previous_hash: Sha256Hash,
    pub hash: Sha256Hash,
    pub incrementor: u64,
}

impl Block {
    /// Builds a block and seals it with its hash.
    pub fn new(
        index: u64,
        time: DateTime<Utc>,
        transactions: Vec<Transaction>,
        validator: Address,
        previous_hash: Sha256Hash,
        incrementor: u64,
    ) -> Result<Self> {
        let mut block = Block {
            index,
            time,
            transactions,
            validator,
            previous_hash,
            hash: [0u8; 32],
            incrementor,
        };
        block.hash = block.compute_hash()?;
        Ok(block)
    }

    /// SHA-256 over decimal index, RFC3339 UTC timestamp, the JSON encoding
    /// of the transactions, the raw previous-hash bytes and the decimal
    /// incrementor. Idempotent for unchanged fields.
    pub fn compute_hash(&self) -> Result<Sha256Hash> {
        let mut hasher = Sha256::new();
        hasher.update(self.index.to_string().as_bytes());
        hasher.update(
            self.time
                .to_rfc3339_opts(SecondsFormat::Secs, true)
                .as_bytes(),
        );
        hasher.update(serde_json::to_vec(&self.transactions)?);
        hasher.update(self.previous_hash);
        hasher.update(self.incrementor.to_string().as_bytes());
        Ok(hasher.finalize().into())
    }
}
