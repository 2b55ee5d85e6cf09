//! Error types for keelchain

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid signature on transaction {0}")]
    InvalidSignature(String),

    #[error("insufficient funds to perform transaction")]
    InsufficientBalance,

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("cannot produce a block on an empty chain")]
    ChainEmpty,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),

    #[error("rejected by node: {0}")]
    Rejected(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
