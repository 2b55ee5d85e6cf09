//! keelchain - a minimal validator node
//!
//! An append-only ledger of signed transactions, grown by a
//! divisibility-lottery block producer and kept eventually consistent across
//! peers by a longest-wins rule over a small HTTP protocol.
//!
//! # Architecture
//!
//! ## Data model
//! - [`block`] - Hash-linked ledger entries
//! - [`transaction`] - Signed transfers and block-reward mints
//! - [`chain`] - Block sequence, mempool and replay-based balances
//!
//! ## Consensus
//! - [`consensus`] - The incrementor lottery gating block production
//! - [`node`] - The perpetual validator control loop
//!
//! ## Cryptography
//! - [`crypto`] - Key pairs, addresses, signatures (secp256k1)
//! - [`keystore`] - Key persistence under the user's home directory
//!
//! ## Networking
//! - [`api`] - REST surface and node-to-node peer protocol
//! - [`client`] - HTTP client for peers and nodes
//! - [`peers`] - The grow-only set of known peer endpoints
//! - [`sync`] - Chain fetch, peer discovery and gossip
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// Data model
pub mod block;
pub mod chain;
pub mod transaction;

// Consensus
pub mod consensus;
pub mod node;

// Cryptography
pub mod crypto;
pub mod keystore;

// Networking
pub mod api;
pub mod client;
pub mod peers;
pub mod sync;

// Configuration & Utilities
pub mod config;
pub mod error;
