//! Chain state: the block sequence plus the mempool
//!
//! Balances are never indexed; every query replays the full transaction
//! history. The `Chain` value is shared behind a single `RwLock` so the
//! control loop and the request surface always observe a consistent snapshot
//! of blocks and pending transactions together.

use crate::block::Block;
use crate::consensus::INCREMENTOR_DIVISOR;
use crate::crypto::KeyPair;
use crate::error::{ChainError, Result};
use crate::transaction::{Transaction, REWARD_MEMO};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

/// The asset symbols this chain moves. One reward transaction per symbol is
/// minted into every produced block.
pub const ASSET_SYMBOLS: [&str; 2] = ["KEEL", "ORCA"];

#[derive(Debug, Default, Clone)]
pub struct Chain {
    pub blocks: Vec<Block>,
    pub pending: Vec<Transaction>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-symbol balances for an address, replayed from every transaction in
    /// every block. A symbol appears in the result once any transaction
    /// touches the address with it, even at balance zero.
    pub fn balances(&self, address: &str) -> HashMap<String, f64> {
        let mut balances: HashMap<String, f64> = HashMap::new();

        for block in &self.blocks {
            for tx in &block.transactions {
                if tx.source != address && tx.destination != address {
                    continue;
                }
                let entry = balances.entry(tx.symbol.clone()).or_insert(0.0);
                if tx.source == address && tx.destination == address && tx.memo == REWARD_MEMO {
                    // Self-mint: credited, not netted to zero
                    *entry += tx.amount;
                } else if tx.source == address {
                    *entry -= tx.amount;
                } else {
                    *entry += tx.amount;
                }
            }
        }

        balances
    }

    /// Confirms the source address can cover the transaction amount. Reward
    /// transactions are exempt at the call sites, not here.
    pub fn verify_balance(&self, tx: &Transaction) -> Result<()> {
        let balances = self.balances(&tx.source);
        match balances.get(&tx.symbol) {
            Some(balance) if *balance >= tx.amount => Ok(()),
            _ => Err(ChainError::InsufficientBalance),
        }
    }

    /// Admits a transaction to the mempool after signature and balance
    /// checks. On any failure the mempool is left unchanged.
    pub fn post_transaction(&mut self, tx: Transaction) -> Result<()> {
        if !tx.verify()? {
            return Err(ChainError::InvalidSignature(tx.id));
        }
        if !tx.is_reward() {
            self.verify_balance(&tx)?;
        }
        self.pending.push(tx);
        Ok(())
    }

    /// Re-applies the admission checks to a batch right before it is embedded
    /// in a block, so a transaction admitted under a now-stale balance is
    /// still dropped here. Failures are dropped silently, order preserved.
    pub fn validate_batch(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        let mut batch = Vec::with_capacity(transactions.len());
        for tx in transactions {
            if !tx.is_reward() {
                if let Err(e) = self.verify_balance(&tx) {
                    warn!(id = %tx.id, "dropping transaction: {e}");
                    continue;
                }
            }
            match tx.verify() {
                Ok(true) => batch.push(tx),
                Ok(false) => warn!(id = %tx.id, "dropping transaction: bad signature"),
                Err(e) => warn!(id = %tx.id, "dropping transaction: {e}"),
            }
        }
        batch
    }

    /// A signed self-mint crediting the validator with one unit of `symbol`.
    fn reward_transaction(
        &self,
        symbol: &str,
        time: DateTime<Utc>,
        keypair: &KeyPair,
    ) -> Result<Transaction> {
        let address = keypair.address();
        let mut tx = Transaction::new(symbol, address.clone(), address, 1.0, REWARD_MEMO, time)?;
        tx.sign(keypair)?;
        Ok(tx)
    }

    /// Assembles and appends the next block: the mempool plus one reward per
    /// asset symbol, revalidated as a batch. Clears the mempool on success
    /// and leaves it untouched on failure.
    pub fn next_block(&mut self, incrementor: u64, keypair: &KeyPair) -> Result<Block> {
        let last = self.blocks.last().ok_or(ChainError::ChainEmpty)?;
        let time = Utc::now();

        let mut transactions = self.pending.clone();
        for symbol in ASSET_SYMBOLS {
            transactions.push(self.reward_transaction(symbol, time, keypair)?);
        }
        let batch = self.validate_batch(transactions);

        let block = Block::new(
            last.index + 1,
            time,
            batch,
            keypair.address(),
            last.hash,
            incrementor,
        )?;

        self.blocks.push(block.clone());
        self.pending.clear();
        Ok(block)
    }

    /// Produces the index-0 block: no transactions, an all-zero previous
    /// hash, and the consensus divisor as incrementor.
    pub fn genesis_block(&mut self, keypair: &KeyPair) -> Result<Block> {
        let block = Block::new(
            0,
            Utc::now(),
            Vec::new(),
            keypair.address(),
            [0u8; 32],
            INCREMENTOR_DIVISOR,
        )?;
        self.blocks.push(block.clone());
        Ok(block)
    }

    /// Optional hardening applied to chains fetched from peers before they
    /// replace the local one: index/previous-hash linkage, recomputed block
    /// hashes, and every transaction signature.
    pub fn verify_imported(blocks: &[Block]) -> bool {
        for (i, block) in blocks.iter().enumerate() {
            match block.compute_hash() {
                Ok(hash) if hash == block.hash => {}
                _ => return false,
            }
            if i > 0 {
                let previous = &blocks[i - 1];
                if block.index != previous.index + 1 || block.previous_hash != previous.hash {
                    return false;
                }
            }
            for tx in &block.transactions {
                if !matches!(tx.verify(), Ok(true)) {
                    return false;
                }
            }
        }
        true
    }
}
