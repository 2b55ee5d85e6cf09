//! Validator control loop
//!
//! Bootstraps from peers (or produces genesis), then races two cancellable
//! tasks per iteration: the incrementor search against a short-interval poll
//! for a longer peer chain. Whichever finishes first mutates chain state
//! inside its iteration; the loser is cancelled and awaited before the next
//! iteration starts. Gossip and discovery run on their own timers,
//! independent of the loop. No error in here ever terminates the process.

use crate::block::Block;
use crate::chain::Chain;
use crate::consensus;
use crate::crypto::KeyPair;
use crate::sync::Synchronizer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct NodeTiming {
    /// Gossip announcement period.
    pub gossip: Duration,
    /// Peer discovery period.
    pub discovery: Duration,
    /// Chain-update poll period inside a loop iteration.
    pub poll: Duration,
}

impl Default for NodeTiming {
    fn default() -> Self {
        Self {
            gossip: Duration::from_secs(30),
            discovery: Duration::from_secs(30),
            poll: Duration::from_secs(2),
        }
    }
}

pub struct Node {
    chain: Arc<RwLock<Chain>>,
    keypair: KeyPair,
    sync: Arc<Synchronizer>,
    timing: NodeTiming,
    validate_imports: bool,
}

impl Node {
    pub fn new(
        chain: Arc<RwLock<Chain>>,
        keypair: KeyPair,
        sync: Arc<Synchronizer>,
        timing: NodeTiming,
        validate_imports: bool,
    ) -> Self {
        Self {
            chain,
            keypair,
            sync,
            timing,
            validate_imports,
        }
    }

    /// Runs the validator forever: bootstrap, background timers, then the
    /// perpetual produce-or-adopt loop.
    pub async fn run(self: Arc<Self>) {
        self.bootstrap().await;

        let gossip_sync = self.sync.clone();
        let gossip_period = self.timing.gossip;
        tokio::spawn(async move {
            let mut ticker = interval(gossip_period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                gossip_sync.announce_self().await;
            }
        });

        let discovery_sync = self.sync.clone();
        let discovery_period = self.timing.discovery;
        tokio::spawn(async move {
            let mut ticker = interval(discovery_period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                discovery_sync.discover_peers().await;
            }
        });

        loop {
            self.iteration().await;
        }
    }

    /// Fetches the longest peer chain, falling back to a fresh genesis block
    /// when no peer returns one.
    pub async fn bootstrap(&self) {
        let fetched = self.sync.fetch_longest_chain().await;
        info!(blocks = fetched.len(), "fetched blocks from peers");

        if fetched.is_empty() {
            let mut chain = self.chain.write().await;
            match chain.genesis_block(&self.keypair) {
                Ok(_) => info!("produced genesis block"),
                Err(e) => warn!("genesis production failed: {e}"),
            }
        } else {
            self.adopt_chain(fetched).await;
            // An invalid import leaves the chain empty; start from genesis
            let mut chain = self.chain.write().await;
            if chain.blocks.is_empty() {
                match chain.genesis_block(&self.keypair) {
                    Ok(_) => info!("produced genesis block"),
                    Err(e) => warn!("genesis production failed: {e}"),
                }
            }
        }
    }

    /// One control-loop iteration: race the incrementor search against the
    /// chain-update poll under a shared cancellation token, apply the
    /// winner's effect, and await the loser's exit.
    async fn iteration(&self) {
        let cancel = CancellationToken::new();
        let mut search = tokio::spawn(consensus::find_incrementor(cancel.clone()));
        let mut poll = tokio::spawn(Self::watch_for_longer_chain(
            self.chain.clone(),
            self.sync.clone(),
            self.timing.poll,
            cancel.clone(),
        ));

        tokio::select! {
            found = &mut search => {
                if let Ok(Some(incrementor)) = found {
                    let mut chain = self.chain.write().await;
                    match chain.next_block(incrementor, &self.keypair) {
                        Ok(block) => {
                            info!(index = block.index, length = chain.blocks.len(), "new block generated");
                        }
                        Err(e) => warn!("block production failed: {e}"),
                    }
                }
                cancel.cancel();
                let _ = poll.await;
            }
            update = &mut poll => {
                if let Ok(Some(blocks)) = update {
                    self.adopt_chain(blocks).await;
                }
                cancel.cancel();
                let _ = search.await;
            }
        }
    }

    /// Replaces the local block list with a strictly longer fetched one. With
    /// import validation enabled, a chain failing linkage or signature checks
    /// is discarded instead.
    async fn adopt_chain(&self, blocks: Vec<Block>) {
        if self.validate_imports && !Chain::verify_imported(&blocks) {
            warn!(blocks = blocks.len(), "discarding fetched chain: failed validation");
            return;
        }
        let mut chain = self.chain.write().await;
        if blocks.len() > chain.blocks.len() {
            let gained = blocks.len() - chain.blocks.len();
            chain.blocks = blocks;
            info!(gained, length = chain.blocks.len(), "adopted longer peer chain");
        }
    }

    /// Polls peers on a short interval and resolves once a strictly longer
    /// chain shows up, or `None` once cancelled.
    async fn watch_for_longer_chain(
        chain: Arc<RwLock<Chain>>,
        sync: Arc<Synchronizer>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Option<Vec<Block>> {
        let mut ticker = interval(period);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = ticker.tick() => {
                    let fetched = sync.fetch_longest_chain().await;
                    let local = chain.read().await.blocks.len();
                    if fetched.len() > local {
                        return Some(fetched);
                    }
                }
            }
        }
    }
}
