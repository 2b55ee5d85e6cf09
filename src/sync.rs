//! Peer synchronization: chain fetch, peer discovery and gossip
//!
//! Every operation is best-effort per peer: a failed call is logged and that
//! peer contributes nothing this round. The next timer tick retries
//! naturally.

use crate::block::Block;
use crate::client::Client;
use crate::peers::PeerSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Synchronizer {
    client: Client,
    peers: Arc<PeerSet>,
    self_endpoint: String,
}

impl Synchronizer {
    pub fn new(client: Client, peers: Arc<PeerSet>, self_endpoint: String) -> Self {
        Self {
            client,
            peers,
            self_endpoint,
        }
    }

    /// The longest block list observed across all reachable peers, empty when
    /// no peer returns anything. The caller compares against its local chain;
    /// ties keep the local one.
    pub async fn fetch_longest_chain(&self) -> Vec<Block> {
        let mut longest: Vec<Block> = Vec::new();
        for peer in self.peers.snapshot().await {
            match self.client.blocks(&peer).await {
                Ok(blocks) => {
                    debug!(peer = %peer, blocks = blocks.len(), "fetched chain");
                    if blocks.len() > longest.len() {
                        longest = blocks;
                    }
                }
                Err(e) => warn!(peer = %peer, "chain fetch failed: {e}"),
            }
        }
        longest
    }

    /// Merges every reachable peer's peer set into ours. Union only; nothing
    /// is ever removed, and our own endpoint is never merged in.
    pub async fn discover_peers(&self) {
        for peer in self.peers.snapshot().await {
            match self.client.peers(&peer).await {
                Ok(discovered) => {
                    self.peers
                        .merge(discovered.into_iter().filter(|p| *p != self.self_endpoint))
                        .await;
                }
                Err(e) => warn!(peer = %peer, "peer discovery failed: {e}"),
            }
        }
    }

    /// Tells every known peer about our own endpoint.
    pub async fn announce_self(&self) {
        for peer in self.peers.snapshot().await {
            if let Err(e) = self.client.announce(&peer, &self.self_endpoint).await {
                warn!(peer = %peer, "announcement failed: {e}");
            }
        }
    }
}
