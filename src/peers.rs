//! Known peer endpoints
//!
//! The peer set only ever grows: endpoints learned from discovery are merged
//! in and nothing is evicted. Unreachable peers simply contribute nothing to
//! a sync round.

use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct PeerSet {
    inner: RwLock<HashSet<String>>,
}

impl PeerSet {
    pub fn new(seeds: impl IntoIterator<Item = String>) -> Self {
        let seeds: HashSet<String> = seeds.into_iter().filter(|s| !s.is_empty()).collect();
        Self {
            inner: RwLock::new(seeds),
        }
    }

    pub async fn add(&self, endpoint: String) {
        if endpoint.is_empty() {
            return;
        }
        self.inner.write().await.insert(endpoint);
    }

    /// Monotonic union merge of discovered endpoints.
    pub async fn merge(&self, endpoints: impl IntoIterator<Item = String>) {
        let mut peers = self.inner.write().await;
        peers.extend(endpoints.into_iter().filter(|e| !e.is_empty()));
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
