//! HTTP client for the node and peer protocol
//!
//! Every call carries a bounded timeout so one unreachable peer cannot stall
//! a gossip, discovery or chain-poll round.

use crate::block::Block;
use crate::error::{ChainError, Result};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Body of a `POST /peers` announcement.
#[derive(Debug, Serialize, Deserialize)]
pub struct PeerAnnouncement {
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::PeerUnreachable(format!("building http client: {e}")))?;
        Ok(Self { http })
    }

    /// Fetches a peer's full block list.
    pub async fn blocks(&self, peer: &str) -> Result<Vec<Block>> {
        let url = format!("{peer}/chain");
        let response = self.get(&url).await?;
        response
            .json()
            .await
            .map_err(|e| ChainError::PeerUnreachable(format!("{url}: {e}")))
    }

    /// Fetches a peer's known peer endpoints.
    pub async fn peers(&self, peer: &str) -> Result<Vec<String>> {
        let url = format!("{peer}/peers");
        let response = self.get(&url).await?;
        response
            .json()
            .await
            .map_err(|e| ChainError::PeerUnreachable(format!("{url}: {e}")))
    }

    /// Announces our own endpoint to a peer.
    pub async fn announce(&self, peer: &str, endpoint: &str) -> Result<()> {
        let url = format!("{peer}/peers");
        self.http
            .post(&url)
            .json(&PeerAnnouncement {
                endpoint: endpoint.to_string(),
            })
            .send()
            .await
            .map_err(|e| ChainError::PeerUnreachable(format!("{url}: {e}")))?;
        Ok(())
    }

    /// Queries a node for an address's per-symbol balances.
    pub async fn balances(&self, node: &str, address: &str) -> Result<HashMap<String, f64>> {
        let url = format!("{node}/addresses/{address}");
        let response = self.get(&url).await?;
        response
            .json()
            .await
            .map_err(|e| ChainError::PeerUnreachable(format!("{url}: {e}")))
    }

    /// Submits a signed transaction to a node; a non-success status surfaces
    /// the node's error text.
    pub async fn submit(&self, node: &str, tx: &Transaction) -> Result<()> {
        let url = format!("{node}/transactions");
        let response = self
            .http
            .post(&url)
            .json(tx)
            .send()
            .await
            .map_err(|e| ChainError::PeerUnreachable(format!("{url}: {e}")))?;

        if response.status().is_success() {
            return Ok(());
        }
        let reason = response.text().await.unwrap_or_default();
        Err(ChainError::Rejected(reason))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ChainError::PeerUnreachable(format!("{url}: {e}")))?;
        response
            .error_for_status()
            .map_err(|e| ChainError::PeerUnreachable(format!("{url}: {e}")))
    }
}
