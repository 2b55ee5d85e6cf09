//! REST surface for the validator node
//!
//! Serves the chain, mempool and balance queries, accepts transaction
//! submissions, and speaks the node-to-node peer protocol (`GET /peers`,
//! `POST /peers`). Handlers share the same `Chain` lock as the control loop.

use crate::block::Block;
use crate::chain::Chain;
use crate::client::PeerAnnouncement;
use crate::error::ChainError;
use crate::peers::PeerSet;
use crate::transaction::Transaction;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::debug;

#[derive(Clone)]
pub struct ApiState {
    pub chain: Arc<RwLock<Chain>>,
    pub peers: Arc<PeerSet>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/chain", get(get_chain))
        .route("/pending", get(get_pending))
        .route("/addresses/:address", get(get_balances))
        .route("/transactions", post(post_transaction))
        .route("/peers", get(get_peers).post(post_peer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_chain(State(state): State<ApiState>) -> Json<Vec<Block>> {
    Json(state.chain.read().await.blocks.clone())
}

async fn get_pending(State(state): State<ApiState>) -> Json<Vec<Transaction>> {
    Json(state.chain.read().await.pending.clone())
}

async fn get_balances(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Json<HashMap<String, f64>> {
    Json(state.chain.read().await.balances(&address))
}

async fn post_transaction(
    State(state): State<ApiState>,
    Json(tx): Json<Transaction>,
) -> Result<StatusCode, (StatusCode, String)> {
    debug!(id = %tx.id, "transaction submitted");
    state
        .chain
        .write()
        .await
        .post_transaction(tx)
        .map(|_| StatusCode::OK)
        .map_err(|e| (status_for(&e), e.to_string()))
}

async fn get_peers(State(state): State<ApiState>) -> Json<Vec<String>> {
    Json(state.peers.snapshot().await)
}

async fn post_peer(
    State(state): State<ApiState>,
    Json(announcement): Json<PeerAnnouncement>,
) -> StatusCode {
    debug!(endpoint = %announcement.endpoint, "peer announced itself");
    state.peers.add(announcement.endpoint).await;
    StatusCode::OK
}

fn status_for(error: &ChainError) -> StatusCode {
    match error {
        ChainError::InvalidSignature(_)
        | ChainError::InsufficientBalance
        | ChainError::MalformedTransaction(_)
        | ChainError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
