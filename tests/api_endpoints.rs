//! Integration tests for the keelchain REST surface
//!
//! Drives the axum router end to end: chain and mempool queries, balance
//! lookups, transaction submission and the peer protocol endpoints.

use axum_test::TestServer;
use chrono::Utc;
use keelchain::api::{build_router, ApiState};
use keelchain::block::Block;
use keelchain::chain::Chain;
use keelchain::client::PeerAnnouncement;
use keelchain::consensus::INCREMENTOR_DIVISOR;
use keelchain::crypto::KeyPair;
use keelchain::peers::PeerSet;
use keelchain::transaction::{Transaction, REWARD_MEMO};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A two-block chain whose second block funds `keypair` with 10 KEEL.
fn funded_chain(keypair: &KeyPair) -> Chain {
    let mut chain = Chain::new();
    chain.genesis_block(keypair).expect("genesis");

    let genesis = chain.blocks[0].clone();
    let mut mint = Transaction::new(
        "KEEL",
        keypair.address(),
        keypair.address(),
        10.0,
        REWARD_MEMO,
        Utc::now(),
    )
    .expect("mint");
    mint.sign(keypair).expect("sign");

    let funding = Block::new(
        1,
        Utc::now(),
        vec![mint],
        keypair.address(),
        genesis.hash,
        INCREMENTOR_DIVISOR,
    )
    .expect("funding block");
    chain.blocks.push(funding);
    chain
}

fn test_server(chain: Chain) -> (TestServer, ApiState) {
    let state = ApiState {
        chain: Arc::new(RwLock::new(chain)),
        peers: Arc::new(PeerSet::new(Vec::new())),
    };
    let server = TestServer::new(build_router(state.clone())).expect("test server");
    (server, state)
}

fn signed_transfer(keypair: &KeyPair, amount: f64) -> Transaction {
    let mut tx = Transaction::new(
        "KEEL",
        keypair.address(),
        "dest_address",
        amount,
        "integration test",
        Utc::now(),
    )
    .expect("transaction");
    tx.sign(keypair).expect("sign");
    tx
}

#[tokio::test]
async fn test_chain_and_pending_queries() {
    let keypair = KeyPair::generate();
    let (server, _) = test_server(funded_chain(&keypair));

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let blocks: Vec<Block> = response.json();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].previous_hash, blocks[0].hash);

    let response = server.get("/pending").await;
    assert_eq!(response.status_code(), 200);
    let pending: Vec<Transaction> = response.json();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_balance_query() {
    let keypair = KeyPair::generate();
    let (server, _) = test_server(funded_chain(&keypair));

    let response = server.get(&format!("/addresses/{}", keypair.address())).await;
    assert_eq!(response.status_code(), 200);
    let balances: HashMap<String, f64> = response.json();
    assert_eq!(balances.get("KEEL"), Some(&10.0));

    // Untouched address has no balances at all
    let response = server.get("/addresses/nobody").await;
    assert_eq!(response.status_code(), 200);
    let balances: HashMap<String, f64> = response.json();
    assert!(balances.is_empty());
}

#[tokio::test]
async fn test_transaction_submission() {
    let keypair = KeyPair::generate();
    let (server, state) = test_server(funded_chain(&keypair));

    let response = server
        .post("/transactions")
        .json(&signed_transfer(&keypair, 2.0))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(state.chain.read().await.pending.len(), 1);
}

#[tokio::test]
async fn test_transaction_rejections() {
    let keypair = KeyPair::generate();
    let pauper = KeyPair::generate();
    let (server, state) = test_server(funded_chain(&keypair));

    // Broke sender
    let response = server
        .post("/transactions")
        .json(&signed_transfer(&pauper, 1.0))
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(response.text().contains("insufficient funds"));

    // Unsigned transaction
    let unsigned = Transaction::new(
        "KEEL",
        keypair.address(),
        "dest_address",
        1.0,
        "unsigned",
        Utc::now(),
    )
    .expect("transaction");
    let response = server.post("/transactions").json(&unsigned).await;
    assert_eq!(response.status_code(), 400);
    assert!(response.text().contains("invalid signature"));

    // Neither failure touched the mempool
    assert!(state.chain.read().await.pending.is_empty());
}

#[tokio::test]
async fn test_peer_protocol_endpoints() {
    let keypair = KeyPair::generate();
    let (server, _) = test_server(funded_chain(&keypair));

    let response = server.get("/peers").await;
    assert_eq!(response.status_code(), 200);
    let peers: Value = response.json();
    assert_eq!(peers, serde_json::json!([]));

    let response = server
        .post("/peers")
        .json(&PeerAnnouncement {
            endpoint: "http://10.0.0.7:8081".to_string(),
        })
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server.get("/peers").await;
    let peers: Vec<String> = response.json();
    assert_eq!(peers, vec!["http://10.0.0.7:8081"]);
}
