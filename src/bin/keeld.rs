//! keelchain validator daemon
//!
//! Runs the validator control loop and serves the REST API off the same
//! in-memory chain state.

use clap::Parser;
use keelchain::api::{build_router, ApiState};
use keelchain::chain::Chain;
use keelchain::client::Client;
use keelchain::config::load_config;
use keelchain::keystore;
use keelchain::node::{Node, NodeTiming};
use keelchain::peers::PeerSet;
use keelchain::sync::Synchronizer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Parser)]
#[command(name = "keeld", about = "keelchain validator daemon")]
struct Args {
    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address and port to bind the REST API to
    #[arg(long)]
    bind: Option<String>,

    /// Seed peer endpoint, e.g. http://host:8081 (repeatable)
    #[arg(long = "seed")]
    seeds: Vec<String>,

    /// Validator key file
    #[arg(long)]
    key: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.network.bind = bind;
    }
    config.network.seed_peers.extend(args.seeds);
    if let Some(key) = args.key {
        config.validator.key_path = Some(key);
    }

    let key_path = match &config.validator.key_path {
        Some(path) => path.clone(),
        None => keystore::default_key_path()?,
    };
    let keypair = keystore::load_or_generate(&key_path)?;
    info!(address = %keypair.address(), "validator identity loaded");

    let public_endpoint = config
        .network
        .public_endpoint
        .clone()
        .unwrap_or_else(|| format!("http://{}", config.network.bind));

    let chain = Arc::new(RwLock::new(Chain::new()));
    let peers = Arc::new(PeerSet::new(config.network.seed_peers.clone()));
    let client = Client::new(Duration::from_secs(config.network.peer_timeout_secs))?;
    let sync = Arc::new(Synchronizer::new(client, peers.clone(), public_endpoint));
    let timing = NodeTiming {
        gossip: Duration::from_secs(config.network.gossip_interval_secs),
        discovery: Duration::from_secs(config.network.discovery_interval_secs),
        poll: Duration::from_secs(config.network.poll_interval_secs),
    };

    let node = Arc::new(Node::new(
        chain.clone(),
        keypair,
        sync,
        timing,
        config.network.validate_imported_chains,
    ));
    tokio::spawn(node.run());

    let router = build_router(ApiState { chain, peers });
    let listener = tokio::net::TcpListener::bind(&config.network.bind).await?;
    info!(bind = %config.network.bind, "REST API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
