//! keelchain CLI wallet
//!
//! Talks to a running node over its REST API with the key pair stored under
//! the user's home directory.

use chrono::Utc;
use clap::{Parser, Subcommand};
use keelchain::client::Client;
use keelchain::keystore;
use keelchain::transaction::Transaction;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "keel-wallet", about = "keelchain CLI wallet")]
struct Cli {
    /// Node endpoint to talk to
    #[arg(long, default_value = "http://127.0.0.1:8081")]
    node: String,

    /// Key file; defaults to ~/.keelchain/key.pem
    #[arg(long)]
    key: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print this wallet's address
    Address,
    /// Show balances for an address (defaults to this wallet's)
    Balances { address: Option<String> },
    /// Create, sign and submit a transfer
    Send {
        destination: String,
        amount: f64,
        #[arg(long, default_value = "KEEL")]
        symbol: String,
        #[arg(long, default_value = "")]
        memo: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let key_path = match &cli.key {
        Some(path) => path.clone(),
        None => keystore::default_key_path()?,
    };
    let keypair = keystore::load_or_generate(&key_path)?;
    let client = Client::new(Duration::from_secs(5))?;

    match cli.command {
        Command::Address => {
            println!("{}", keypair.address());
        }
        Command::Balances { address } => {
            let address = address.unwrap_or_else(|| keypair.address());
            let balances = client.balances(&cli.node, &address).await?;
            if balances.is_empty() {
                println!("no balances for {address}");
            } else {
                let mut symbols: Vec<_> = balances.keys().collect();
                symbols.sort();
                for symbol in symbols {
                    println!("{symbol}: {}", balances[symbol]);
                }
            }
        }
        Command::Send {
            destination,
            amount,
            symbol,
            memo,
        } => {
            let mut tx = Transaction::new(
                symbol,
                keypair.address(),
                destination,
                amount,
                memo,
                Utc::now(),
            )?;
            tx.sign(&keypair)?;
            client.submit(&cli.node, &tx).await?;
            println!("submitted transaction {}", tx.id);
        }
    }

    Ok(())
}
