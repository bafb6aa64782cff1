#![forbid(unsafe_code)]

use clap::Parser;
use colored::*;
use rand::Rng;
use tallychain::blockchain::validate_chain;
use tallychain::config::{load_config, DEFAULT_CONFIG_PATH};
use tallychain::mempool::Mempool;
use tallychain::node::LedgerNode;
use tallychain::transaction::Transaction;

#[derive(Parser)]
#[command(name = "tally-demo", about = "Build a random ledger and validate it")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override logging.level from the configuration
    #[arg(long)]
    log_level: Option<String>,
}

/// A random transfer between Alice and Bob, in either direction.
fn random_transaction<R: Rng>(rng: &mut R, max_value: i64) -> Transaction {
    let amount = rng.gen_range(1..=max_value);
    if rng.gen_bool(0.5) {
        Transaction::transfer("Alice", "Bob", amount)
    } else {
        Transaction::transfer("Bob", "Alice", amount)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    tracing_subscriber::fmt().with_max_level(config.log_level()?).init();

    println!("{}", "TallyChain demo".bright_cyan().bold());
    println!("{}", "---------------".bright_cyan());

    let mut rng = rand::thread_rng();
    let mut mempool: Mempool = (0..config.producer.transaction_count)
        .map(|_| random_transaction(&mut rng, config.producer.max_transfer))
        .collect();

    let mut node_a = LedgerNode::new("node-a", &config.genesis_state());
    while !mempool.is_empty() {
        node_a.produce_block(&mut mempool, config.producer.block_size_limit)?;
    }

    let state = validate_chain(node_a.chain())?;
    println!(
        "{} {} blocks, balances {}",
        "Chain valid:".bright_green(),
        node_a.height(),
        serde_json::to_string(&state)?
    );

    // A peer builds on a copy of the chain and ships the block over.
    let peer = LedgerNode::from_chain("node-b", node_a.chain().clone())?;
    let batch = (0..config.producer.block_size_limit)
        .map(|_| random_transaction(&mut rng, config.producer.max_transfer))
        .collect();
    let new_block = peer.propose_block(batch)?;

    println!("Blockchain on node-a is currently {} blocks long", node_a.height());
    println!("New block received. Checking validity...");
    if let Err(e) = node_a.receive_block(new_block) {
        println!("{} {}", "Invalid block, ignoring:".yellow(), e);
    }
    println!("Blockchain on node-a is currently {} blocks long", node_a.height());

    Ok(())
}
