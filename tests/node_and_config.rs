//! Integration tests for nodes exchanging blocks and file-based configuration

use std::fs;
use tallychain::blockchain::{validate_candidates, validate_chain};
use tallychain::config::load_config;
use tallychain::error::{ChainError, ValidationError};
use tallychain::mempool::Mempool;
use tallychain::node::LedgerNode;
use tallychain::transaction::Transaction;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_genesis() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("tally.toml");
    fs::write(
        &path,
        "[genesis.balances]\nAlice = 10\nCarol = 90\n\n[producer]\nblock_size_limit = 2\n",
    )?;

    let config = load_config(&path)?;
    let node = LedgerNode::new("a", &config.genesis_state());

    assert_eq!(node.state().get("Carol"), 90);
    assert_eq!(node.state().get("Bob"), 0);
    assert_eq!(config.producer.block_size_limit, 2);
    Ok(())
}

#[test]
fn test_missing_config_file_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = load_config(dir.path().join("absent.toml"))?;
    assert_eq!(config.producer.block_size_limit, 5);
    assert_eq!(config.genesis_state().total(), 100);
    Ok(())
}

#[test]
fn test_malformed_config_file_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("tally.toml");
    fs::write(&path, "[producer\n")?;
    assert!(matches!(load_config(&path), Err(ChainError::Config(_))));
    Ok(())
}

#[test]
fn test_peer_block_is_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config("does-not-exist.toml")?;
    let mut node_a = LedgerNode::new("a", &config.genesis_state());
    let mut pool: Mempool = (1..=12)
        .map(|i| Transaction::transfer("Alice", "Bob", i % 3 + 1))
        .collect();
    while !pool.is_empty() {
        node_a.produce_block(&mut pool, 5)?;
    }

    let node_b = LedgerNode::from_chain("b", node_a.chain().clone())?;
    assert_eq!(node_b.state(), node_a.state());

    let block = node_b.propose_block(vec![Transaction::transfer("Bob", "Alice", 1)])?;
    let height = node_a.height();
    node_a.receive_block(block)?;
    assert_eq!(node_a.height(), height + 1);
    assert_eq!(validate_chain(node_a.chain()).as_ref(), Ok(node_a.state()));
    Ok(())
}

#[test]
fn test_stale_peer_block_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config("does-not-exist.toml")?;
    let mut node_a = LedgerNode::new("a", &config.genesis_state());
    let node_b = LedgerNode::from_chain("b", node_a.chain().clone())?;

    // node-a moves on before node-b's proposal arrives.
    let own = node_a.propose_block(vec![Transaction::transfer("Alice", "Bob", 1)])?;
    node_a.receive_block(own)?;
    let before = node_a.state().clone();

    let stale = node_b.propose_block(vec![Transaction::transfer("Bob", "Alice", 1)])?;
    assert_eq!(node_a.receive_block(stale), Err(ValidationError::BadBlockNumber(1)));
    assert_eq!(node_a.state(), &before);
    assert_eq!(node_a.height(), 2);
    Ok(())
}

#[test]
fn test_competing_proposals_validate_in_parallel() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config("does-not-exist.toml")?;
    let node = LedgerNode::new("a", &config.genesis_state());
    let candidates = (0..16)
        .map(|i| node.propose_block(vec![Transaction::transfer("Alice", "Bob", i * 5)]))
        .collect::<Result<Vec<_>, _>>()?;

    let tip = &node.chain().blocks()[0];
    let results = validate_candidates(tip, node.state(), &candidates);

    // Alice holds 50, so amounts 0..=50 pass and 55.. overdraw.
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 11);
    assert_eq!(node.height(), 1);
    Ok(())
}
