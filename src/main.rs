//! Run-once ledger demonstration: sign transfers, mine two blocks, validate, print.

use anyhow::{Context, Result};
use ledger_proof::chain::{validate, validate_strict, Ledger};
use ledger_proof::config::LedgerConfig;
use ledger_proof::journal::Journal;
use ledger_proof::mining::MiningControl;
use ledger_proof::signature::{generate_keys, KeyPair};
use ledger_proof::transaction::submit_transaction;
use std::collections::BTreeMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TRANSFERS: [(&str, &str, u64); 10] = [
    ("Alice", "Bob", 10),
    ("Bob", "Charlie", 5),
    ("Charlie", "Dave", 2),
    ("Dave", "Alice", 1),
    ("Alice", "Eve", 20),
    ("Eve", "Bob", 15),
    ("Bob", "Alice", 30),
    ("Charlie", "Dave", 5),
    ("Dave", "Bob", 10),
    ("Alice", "Charlie", 25),
];

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "ledger.toml".to_string());
    let config = LedgerConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(difficulty = config.difficulty, journal = %config.journal_path, "starting ledger demo");

    let mut keys: BTreeMap<&str, KeyPair> = BTreeMap::new();
    for (sender, receiver, _) in TRANSFERS {
        keys.entry(sender).or_insert_with(generate_keys);
        keys.entry(receiver).or_insert_with(generate_keys);
    }

    let journal = Journal::open(&config.journal_path);
    let mut ledger = Ledger::new(config.difficulty);

    for round in 1..=2 {
        for (sender, receiver, amount) in TRANSFERS {
            let pair = &keys[sender];
            let tx = submit_transaction(sender, receiver, amount, &pair.private)?;
            ledger
                .submit(tx.clone(), &pair.public)
                .with_context(|| format!("submitting {}->{}:{}", sender, receiver, amount))?;
            journal.append(&tx).context("writing transaction journal")?;
        }

        let control = match config.mining_timeout() {
            Some(timeout) => MiningControl::with_timeout(timeout),
            None => MiningControl::new(),
        };
        println!("Mining block {}.", round);
        let (handle, consumed) = ledger.spawn_next_block(control)?;
        let block = handle.join().await.context("mining block")?;
        ledger.commit_mined(block, consumed)?;
    }

    println!("Validating the blockchain.");
    println!("Blockchain is valid: {}", validate(ledger.chain()));
    if let Err(e) = validate_strict(ledger.chain(), ledger.difficulty()) {
        println!("Strict validation failed: {}", e);
    }

    println!("\nBlockchain contents:");
    for (i, block) in ledger.chain().iter().enumerate() {
        println!("Block {}:", i + 1);
        println!("{}", block);
    }

    Ok(())
}
