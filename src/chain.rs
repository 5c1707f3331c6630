//! Ledger: ordered chain of mined blocks plus a pool of pending transactions

use crate::block::{meets_difficulty, transaction_merkle_root, Block};
use crate::constants::GENESIS_PREVIOUS_DIGEST;
use crate::error::{LedgerError, Result};
use crate::mining::{self, MiningControl, MiningHandle};
use crate::signature::RsaKey;
use crate::transaction::Transaction;
use tracing::{info, warn};

/// Ledger: ℬ* × 𝒯𝒳* × ℕ
///
/// Invariant: chain[0].previous_digest == "0" and every later block links to
/// its predecessor's digest. Both sequences are owned exclusively.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: usize,
}

/// Pending transactions captured for one mining run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSnapshot {
    pub transactions: Vec<Transaction>,
    pub previous_digest: String,
    pub difficulty: usize,
}

impl Ledger {
    pub fn new(difficulty: usize) -> Self {
        Ledger {
            chain: Vec::new(),
            pending: Vec::new(),
            difficulty,
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Digest the next block must reference: the tip's digest, or the
    /// genesis sentinel for an empty chain
    pub fn tip_digest(&self) -> String {
        self.chain
            .last()
            .map(|b| b.digest_str().to_string())
            .unwrap_or_else(|| GENESIS_PREVIOUS_DIGEST.to_string())
    }

    /// Verify `tx` against the sender's public key and add it to the pool.
    /// A transaction that fails verification is not added.
    pub fn submit(&mut self, tx: Transaction, public: &RsaKey) -> Result<()> {
        if let Err(e) = tx.verify(public) {
            warn!(document = %tx.canonical_document(), error = %e, "transaction rejected");
            return Err(e);
        }
        self.pending.push(tx);
        Ok(())
    }

    /// Copy the pending pool for a mining run
    pub fn snapshot_pending(&self) -> PendingSnapshot {
        PendingSnapshot {
            transactions: self.pending.clone(),
            previous_digest: self.tip_digest(),
            difficulty: self.difficulty,
        }
    }

    /// Mine the pending pool on the calling thread at the ledger's
    /// difficulty, append the block and clear the mined transactions
    pub fn mine_next_block(&mut self, control: &MiningControl) -> Result<Block> {
        self.mine_next_block_at(self.difficulty, control)
    }

    /// `mine_next_block` at an explicit difficulty. The ledger's default
    /// difficulty is left unchanged; the block records the one it was mined at.
    pub fn mine_next_block_at(&mut self, difficulty: usize, control: &MiningControl) -> Result<Block> {
        let snapshot = self.snapshot_pending();
        let consumed = snapshot.transactions.len();
        let block = mining::mine_block(
            snapshot.transactions,
            &snapshot.previous_digest,
            difficulty,
            control,
        )?;
        self.commit_mined(block.clone(), consumed)?;
        Ok(block)
    }

    /// Snapshot the pool and start mining it on the blocking pool.
    ///
    /// Returns the handle and the number of transactions consumed, to be
    /// passed to `commit_mined` once the block arrives. Transactions
    /// submitted meanwhile stay pending for the next block.
    pub fn spawn_next_block(&self, control: MiningControl) -> Result<(MiningHandle, usize)> {
        let snapshot = self.snapshot_pending();
        if snapshot.transactions.is_empty() {
            return Err(LedgerError::EmptyInput(
                "no pending transactions to mine".to_string(),
            ));
        }
        let consumed = snapshot.transactions.len();
        let handle = mining::spawn_mining(
            snapshot.transactions,
            snapshot.previous_digest,
            snapshot.difficulty,
            control,
        );
        Ok((handle, consumed))
    }

    /// Append a mined block and drop the first `consumed` pending transactions.
    /// An unmined block is rejected and the pool is left untouched.
    pub fn commit_mined(&mut self, block: Block, consumed: usize) -> Result<()> {
        self.append(block)?;
        let consumed = consumed.min(self.pending.len());
        self.pending.drain(..consumed);
        Ok(())
    }

    /// Push a mined block onto the chain. Earlier blocks are not re-validated.
    pub fn append(&mut self, block: Block) -> Result<()> {
        let Some(digest) = block.digest.as_deref() else {
            return Err(LedgerError::UnminedBlock(format!(
                "block at height {} has no digest",
                self.chain.len()
            )));
        };
        info!(height = self.chain.len(), %digest, "block appended");
        self.chain.push(block);
        Ok(())
    }

    /// Mutable access for tests and tooling that tamper with stored blocks
    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }
}

/// MineNextBlock: mine the ledger's pending pool at `difficulty`
pub fn mine_next_block(ledger: &mut Ledger, difficulty: usize) -> Result<Block> {
    ledger.mine_next_block_at(difficulty, &MiningControl::new())
}

/// Validate: ∀ i > 0, chain[i].previous_digest = chain[i-1].digest
///
/// Link check only; an empty chain is valid. An unmined predecessor has no
/// digest to link to, so it breaks the link.
pub fn validate(chain: &[Block]) -> bool {
    for (i, pair) in chain.windows(2).enumerate() {
        if pair[0].digest.as_deref() != Some(pair[1].previous_digest.as_str()) {
            warn!(index = i + 1, "chain link mismatch");
            return false;
        }
    }
    true
}

/// Strict validation. In addition to the links it checks, per block:
/// 1. The first block carries the genesis sentinel
/// 2. The block is mined and its stored digest matches its header
/// 3. The digest meets the difficulty the block records, and never less
///    than `min_difficulty`
/// 4. The Merkle root matches the embedded transactions, when present
pub fn validate_strict(chain: &[Block], min_difficulty: usize) -> Result<()> {
    for (index, block) in chain.iter().enumerate() {
        if !block.is_mined() {
            return Err(LedgerError::UnminedBlock(format!("block at height {}", index)));
        }

        let expected_previous = match index {
            0 => GENESIS_PREVIOUS_DIGEST,
            _ => chain[index - 1].digest_str(),
        };
        if block.previous_digest != expected_previous {
            return Err(LedgerError::ChainLinkMismatch {
                index,
                expected: expected_previous.to_string(),
                found: block.previous_digest.clone(),
            });
        }

        let recomputed = block.recompute_digest();
        if block.digest_str() != recomputed {
            return Err(LedgerError::DigestMismatch {
                index,
                stored: block.digest_str().to_string(),
                recomputed,
            });
        }

        let difficulty = block.difficulty.max(min_difficulty);
        if !meets_difficulty(&recomputed, difficulty) {
            return Err(LedgerError::InvalidProofOfWork {
                index,
                digest: recomputed,
                difficulty,
            });
        }

        if !block.transactions.is_empty() {
            let root = transaction_merkle_root(&block.transactions)?;
            if root != block.merkle_root {
                return Err(LedgerError::MerkleRootMismatch {
                    index,
                    stored: block.merkle_root.clone(),
                    recomputed: root,
                });
            }
        }
    }
    Ok(())
}
