//! Proof-of-work search with cooperative cancellation
//!
//! The search is CPU-bound and unbounded. Every `CANCEL_CHECK_INTERVAL`
//! nonces it checks a shared cancel flag and an optional deadline, and
//! publishes the number of nonces tried so far.

use crate::block::{meets_difficulty, Block};
use crate::constants::{CANCEL_CHECK_INTERVAL, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Shared cancellation, deadline and progress state for one search.
///
/// Clones share the same flag and counter.
#[derive(Debug, Clone, Default)]
pub struct MiningControl {
    cancel: Arc<AtomicBool>,
    attempts: Arc<AtomicU64>,
    deadline: Option<Instant>,
}

impl MiningControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up once `timeout` has elapsed from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        MiningControl {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// Request cancellation; observed at the next check interval
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Nonces tried so far (updated at each check interval and on completion)
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    fn check(&self, attempts: u64) -> Result<()> {
        self.attempts.store(attempts, Ordering::Relaxed);
        if self.is_cancelled() {
            return Err(LedgerError::MiningCancelled { attempts });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(LedgerError::MiningTimedOut { attempts });
        }
        Ok(())
    }
}

/// MineBlock: 𝒯𝒳* × ℍ × ℕ → ℬ
///
/// Builds a block over `transactions` stamped with the current unix time and
/// searches for a nonce satisfying `difficulty`.
pub fn mine_block(
    transactions: Vec<Transaction>,
    previous_digest: &str,
    difficulty: usize,
    control: &MiningControl,
) -> Result<Block> {
    let timestamp = chrono::Utc::now().timestamp();
    mine_block_at(transactions, previous_digest, timestamp, difficulty, control)
}

/// `mine_block` with an explicit timestamp
pub fn mine_block_at(
    transactions: Vec<Transaction>,
    previous_digest: &str,
    timestamp: i64,
    difficulty: usize,
    control: &MiningControl,
) -> Result<Block> {
    let block = Block::new(previous_digest, timestamp, transactions)?;
    mine(block, difficulty, control)
}

/// Search nonces from 0 upward until the block digest meets `difficulty`
pub fn mine(mut block: Block, difficulty: usize, control: &MiningControl) -> Result<Block> {
    if difficulty > MAX_DIFFICULTY {
        return Err(LedgerError::InvalidDifficulty(difficulty));
    }

    debug!(
        previous = %block.previous_digest,
        merkle_root = %block.merkle_root,
        difficulty,
        "mining started"
    );

    let mut nonce: u64 = 0;
    loop {
        if nonce % CANCEL_CHECK_INTERVAL == 0 {
            if let Err(e) = control.check(nonce) {
                warn!(attempts = nonce, error = %e, "mining stopped");
                return Err(e);
            }
        }

        block.nonce = nonce;
        let digest = block.recompute_digest();
        if meets_difficulty(&digest, difficulty) {
            control.attempts.store(nonce + 1, Ordering::Relaxed);
            info!(%digest, nonce, "block mined");
            block.digest = Some(digest);
            block.difficulty = difficulty;
            return Ok(block);
        }
        nonce += 1;
    }
}

/// Handle to a search running on the blocking thread pool
#[derive(Debug)]
pub struct MiningHandle {
    control: MiningControl,
    task: JoinHandle<Result<Block>>,
}

impl MiningHandle {
    pub fn cancel(&self) {
        self.control.cancel();
    }

    pub fn attempts(&self) -> u64 {
        self.control.attempts()
    }

    pub fn control(&self) -> &MiningControl {
        &self.control
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the search to finish
    pub async fn join(self) -> Result<Block> {
        self.task
            .await
            .map_err(|e| LedgerError::TaskFailed(e.to_string()))?
    }
}

/// Run `mine_block` on the tokio blocking pool.
///
/// Must be called from within a tokio runtime. `transactions` is owned by
/// the task, so later changes to the caller's pool do not affect the search.
pub fn spawn_mining(
    transactions: Vec<Transaction>,
    previous_digest: String,
    difficulty: usize,
    control: MiningControl,
) -> MiningHandle {
    let worker = control.clone();
    let task = tokio::task::spawn_blocking(move || {
        mine_block(transactions, &previous_digest, difficulty, &worker)
    });
    MiningHandle { control, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENESIS_PREVIOUS_DIGEST;

    fn txs() -> Vec<Transaction> {
        vec![Transaction::new("Alice", "Bob", 10)]
    }

    #[test]
    fn test_difficulty_zero_stops_at_nonce_zero() {
        let control = MiningControl::new();
        let block = mine_block_at(txs(), GENESIS_PREVIOUS_DIGEST, 1700000000, 0, &control).unwrap();
        assert_eq!(block.nonce, 0);
        assert_eq!(block.digest.as_deref(), Some(block.recompute_digest().as_str()));
        assert_eq!(control.attempts(), 1);
    }

    #[test]
    fn test_difficulty_two() {
        let control = MiningControl::new();
        let block = mine_block_at(txs(), GENESIS_PREVIOUS_DIGEST, 1700000000, 2, &control).unwrap();
        assert!(block.digest_str().starts_with("00"));
        assert_eq!(block.digest_str(), block.recompute_digest());
        assert_eq!(block.difficulty, 2);
        assert_eq!(control.attempts(), block.nonce + 1);
    }

    #[test]
    fn test_first_satisfying_nonce_is_returned() {
        let control = MiningControl::new();
        let block = mine_block_at(txs(), "0", 1700000000, 1, &control).unwrap();
        for nonce in 0..block.nonce {
            let mut candidate = block.clone();
            candidate.nonce = nonce;
            assert!(!meets_difficulty(&candidate.recompute_digest(), 1));
        }
    }

    #[test]
    fn test_precancelled() {
        let control = MiningControl::new();
        control.cancel();
        let result = mine_block_at(txs(), "0", 0, MAX_DIFFICULTY, &control);
        assert!(matches!(result, Err(LedgerError::MiningCancelled { attempts: 0 })));
    }

    #[test]
    fn test_expired_deadline() {
        let control = MiningControl::with_deadline(Instant::now());
        let result = mine_block_at(txs(), "0", 0, MAX_DIFFICULTY, &control);
        assert!(matches!(result, Err(LedgerError::MiningTimedOut { .. })));
    }

    #[test]
    fn test_difficulty_out_of_range() {
        let result = mine_block_at(txs(), "0", 0, MAX_DIFFICULTY + 1, &MiningControl::new());
        assert!(matches!(result, Err(LedgerError::InvalidDifficulty(65))));
    }

    #[test]
    fn test_empty_transactions() {
        let result = mine_block_at(vec![], "0", 0, 0, &MiningControl::new());
        assert!(matches!(result, Err(LedgerError::EmptyInput(_))));
    }

    #[tokio::test]
    async fn test_spawned_mining_can_be_cancelled() {
        let handle = spawn_mining(txs(), "0".to_string(), MAX_DIFFICULTY, MiningControl::new());
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        assert!(matches!(
            handle.join().await,
            Err(LedgerError::MiningCancelled { .. })
        ));
    }

    #[tokio::test]
    async fn test_spawned_mining_completes() {
        let handle = spawn_mining(txs(), "0".to_string(), 1, MiningControl::new());
        let block = handle.join().await.unwrap();
        assert!(block.digest_str().starts_with('0'));
    }
}
