//! Block structure, digest formula and difficulty predicate

use crate::digest::digest_str;
use crate::error::Result;
use crate::merkle::build_root;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block: ℍ × ℕ × ℍ × ℕ × ℍ?
///
/// `digest` is unset until the block is mined. Once mined:
/// digest = Digest(previous_digest ‖ timestamp ‖ merkle_root ‖ nonce)
/// and the digest satisfies the chain difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub previous_digest: String,
    /// Unix seconds
    pub timestamp: i64,
    pub merkle_root: String,
    pub nonce: u64,
    pub digest: Option<String>,
    /// Difficulty the block was mined at; not part of the digest
    #[serde(default)]
    pub difficulty: usize,
    /// Transactions aggregated into `merkle_root`; not part of the digest
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Unmined block over `transactions` with nonce 0
    pub fn new(
        previous_digest: impl Into<String>,
        timestamp: i64,
        transactions: Vec<Transaction>,
    ) -> Result<Self> {
        let merkle_root = transaction_merkle_root(&transactions)?;
        Ok(Block {
            previous_digest: previous_digest.into(),
            timestamp,
            merkle_root,
            nonce: 0,
            digest: None,
            difficulty: 0,
            transactions,
        })
    }

    /// Digest of the header fields at the current nonce
    pub fn recompute_digest(&self) -> String {
        calculate_digest(&self.previous_digest, self.timestamp, &self.merkle_root, self.nonce)
    }

    /// Stored digest, or the empty string for an unmined block
    pub fn digest_str(&self) -> &str {
        self.digest.as_deref().unwrap_or("")
    }

    pub fn is_mined(&self) -> bool {
        self.digest.is_some()
    }
}

/// CalculateDigest: ℍ × ℕ × ℍ × ℕ → ℍ
///
/// Decimal renderings of timestamp and nonce are concatenated as text.
pub fn calculate_digest(previous_digest: &str, timestamp: i64, merkle_root: &str, nonce: u64) -> String {
    digest_str(&format!("{}{}{}{}", previous_digest, timestamp, merkle_root, nonce))
}

/// Difficulty predicate: the first `difficulty` hex characters are all '0'
pub fn meets_difficulty(digest: &str, difficulty: usize) -> bool {
    digest.len() >= difficulty && digest.bytes().take(difficulty).all(|b| b == b'0')
}

/// Merkle root over the canonical documents of `transactions`
pub fn transaction_merkle_root(transactions: &[Transaction]) -> Result<String> {
    let documents: Vec<String> = transactions.iter().map(Transaction::canonical_document).collect();
    build_root(&documents)
}

/// Human-readable rendering for display layers
pub fn render(block: &Block) -> String {
    block.to_string()
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block Hash: {}", self.digest.as_deref().unwrap_or("<unmined>"))?;
        writeln!(f, "Merkle Root: {}", self.merkle_root)?;
        writeln!(f, "Previous Hash: {}", self.previous_digest)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Difficulty: {}", self.difficulty)?;
        writeln!(f, "Transactions: {}", self.transactions.len())?;
        write!(f, "---------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENESIS_PREVIOUS_DIGEST;
    use crate::error::LedgerError;

    #[test]
    fn test_digest_formula() {
        let expected = digest_str("01700000000abc7");
        assert_eq!(calculate_digest("0", 1700000000, "abc", 7), expected);
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty("00ab", 0));
        assert!(meets_difficulty("00ab", 2));
        assert!(!meets_difficulty("00ab", 3));
        assert!(!meets_difficulty("00", 3));
    }

    #[test]
    fn test_new_block_is_unmined() {
        let block = Block::new(
            GENESIS_PREVIOUS_DIGEST,
            1700000000,
            vec![Transaction::new("Alice", "Bob", 10)],
        )
        .unwrap();
        assert!(!block.is_mined());
        assert_eq!(block.nonce, 0);
        assert_eq!(block.merkle_root, digest_str("Alice->Bob:10"));
        assert_eq!(block.digest_str(), "");
    }

    #[test]
    fn test_new_block_requires_transactions() {
        assert!(matches!(
            Block::new(GENESIS_PREVIOUS_DIGEST, 0, vec![]),
            Err(LedgerError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_render() {
        let mut block = Block::new("0", 42, vec![Transaction::new("A", "B", 1)]).unwrap();
        block.digest = Some(block.recompute_digest());
        let text = render(&block);
        assert!(text.starts_with(&format!("Block Hash: {}", block.digest_str())));
        assert!(text.contains("Previous Hash: 0\n"));
        assert!(text.contains("Timestamp: 42\n"));
        assert!(text.ends_with("---------------"));
    }
}
