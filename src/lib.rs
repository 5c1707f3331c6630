//! # Ledger-Proof
//!
//! A minimal append-only ledger secured by three primitives built from scratch:
//! a 256-bit digest, a Merkle aggregation over that digest, and a textbook
//! public/private key signature scheme, combined into a proof-of-work chain.
//!
//! ## Architecture
//!
//! Components, leaf to root:
//! - [`digest`] - fixed-output hash over arbitrary bytes
//! - [`signature`] - key generation, sign and verify over character sequences
//! - [`merkle`] - pairwise reduction of items to one digest
//! - [`transaction`] - signed transfers and their canonical documents
//! - [`block`] / [`mining`] / [`chain`] - block construction, nonce search, linking and validation
//! - [`journal`] - JSON Lines transaction log
//!
//! ## Design Principles
//!
//! 1. **Pure Primitives**: digest, Merkle and signature functions are deterministic and side-effect-free
//! 2. **Explicit Failure**: signature and document mismatches are errors, never ignored
//! 3. **Cancellable Mining**: the nonce search observes a cancel flag and deadline
//! 4. **Not Secure Keys**: key generation uses three-digit primes for demonstration only
//!
//! ## Usage
//!
//! ```rust
//! use ledger_proof::LedgerProof;
//! use ledger_proof::chain::Ledger;
//!
//! let proof = LedgerProof::new();
//! let keys = proof.generate_keys();
//! let tx = proof.submit_transaction("Alice", "Bob", 10, &keys.private).unwrap();
//!
//! let mut ledger = Ledger::new(1);
//! ledger.submit(tx, &keys.public).unwrap();
//! let block = proof.mine_next_block(&mut ledger, 1).unwrap();
//!
//! assert!(block.digest_str().starts_with('0'));
//! assert!(proof.validate(ledger.chain()));
//! ```

pub mod constants;
pub mod error;
pub mod digest;
pub mod signature;
pub mod merkle;
pub mod transaction;
pub mod journal;
pub mod block;
pub mod mining;
pub mod chain;
pub mod config;

// Re-export commonly used types
pub use block::Block;
pub use chain::Ledger;
pub use constants::*;
pub use error::{LedgerError, Result};
pub use signature::{KeyPair, RsaKey};
pub use transaction::Transaction;

/// Boundary surface consumed by display and entry-point layers
///
/// # Examples
///
/// ```
/// use ledger_proof::LedgerProof;
///
/// let proof = LedgerProof::new();
/// let keys = proof.generate_keys();
/// let tx = proof.submit_transaction("Alice", "Bob", 10, &keys.private).unwrap();
/// assert!(tx.verify(&keys.public).is_ok());
/// ```
pub struct LedgerProof;

impl LedgerProof {
    /// Create a new ledger proof instance
    pub fn new() -> Self {
        Self
    }

    /// Generate a key pair
    ///
    /// # Examples
    ///
    /// ```
    /// use ledger_proof::LedgerProof;
    ///
    /// let keys = LedgerProof::new().generate_keys();
    /// assert_eq!(keys.public.modulus, keys.private.modulus);
    /// ```
    pub fn generate_keys(&self) -> KeyPair {
        signature::generate_keys()
    }

    /// Build and sign a transaction with the sender's private key
    pub fn submit_transaction(
        &self,
        sender: &str,
        receiver: &str,
        amount: u64,
        private: &RsaKey,
    ) -> Result<Transaction> {
        transaction::submit_transaction(sender, receiver, amount, private)
    }

    /// Mine the ledger's pending pool at `difficulty` and append the block
    pub fn mine_next_block(&self, ledger: &mut Ledger, difficulty: usize) -> Result<Block> {
        chain::mine_next_block(ledger, difficulty)
    }

    /// Link-only chain validation
    ///
    /// # Examples
    ///
    /// ```
    /// use ledger_proof::LedgerProof;
    ///
    /// // An empty chain is trivially valid
    /// assert!(LedgerProof::new().validate(&[]));
    /// ```
    pub fn validate(&self, chain: &[Block]) -> bool {
        chain::validate(chain)
    }

    /// Link, digest, proof-of-work and Merkle root validation; each block is
    /// held to its recorded difficulty, never less than `min_difficulty`
    pub fn validate_strict(&self, chain: &[Block], min_difficulty: usize) -> Result<()> {
        chain::validate_strict(chain, min_difficulty)
    }

    /// Human-readable block text
    pub fn render(&self, block: &Block) -> String {
        block::render(block)
    }

    /// Digest of arbitrary bytes as 64 lowercase hex characters
    ///
    /// # Examples
    ///
    /// ```
    /// use ledger_proof::LedgerProof;
    ///
    /// assert_eq!(
    ///     LedgerProof::new().digest(b""),
    ///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    pub fn digest(&self, data: &[u8]) -> String {
        digest::digest(data)
    }

    /// Merkle root of `items`
    pub fn build_root(&self, items: &[&str]) -> Result<String> {
        merkle::build_root(items)
    }
}

impl Default for LedgerProof {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_proof_new() {
        let _proof = LedgerProof::new();
    }

    #[test]
    fn test_ledger_proof_default() {
        let _proof = LedgerProof::default();
    }

    #[test]
    fn test_submit_and_mine() {
        let proof = LedgerProof::new();
        let keys = proof.generate_keys();
        let tx = proof.submit_transaction("Alice", "Bob", 10, &keys.private).unwrap();

        let mut ledger = Ledger::new(1);
        ledger.submit(tx, &keys.public).unwrap();
        let block = proof.mine_next_block(&mut ledger, 1).unwrap();

        assert_eq!(block.previous_digest, GENESIS_PREVIOUS_DIGEST);
        assert!(proof.validate(ledger.chain()));
        assert!(proof.validate_strict(ledger.chain(), 1).is_ok());
        assert!(proof.render(&block).contains(block.digest_str()));
    }

    #[test]
    fn test_build_root_single() {
        let proof = LedgerProof::new();
        assert_eq!(proof.build_root(&["x"]).unwrap(), proof.digest(b"x"));
    }
}
