//! Error types for ledger integrity checks

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),

    #[error("Document mismatch: expected {expected:?}, recovered {recovered:?}")]
    DocumentMismatch { expected: String, recovered: String },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Chain link mismatch at block {index}: expected {expected}, found {found}")]
    ChainLinkMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid proof of work at block {index}: {digest} does not meet difficulty {difficulty}")]
    InvalidProofOfWork {
        index: usize,
        digest: String,
        difficulty: usize,
    },

    #[error("Digest mismatch at block {index}: stored {stored}, recomputed {recomputed}")]
    DigestMismatch {
        index: usize,
        stored: String,
        recomputed: String,
    },

    #[error("Merkle root mismatch at block {index}: stored {stored}, recomputed {recomputed}")]
    MerkleRootMismatch {
        index: usize,
        stored: String,
        recomputed: String,
    },

    #[error("Block is not mined: {0}")]
    UnminedBlock(String),

    #[error("Invalid difficulty {0}: at most {max} hex characters", max = crate::constants::MAX_DIFFICULTY)]
    InvalidDifficulty(usize),

    #[error("Mining cancelled after {attempts} attempts")]
    MiningCancelled { attempts: u64 },

    #[error("Mining timed out after {attempts} attempts")]
    MiningTimedOut { attempts: u64 },

    #[error("Malformed cipher: {0}")]
    MalformedCipher(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mining task failed: {0}")]
    TaskFailed(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
