//! Append-only transaction journal (JSON Lines)
//!
//! Each line is `{"sender", "receiver", "amount", "signature"}`. The signature
//! is written as comma-separated decimal integers so it can be parsed back
//! into the exact integer sequence; an unsigned transaction has an empty
//! signature string.

use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One journal line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    pub signature: String,
}

impl From<&Transaction> for JournalEntry {
    fn from(tx: &Transaction) -> Self {
        JournalEntry {
            sender: tx.sender.clone(),
            receiver: tx.receiver.clone(),
            amount: tx.amount,
            signature: encode_signature(tx.signature.as_deref().unwrap_or(&[])),
        }
    }
}

impl TryFrom<JournalEntry> for Transaction {
    type Error = LedgerError;

    fn try_from(entry: JournalEntry) -> Result<Self> {
        let values = decode_signature(&entry.signature)?;
        Ok(Transaction {
            sender: entry.sender,
            receiver: entry.receiver,
            amount: entry.amount,
            signature: if values.is_empty() { None } else { Some(values) },
        })
    }
}

/// Comma-separated decimal encoding of a signature
pub fn encode_signature(values: &[u64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Inverse of `encode_signature`
pub fn decode_signature(encoded: &str) -> Result<Vec<u64>> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    encoded
        .split(',')
        .map(|part| {
            part.trim().parse::<u64>().map_err(|e| {
                LedgerError::Serialization(format!("invalid signature value {:?}: {}", part, e))
            })
        })
        .collect()
}

/// File-backed journal
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Open a journal at `path`; the file is created on first append
    pub fn open(path: impl AsRef<Path>) -> Self {
        Journal {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one transaction as a JSON line
    pub fn append(&self, tx: &Transaction) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(&JournalEntry::from(tx))?;
        writeln!(file, "{}", line)?;
        debug!(path = %self.path.display(), document = %tx.canonical_document(), "journaled transaction");
        Ok(())
    }

    /// Read every transaction back in write order. A missing file is an empty journal.
    pub fn read_all(&self) -> Result<Vec<Transaction>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: JournalEntry = serde_json::from_str(&line)?;
            out.push(Transaction::try_from(entry)?);
        }
        Ok(out)
    }
}
