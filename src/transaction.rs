//! Signed value transfers between named parties

use crate::error::{LedgerError, Result};
use crate::signature::{self, RsaKey, Signature};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Transaction: sender × receiver × amount × signature?
///
/// Created unsigned, signed once, then immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    pub signature: Option<Signature>,
}

impl Transaction {
    /// Create an unsigned transaction
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: u64) -> Self {
        Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            signature: None,
        }
    }

    /// Canonical document: "{sender}->{receiver}:{amount}"
    pub fn canonical_document(&self) -> String {
        format!("{}->{}:{}", self.sender, self.receiver, self.amount)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Sign the canonical document. A signed transaction is never re-signed.
    pub fn sign(&mut self, private: &RsaKey) -> Result<()> {
        if self.is_signed() {
            return Err(LedgerError::SignatureInvalid(format!(
                "transaction {} is already signed",
                self.canonical_document()
            )));
        }
        self.signature = Some(signature::sign(private, &self.canonical_document())?);
        Ok(())
    }

    /// Verify the signature against the recomputed canonical document.
    ///
    /// - missing or undecodable signature → `SignatureInvalid`
    /// - signature recovers a different document → `DocumentMismatch`
    pub fn verify(&self, public: &RsaKey) -> Result<()> {
        let expected = self.canonical_document();
        let sig = self.signature.as_ref().ok_or_else(|| {
            LedgerError::SignatureInvalid(format!("transaction {} is unsigned", expected))
        })?;

        let recovered = signature::recover(public, sig)
            .map_err(|e| LedgerError::SignatureInvalid(format!("{}: {}", expected, e)))?;

        if recovered != expected {
            warn!(%expected, %recovered, "signed document does not match transaction");
            return Err(LedgerError::DocumentMismatch { expected, recovered });
        }
        Ok(())
    }
}

/// SubmitTransaction: build and sign a transfer with the sender's private key
pub fn submit_transaction(
    sender: &str,
    receiver: &str,
    amount: u64,
    private: &RsaKey,
) -> Result<Transaction> {
    let mut tx = Transaction::new(sender, receiver, amount);
    tx.sign(private)?;
    Ok(tx)
}
