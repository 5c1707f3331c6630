//! Merkle aggregation of ordered items into a single digest

use crate::digest::digest_str;
use crate::error::{LedgerError, Result};

/// BuildRoot: String* → ℍ
///
/// 1. Hash every leaf
/// 2. While more than one hash remains: duplicate the last hash if the count
///    is odd, then hash each adjacent pair concatenated as hex text
/// 3. Return the single remaining hash
pub fn build_root<S: AsRef<str>>(items: &[S]) -> Result<String> {
    if items.is_empty() {
        return Err(LedgerError::EmptyInput(
            "Cannot build merkle root for empty item list".to_string(),
        ));
    }

    let mut hashes: Vec<String> = items.iter().map(|item| digest_str(item.as_ref())).collect();

    while hashes.len() > 1 {
        if hashes.len() % 2 != 0 {
            let last = hashes[hashes.len() - 1].clone();
            hashes.push(last);
        }
        hashes = hashes
            .chunks_exact(2)
            .map(|pair| {
                let mut combined = String::with_capacity(pair[0].len() + pair[1].len());
                combined.push_str(&pair[0]);
                combined.push_str(&pair[1]);
                digest_str(&combined)
            })
            .collect();
    }

    Ok(hashes.swap_remove(0))
}
