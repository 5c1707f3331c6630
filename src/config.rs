//! Configuration for the ledger runner

use crate::constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    /// No timeout when absent
    #[serde(default)]
    pub mining_timeout_secs: Option<u64>,
    #[serde(default = "default_journal_path")]
    pub journal_path: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            mining_timeout_secs: None,
            journal_path: default_journal_path(),
            log_filter: default_log_filter(),
        }
    }
}

impl LedgerConfig {
    /// Parse and validate TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: LedgerConfig =
            toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.difficulty
            )));
        }
        if self.journal_path.trim().is_empty() {
            return Err(LedgerError::Config("journal_path must be set".to_string()));
        }
        Ok(())
    }

    pub fn mining_timeout(&self) -> Option<Duration> {
        self.mining_timeout_secs.map(Duration::from_secs)
    }
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_journal_path() -> String {
    "transactions.jsonl".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}
