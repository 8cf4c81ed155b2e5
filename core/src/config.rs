//! Ledger-wide configuration: file locations and mining difficulty.
//!
//! Grounded in this crate's own `Config`/`ConfigBuilder` fluent-builder
//! pattern (formerly consensus parameters for a UTXO chain), repointed at
//! the paths and difficulty this ledger actually needs. See `SPEC_FULL.md`
//! §6b for how `commchain-rpc`'s `ServerConfig` layers environment loading
//! on top of this.
//!
//! ```
//! use commchain_core::config::LedgerConfig;
//!
//! let cfg = LedgerConfig::default();
//! assert_eq!(cfg.difficulty, 0);
//! ```

use std::path::PathBuf;

/// Paths and mining parameters shared by every component that touches the
/// ledger's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Path to the newline-delimited JSON block log.
    pub block_log_path: PathBuf,

    /// Path to the derived transactions TSV.
    pub transactions_log_path: PathBuf,

    /// Leading-zero proof-of-work difficulty. `0` disables mining.
    pub difficulty: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            block_log_path: PathBuf::from("data/blockchain.json"),
            transactions_log_path: PathBuf::from("data/transactions.tsv"),
            difficulty: 0,
        }
    }
}

/// Fluent builder for [`LedgerConfig`].
pub struct LedgerConfigBuilder {
    inner: LedgerConfig,
}

impl LedgerConfigBuilder {
    /// Starts a new builder pre-populated with [`LedgerConfig::default`].
    pub fn new() -> Self {
        Self {
            inner: LedgerConfig::default(),
        }
    }

    pub fn block_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.block_log_path = path.into();
        self
    }

    pub fn transactions_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.transactions_log_path = path.into();
        self
    }

    pub fn difficulty(mut self, difficulty: u32) -> Self {
        self.inner.difficulty = difficulty;
        self
    }

    /// Derives the transactions log path from `block_log_path` by swapping
    /// its extension for `.tsv`, unless `transactions_log_path` has already
    /// been set explicitly afterward.
    pub fn derive_transactions_log_path(mut self) -> Self {
        self.inner.transactions_log_path = self.inner.block_log_path.with_extension("tsv");
        self
    }

    /// Consumes the builder returning an immutable configuration value.
    pub fn finish(self) -> LedgerConfig {
        self.inner
    }
}

impl Default for LedgerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
