//! The derived transactions TSV file.
//!
//! Grounded in `original_source/models/blockchain.py::store_transaction` and
//! `create_transactions_file`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::transaction::Transaction;

pub const HEADER: &str = "Time\tSender\tReceiver\tAmount\tMethod";

/// The append-only TSV log of transactions derived from `BlockLog`.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    path: PathBuf,
}

impl TransactionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Creates the file with just the header row, creating parent
    /// directories if needed. Overwrites any existing content.
    pub fn create(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&self.path)?;
        writeln!(file, "{HEADER}")?;
        file.sync_all()?;
        Ok(())
    }

    /// Creates the file with a fresh header if it does not already exist.
    pub fn ensure_exists(&self) -> Result<(), Error> {
        if !self.exists() {
            self.create()?;
        }
        Ok(())
    }

    /// Appends a single row for `tx`, using `timestamp` as the `Time`
    /// column (the owning block's timestamp, not a freshly taken one).
    pub fn append_row(&self, timestamp: f64, tx: &Transaction) -> Result<(), Error> {
        self.ensure_exists()?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{}",
            timestamp, tx.sender, tx.receiver, tx.amount, tx.method
        )?;
        file.sync_all()?;
        Ok(())
    }
}
