//! `BlockData`: the closed tagged union of commentary strings and
//! transaction entries carried by each block.
//!
//! Grounded in `original_source/models/blockchain.py::parse_block_data`,
//! which rejects a non-list payload, an empty list, an empty string entry,
//! and a dict entry missing the `"transaction"` key. Implemented here as a
//! Rust sum type instead of the untyped `dict`/`str` union the distillation
//! juggled at runtime (see `SPEC_FULL.md` §9, "Dynamic-dispatch
//! substitution").

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::transaction::Transaction;

/// One element of a block's payload: either free-form commentary or a
/// value transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataEntry {
    Text(String),
    Transaction(TransactionEntry),
}

/// Wrapper matching the wire shape `{"transaction": {...}}` with no other
/// keys permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionEntry {
    pub transaction: Transaction,
}

/// An ordered sequence of [`DataEntry`].
pub type BlockData = Vec<DataEntry>;

impl DataEntry {
    pub fn transaction(tx: Transaction) -> Self {
        DataEntry::Transaction(TransactionEntry { transaction: tx })
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            DataEntry::Transaction(entry) => Some(&entry.transaction),
            DataEntry::Text(_) => None,
        }
    }
}

/// Rejects an empty sequence, an empty text entry, or an invalid
/// transaction (per [`Transaction::validate`]).
pub fn validate_block_data(data: &BlockData) -> Result<(), Error> {
    if data.is_empty() {
        return Err(Error::Validation("data list is empty".into()));
    }
    for entry in data {
        match entry {
            DataEntry::Text(text) => {
                if text.is_empty() {
                    return Err(Error::Validation("data contains an empty string".into()));
                }
            }
            DataEntry::Transaction(entry) => entry.transaction.validate()?,
        }
    }
    Ok(())
}
