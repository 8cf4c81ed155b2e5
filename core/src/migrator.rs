//! One-shot re-hashing migration for a legacy-format block log.
//!
//! Grounded in `original_source/utils/migrate_blockchain.py::migrate_blockchain`.
//! The old file is renamed to `<stem>_old<ext>` and a fresh file is written
//! with every block re-hashed under the canonical preimage scheme (see
//! `SPEC_FULL.md` §4.2). Unlike the distillation, this does not first write
//! a throwaway genesis block into the new file only to immediately
//! overwrite it with the migrated tip — that write was a side effect of
//! `Blockchain.__init__` with nothing left relying on it (see DESIGN.md).

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::data::{BlockData, DataEntry};
use crate::error::Error;
use crate::transaction::Transaction;

/// A block as it may appear in a pre-migration log: permissive about
/// unknown fields and about transaction shape, since the legacy format
/// predates the current strict schema.
#[derive(Debug, Deserialize, Serialize)]
struct LegacyBlock {
    index: u64,
    timestamp: f64,
    data: Vec<LegacyDataEntry>,
    previous_block_hash: String,
    #[serde(default)]
    nonce: u64,
    block_hash: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum LegacyDataEntry {
    Text(String),
    Transaction { transaction: LegacyTransaction },
}

#[derive(Debug, Deserialize, Serialize)]
struct LegacyTransaction {
    sender: String,
    receiver: String,
    amount: i32,
    method: String,
}

impl From<LegacyDataEntry> for DataEntry {
    fn from(entry: LegacyDataEntry) -> Self {
        match entry {
            LegacyDataEntry::Text(text) => DataEntry::Text(text),
            LegacyDataEntry::Transaction { transaction } => DataEntry::transaction(Transaction {
                sender: transaction.sender,
                receiver: transaction.receiver,
                amount: transaction.amount,
                method: transaction.method,
            }),
        }
    }
}

fn backup_path(block_path: &Path) -> PathBuf {
    let stem = block_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("blockchain");
    let extension = block_path.extension().and_then(|s| s.to_str());
    let file_name = match extension {
        Some(ext) => format!("{stem}_old.{ext}"),
        None => format!("{stem}_old"),
    };
    block_path.with_file_name(file_name)
}

/// Migrates the block log at `block_path` in place. Renames the existing
/// file alongside itself with an `_old` suffix and writes a freshly
/// re-hashed file back at `block_path`. Returns the path the old file was
/// renamed to.
pub fn migrate(block_path: impl AsRef<Path>) -> Result<PathBuf, Error> {
    let block_path = block_path.as_ref();

    if !block_path.exists() {
        return Err(Error::NotFound(format!(
            "blockchain file {} does not exist",
            block_path.display()
        )));
    }
    if fs::metadata(block_path)?.len() == 0 {
        return Err(Error::Validation(
            "old blockchain file is empty, cannot migrate".to_string(),
        ));
    }

    let old_path = backup_path(block_path);
    fs::rename(block_path, &old_path)?;
    tracing::info!(from = %block_path.display(), to = %old_path.display(), "backed up legacy blockchain file");

    let old_file = File::open(&old_path)?;
    let reader = BufReader::new(old_file);
    let mut new_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(block_path)?;

    let mut previous_block_hash: Option<String> = None;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let legacy: LegacyBlock = match serde_json::from_str(&line) {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(error = %e, "invalid JSON in the legacy blockchain file, skipping line");
                continue;
            }
        };

        let data: BlockData = legacy.data.into_iter().map(DataEntry::from).collect();

        // The first migrated block has no predecessor in the new chain;
        // the distillation uses the block's own (not-yet-recomputed) hash
        // as a placeholder previous-hash in that case.
        let prev_hash = previous_block_hash
            .clone()
            .unwrap_or_else(|| legacy.block_hash.clone());

        let mut new_block = Block {
            index: legacy.index,
            timestamp: legacy.timestamp,
            data,
            previous_block_hash: prev_hash,
            nonce: 0,
            block_hash: String::new(),
        };
        new_block.block_hash = new_block.calculate_hash();

        let serialized = serde_json::to_string(&new_block)
            .map_err(|e| Error::Parse(format!("failed to serialize migrated block: {e}")))?;
        writeln!(new_file, "{serialized}")?;

        previous_block_hash = Some(new_block.block_hash);
    }

    new_file.sync_all()?;
    tracing::info!(path = %block_path.display(), "blockchain migrated");
    Ok(old_path)
}
