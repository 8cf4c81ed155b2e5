//! `BlockLog`: the append-only newline-delimited JSON file of blocks.
//!
//! Grounded in `original_source/models/blockchain.py`: `create_genesis_block`,
//! `write_block_to_file`/`add_block`, the backwards byte-scan in
//! `get_last_block`, `get_chain_length`, and `load_block`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::block::Block;
use crate::data::{validate_block_data, BlockData};
use crate::error::Error;
use crate::txlog::TransactionLog;

/// The append-only block log, paired with the transactions log it derives.
///
/// Owns both file paths (see `SPEC_FULL.md` §5, "Shared-resource policy")
/// and the single process-wide write lock guarding mutation of either file.
pub struct BlockLog {
    block_path: PathBuf,
    tx_log: TransactionLog,
    write_lock: Mutex<()>,
}

impl BlockLog {
    /// Opens the block log at `block_path`, writing a genesis block if the
    /// file is missing or empty. `tx_path` is the paired transactions file;
    /// it is created lazily on first use.
    pub fn new(block_path: impl Into<PathBuf>, tx_path: impl Into<PathBuf>) -> Result<Self, Error> {
        let block_path = block_path.into();
        let log = BlockLog {
            block_path,
            tx_log: TransactionLog::new(tx_path.into()),
            write_lock: Mutex::new(()),
        };
        let file_exists = log.block_path.exists();
        let file_empty = file_exists && fs::metadata(&log.block_path)?.len() == 0;
        if !file_exists || file_empty {
            if let Some(parent) = log.block_path.parent() {
                fs::create_dir_all(parent)?;
            }
            log.write_genesis()?;
        }
        Ok(log)
    }

    pub fn block_path(&self) -> &Path {
        &self.block_path
    }

    pub fn tx_log(&self) -> &TransactionLog {
        &self.tx_log
    }

    /// The write lock guarding this log and its paired transactions log.
    /// Callers performing Reconciler or Migrator operations against the
    /// same paths should hold this lock for the duration of the operation.
    pub fn write_lock(&self) -> &Mutex<()> {
        &self.write_lock
    }

    fn write_genesis(&self) -> Result<(), Error> {
        let genesis = Block::genesis();
        self.write_line(&genesis)
    }

    fn write_line(&self, block: &Block) -> Result<(), Error> {
        let line = serde_json::to_string(block)
            .map_err(|e| Error::Parse(format!("failed to serialize block: {e}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.block_path)?;
        writeln!(file, "{line}")?;
        file.sync_all()?;
        Ok(())
    }

    /// Appends a new block carrying `data`, mined to `difficulty` if it is
    /// greater than zero, then appends a TSV row per transaction entry.
    ///
    /// Acquires the write lock for the whole operation: loading the
    /// current tip, validating `data`, mining, persisting the block line
    /// and persisting the transaction rows all happen as one critical
    /// section (see `SPEC_FULL.md` §5 on the single-critical-section
    /// mining trade-off).
    pub fn append(&self, data: BlockData, difficulty: u32) -> Result<Block, Error> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        validate_block_data(&data)?;

        let last = self.last_block_inner()?;
        let (index, previous_block_hash) = match &last {
            Some(block) => (block.index + 1, block.block_hash.clone()),
            None => (0, "0".to_string()),
        };

        let mut block = Block::new(index, data, previous_block_hash);
        if difficulty > 0 {
            block.mine(difficulty);
        }

        self.write_line(&block)?;

        for entry in &block.data {
            if let Some(tx) = entry.as_transaction() {
                self.tx_log.append_row(block.timestamp, tx)?;
            }
        }

        tracing::info!(index = block.index, hash = %block.block_hash, "block appended");
        Ok(block)
    }

    /// Parses one serialized line into a `Block`, rejecting unknown
    /// fields.
    pub fn load_block(line: &str) -> Result<Block, Error> {
        serde_json::from_str(line).map_err(|e| Error::Parse(format!("invalid block JSON: {e}")))
    }

    /// The number of lines (blocks) in the log.
    pub fn count(&self) -> Result<u64, Error> {
        let file = File::open(&self.block_path)?;
        let reader = BufReader::new(file);
        Ok(reader.lines().count() as u64)
    }

    /// Streams every block in order, oldest first.
    pub fn iter_blocks(&self) -> Result<impl Iterator<Item = Result<Block, Error>>, Error> {
        let file = File::open(&self.block_path)?;
        let reader = BufReader::new(file);
        Ok(reader.lines().filter_map(|line| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(BlockLog::load_block(&line)),
            Err(e) => Some(Err(Error::Io(e))),
        }))
    }

    /// Returns the most recently appended block, or `None` for a log that
    /// has not yet had its genesis block written, or if the final line
    /// cannot be parsed (mirrors the distillation's behavior of treating a
    /// corrupt tail as "no last block", which the Migrator relies on).
    pub fn last_block(&self) -> Result<Option<Block>, Error> {
        self.last_block_inner()
    }

    fn last_block_inner(&self) -> Result<Option<Block>, Error> {
        if !self.block_path.exists() {
            return Ok(None);
        }
        let mut file = File::open(&self.block_path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(None);
        }

        // Reverse byte scan for the final newline-terminated record,
        // mirroring the seek-backwards loop in `get_last_block`: start one
        // byte before the trailing newline and walk back until another
        // newline (or the start of the file) is found.
        let mut pos = len.saturating_sub(2);
        let mut newline_pos = None;
        loop {
            file.seek(SeekFrom::Start(pos))?;
            let mut byte = [0u8; 1];
            file.read_exact(&mut byte)?;
            if byte[0] == b'\n' {
                newline_pos = Some(pos);
                break;
            }
            if pos == 0 {
                break;
            }
            pos -= 1;
        }
        match newline_pos {
            Some(p) => file.seek(SeekFrom::Start(p + 1))?,
            None => file.seek(SeekFrom::Start(0))?,
        };

        let mut last_line = String::new();
        let mut reader = BufReader::new(file);
        reader.read_line(&mut last_line)?;
        let trimmed = last_line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match BlockLog::load_block(trimmed) {
            Ok(block) => Ok(Some(block)),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataEntry;
    use crate::transaction::Transaction;
    use tempfile::tempdir;

    fn new_log(dir: &tempfile::TempDir) -> BlockLog {
        BlockLog::new(
            dir.path().join("blockchain.json"),
            dir.path().join("transactions.tsv"),
        )
        .unwrap()
    }

    #[test]
    fn new_creates_genesis_block() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        assert_eq!(log.count().unwrap(), 1);
        let last = log.last_block().unwrap().unwrap();
        assert_eq!(last.index, 0);
        assert_eq!(last.previous_block_hash, "0");
    }

    #[test]
    fn append_increments_index_and_links_hash() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        let genesis_hash = log.last_block().unwrap().unwrap().block_hash;

        let block = log
            .append(vec![DataEntry::Text("hello".into())], 0)
            .unwrap();
        assert_eq!(block.index, 1);
        assert_eq!(block.previous_block_hash, genesis_hash);
        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn append_rejects_invalid_transaction() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        let data = vec![DataEntry::transaction(Transaction {
            sender: "".into(),
            receiver: "b".into(),
            amount: 5,
            method: "transfer".into(),
        })];
        let err = log.append(data, 0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(log.count().unwrap(), 1, "no block should have been written");
    }

    #[test]
    fn append_writes_one_tsv_row_per_transaction() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        let data = vec![
            DataEntry::transaction(Transaction {
                sender: "a".into(),
                receiver: "b".into(),
                amount: 5,
                method: "transfer".into(),
            }),
            DataEntry::Text("note".into()),
            DataEntry::transaction(Transaction {
                sender: "b".into(),
                receiver: "a".into(),
                amount: 1,
                method: "reaction".into(),
            }),
        ];
        log.append(data, 0).unwrap();
        let tsv = fs::read_to_string(log.tx_log().path()).unwrap();
        assert_eq!(tsv.lines().count(), 3); // header + 2 transactions
    }

    #[test]
    fn iter_blocks_streams_in_order() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        log.append(vec![DataEntry::Text("one".into())], 0).unwrap();
        log.append(vec![DataEntry::Text("two".into())], 0).unwrap();
        let indices: Vec<u64> = log
            .iter_blocks()
            .unwrap()
            .map(|b| b.unwrap().index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn last_block_matches_reverse_scan_against_full_iteration() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        for i in 0..5 {
            log.append(vec![DataEntry::Text(format!("entry {i}"))], 0)
                .unwrap();
        }
        let expected = log.iter_blocks().unwrap().last().unwrap().unwrap();
        let actual = log.last_block().unwrap().unwrap();
        assert_eq!(actual, expected);
    }
}
