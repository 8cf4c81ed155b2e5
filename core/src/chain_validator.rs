//! Streaming hash/link verification of a `BlockLog`.
//!
//! Grounded in `original_source/models/blockchain.py::is_chain_valid`.

use crate::blocklog::BlockLog;
use crate::error::Error;

/// Verifies every block's hash and previous-hash linkage by streaming
/// `log` once, oldest first. Returns `Ok(true)` iff the whole chain is
/// internally consistent; `Ok(false)` on the first violation found.
/// Missing or empty logs are reported as `Ok(false)`, matching the
/// distillation's treatment of a missing file as invalid rather than an
/// error.
pub fn is_chain_valid(log: &BlockLog) -> Result<bool, Error> {
    if !log.block_path().exists() {
        return Ok(false);
    }

    let mut blocks = match log.iter_blocks() {
        Ok(iter) => iter,
        Err(_) => return Ok(false),
    };

    let mut previous_hash: Option<String> = None;
    for block in &mut blocks {
        let block = match block {
            Ok(block) => block,
            Err(_) => {
                tracing::warn!("invalid JSON in the blockchain file");
                return Ok(false);
            }
        };

        if block.block_hash != block.calculate_hash() {
            tracing::warn!(index = block.index, "block hash does not match its preimage");
            return Ok(false);
        }

        if let Some(expected_prev) = &previous_hash {
            if &block.previous_block_hash != expected_prev {
                tracing::warn!(index = block.index, "block does not link to its predecessor");
                return Ok(false);
            }
        }

        previous_hash = Some(block.block_hash.clone());
    }

    Ok(previous_hash.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataEntry;
    use tempfile::tempdir;

    fn new_log(dir: &tempfile::TempDir) -> BlockLog {
        BlockLog::new(
            dir.path().join("blockchain.json"),
            dir.path().join("transactions.tsv"),
        )
        .unwrap()
    }

    #[test]
    fn fresh_genesis_only_log_is_valid() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        assert!(is_chain_valid(&log).unwrap());
    }

    #[test]
    fn chain_stays_valid_after_appends() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        log.append(vec![DataEntry::Text("a".into())], 0).unwrap();
        log.append(vec![DataEntry::Text("b".into())], 0).unwrap();
        assert!(is_chain_valid(&log).unwrap());
    }

    #[test]
    fn tampered_hash_is_detected() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        log.append(vec![DataEntry::Text("a".into())], 0).unwrap();

        let contents = std::fs::read_to_string(log.block_path()).unwrap();
        let tampered = contents.replacen("\"index\":1", "\"index\":99", 1);
        std::fs::write(log.block_path(), tampered).unwrap();

        assert!(!is_chain_valid(&log).unwrap());
    }

    #[test]
    fn missing_file_is_invalid() {
        let dir = tempdir().unwrap();
        let log = new_log(&dir);
        std::fs::remove_file(log.block_path()).unwrap();
        assert!(!is_chain_valid(&log).unwrap());
    }
}
