//! The `Block` data type: canonical preimage rendering, hashing and mining.
//!
//! Grounded in `examples/0x000NULL-obscura2.0/core/src/lib.rs`
//! (`Block::new`, `Block::hash`) and `block_ext.rs` (`Block::mine`), with
//! the preimage/hash scheme replaced by the one `SPEC_FULL.md` §4.2 pins
//! (SHA-256 over a rendered-text preimage, not Blake2b over a `bincode`
//! header).

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::data::BlockData;
use crate::hash::sha256_hex;

/// The opaque genesis message, preserved verbatim from the original
/// ledger's literal, human-authored first entry (see `SPEC_FULL.md` §9).
pub const GENESIS_MESSAGE: &str =
    "Jiraph complained about not being able to access nn block so I called Jiraph a scraper";

/// One immutable record in the ledger.
///
/// Field order matches `SPEC_FULL.md` §6 exactly; `serde_json` serializes
/// struct fields in declaration order, which is what makes the on-disk JSON
/// line order stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub data: BlockData,
    pub previous_block_hash: String,
    pub nonce: u64,
    pub block_hash: String,
}

fn now_ts() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_secs_f64()
}

/// Renders a string the way a Python `repr()` would for the simple ASCII
/// commentary this ledger carries: single-quoted, with the handful of
/// escapes that matter. See `SPEC_FULL.md` §4.2 for why this is a pinned,
/// from-scratch rendering rather than a literal port.
fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

pub fn render_data(data: &BlockData) -> String {
    let mut out = String::from("[");
    for (i, entry) in data.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match entry {
            crate::data::DataEntry::Text(s) => out.push_str(&render_string(s)),
            crate::data::DataEntry::Transaction(entry) => {
                let tx = &entry.transaction;
                write!(
                    out,
                    "{{'transaction': {{'sender': {}, 'receiver': {}, 'amount': {}, 'method': {}}}}}",
                    render_string(&tx.sender),
                    render_string(&tx.receiver),
                    tx.amount,
                    render_string(&tx.method),
                )
                .expect("writing to a String cannot fail");
            }
        }
    }
    out.push(']');
    out
}

impl Block {
    /// Builds the genesis block: index 0, previous hash `"0"`, a fixed
    /// opaque message as its sole data entry.
    pub fn genesis() -> Self {
        let data = vec![crate::data::DataEntry::Text(GENESIS_MESSAGE.to_string())];
        Self::new(0, data, "0".to_string())
    }

    /// Builds a new, unmined block with a freshly computed hash and the
    /// current wall-clock timestamp.
    pub fn new(index: u64, data: BlockData, previous_block_hash: String) -> Self {
        let mut block = Block {
            index,
            timestamp: now_ts(),
            data,
            previous_block_hash,
            nonce: 0,
            block_hash: String::new(),
        };
        block.block_hash = block.calculate_hash();
        block
    }

    /// The canonical preimage hashed to produce `block_hash` (§4.2).
    pub fn preimage(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.index,
            self.timestamp,
            render_data(&self.data),
            self.previous_block_hash,
            self.nonce
        )
    }

    /// Pure function of the current fields; does not mutate `self`.
    pub fn calculate_hash(&self) -> String {
        sha256_hex(self.preimage().as_bytes())
    }

    /// Increments `nonce` until `block_hash` begins with `difficulty`
    /// ASCII `'0'` characters. A no-op for `difficulty == 0`.
    pub fn mine(&mut self, difficulty: u32) {
        if difficulty == 0 {
            return;
        }
        let target = "0".repeat(difficulty as usize);
        self.block_hash = self.calculate_hash();
        while !self.block_hash.starts_with(&target) {
            self.nonce += 1;
            self.block_hash = self.calculate_hash();
        }
    }
}
