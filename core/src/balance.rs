//! Per-user balance aggregation from the transactions TSV.
//!
//! Grounded in `original_source/models/blockchain.py::get_balance`. The
//! original folds the TSV through `pandas`; this implementation does the
//! same two `sum()`s with a manual fold over lines, since pulling in a
//! dataframe library for two column sums isn't warranted (see DESIGN.md).

use std::fs;

use crate::error::Error;
use crate::hash::hash_user_str;
use crate::transaction::Transaction;
use crate::txlog::TransactionLog;

/// The result of a balance lookup: present with a signed total, or absent
/// if the user never appeared as a sender or receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Found(i64),
    NotFound,
}

/// Looks up `user`'s balance directly (already a hashed identifier).
pub fn balance(tx_log: &TransactionLog, user: &str) -> Result<Balance, Error> {
    balance_for_hashed_user(tx_log, user)
}

/// Looks up the balance for an unhashed identifier, hashing it first.
pub fn balance_unhashed(tx_log: &TransactionLog, user_unhashed: &str) -> Result<Balance, Error> {
    balance_for_hashed_user(tx_log, &hash_user_str(user_unhashed))
}

fn balance_for_hashed_user(tx_log: &TransactionLog, user: &str) -> Result<Balance, Error> {
    tx_log.ensure_exists()?;
    let contents = fs::read_to_string(tx_log.path())?;

    let mut received: i64 = 0;
    let mut sent: i64 = 0;
    let mut found = false;

    for line in contents.lines().skip(1) {
        if line.is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() != 5 {
            continue;
        }
        let sender = columns[1];
        let receiver = columns[2];
        let amount: i64 = columns[3].parse().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!(raw = columns[3], "non-numeric amount in transactions file, treating as 0");
            }
            0
        });
        let method = columns[4];

        if receiver == user {
            found = true;
            received += amount;
        }
        if sender == user {
            found = true;
            if method != Transaction::REACTION_METHOD {
                sent += amount;
            }
        }
    }

    if !found {
        return Ok(Balance::NotFound);
    }
    Ok(Balance::Found(received - sent))
}
