//! Bidirectional validator/repairer reconciling `TransactionLog` against
//! `BlockLog`.
//!
//! Ported line-for-line from
//! `original_source/models/blockchain.py::is_transactions_file_valid`: the
//! `VALIDATE`/`APPEND` state machine, the byte-offset truncation, the
//! `"None"`-token sentinel for legacy rows, and the exact set of
//! human-readable messages.

use std::fs::{self, OpenOptions};
use std::io::Write;

use crate::blocklog::BlockLog;
use crate::error::Error;
use crate::txlog::{TransactionLog, HEADER};

/// The outcome of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Validate,
    Append,
}

/// One row of the transactions file together with the byte offset at
/// which it starts (needed so truncation can land exactly where the
/// distillation's `tf.truncate(position)` would).
struct TxLine {
    offset: u64,
    raw: String,
}

fn read_lines(contents: &str) -> Vec<TxLine> {
    let mut lines = Vec::new();
    let mut offset = 0u64;
    for raw in contents.split_inclusive('\n') {
        let trimmed = raw.trim_end_matches(['\n', '\r']);
        lines.push(TxLine {
            offset,
            raw: trimmed.to_string(),
        });
        offset += raw.len() as u64;
    }
    lines
}

fn truncate_at(tx_log: &TransactionLog, offset: u64) -> Result<(), Error> {
    let file = OpenOptions::new().write(true).open(tx_log.path())?;
    file.set_len(offset)?;
    file.sync_all()?;
    Ok(())
}

/// A field read back from the transactions file. The distillation mapped
/// the literal token `"None"` in sender/receiver to `null`, a relic of an
/// earlier schema bug; this implementation preserves that so legacy rows
/// with real `None` values are still recognized as a mismatch rather than
/// as the string `"None"`.
fn none_token(field: &str) -> Option<&str> {
    if field == "None" {
        None
    } else {
        Some(field)
    }
}

/// Reconciles the transactions file at `tx_log` against the block log
/// `blocklog`. `repair` allows appending missing trailing data; `force`
/// additionally allows truncating and replacing inconsistent data. See
/// `SPEC_FULL.md` §4.6 for the full decision table.
pub fn reconcile(
    blocklog: &BlockLog,
    tx_log: &TransactionLog,
    repair: bool,
    force: bool,
) -> Result<ReconcileReport, Error> {
    let mut repair_messages: Vec<String> = Vec::new();
    let mut mode = Mode::Validate;

    let file_existed = tx_log.exists();
    if file_existed {
        let is_empty = fs::metadata(tx_log.path())?.len() == 0;
        if is_empty {
            if repair || force {
                fs::remove_file(tx_log.path())?;
                tx_log.create()?;
                repair_messages.push(
                    "The transactions file was empty and has been replaced.".to_string(),
                );
                mode = Mode::Append;
            } else {
                return Ok(ReconcileReport {
                    valid: false,
                    message: "Transactions file is empty.".to_string(),
                });
            }
        }
    } else if repair || force {
        tx_log.create()?;
        repair_messages.push(
            "The transactions file was not found and a new one has been created.".to_string(),
        );
        mode = Mode::Append;
    } else {
        return Ok(ReconcileReport {
            valid: false,
            message: "Transaction file not found.".to_string(),
        });
    }

    let contents = fs::read_to_string(tx_log.path())?;
    let lines = read_lines(&contents);
    // lines[0] is the header; the cursor starts at the second line.
    let mut cursor = 1usize;

    let mut append_row = |timestamp: f64, sender: &str, receiver: &str, amount: i32, method: &str| -> Result<(), Error> {
        tx_log.ensure_exists()?;
        let mut file = OpenOptions::new().append(true).open(tx_log.path())?;
        writeln!(file, "{timestamp}\t{sender}\t{receiver}\t{amount}\t{method}")?;
        file.sync_all()?;
        Ok(())
    };

    for block in blocklog.iter_blocks()? {
        let block = block?;
        for entry in &block.data {
            let Some(tx) = entry.as_transaction() else {
                continue;
            };

            if mode == Mode::Validate {
                if cursor >= lines.len() {
                    if repair {
                        repair_messages.push(format!(
                            "Data missing from the transactions file and has been added. \
                             The following transaction was not found: {} -> {} ({})",
                            tx.sender, tx.receiver, tx.amount
                        ));
                        mode = Mode::Append;
                    } else {
                        return Ok(ReconcileReport {
                            valid: false,
                            message: "The transactions file is missing data.".to_string(),
                        });
                    }
                } else {
                    let row = &lines[cursor];
                    let columns: Vec<&str> = row.raw.split('\t').collect();
                    if columns.len() != 5 {
                        if repair && force {
                            truncate_at(tx_log, row.offset)?;
                            repair_messages.push(
                                "The transactions file was invalid and has been replaced."
                                    .to_string(),
                            );
                            mode = Mode::Append;
                        } else {
                            return Ok(ReconcileReport {
                                valid: false,
                                message: "Invalid transaction format.".to_string(),
                            });
                        }
                    } else {
                        let row_time: Option<f64> = columns[0].parse().ok();
                        let row_sender = none_token(columns[1]);
                        let row_receiver = none_token(columns[2]);
                        let row_amount: Option<i32> = columns[3].parse().ok();
                        let row_method = columns[4];

                        let matches = row_time == Some(block.timestamp)
                            && row_sender == Some(tx.sender.as_str())
                            && row_receiver == Some(tx.receiver.as_str())
                            && row_amount == Some(tx.amount)
                            && row_method == tx.method;

                        if !matches {
                            if repair && force {
                                truncate_at(tx_log, row.offset)?;
                                repair_messages.push(
                                    "Transaction data in the transactions file did not match \
                                     the blockchain and has been replaced."
                                        .to_string(),
                                );
                                mode = Mode::Append;
                            } else {
                                return Ok(ReconcileReport {
                                    valid: false,
                                    message: "Transaction data in the transactions file does \
                                              not match the blockchain."
                                        .to_string(),
                                });
                            }
                        }
                    }
                }
            }

            if mode == Mode::Append {
                append_row(block.timestamp, &tx.sender, &tx.receiver, tx.amount, &tx.method)?;
            }

            cursor += 1;
        }
    }

    // `lines` is a snapshot taken once up front, so `lines[cursor].offset` is
    // only meaningful while `mode` is still `Validate`. Once a mid-loop
    // mismatch or invalid-format row switched `mode` to `Append`, the file
    // was already truncated at that row and every subsequent row re-appended
    // fresh — there is no leftover stale tail to trim against a now-wrong
    // offset, and recomputing it here against the snapshot would corrupt the
    // freshly rebuilt file (padding it with NUL bytes or chopping a row just
    // written).
    if mode == Mode::Validate && cursor < lines.len() {
        if repair && force {
            truncate_at(tx_log, lines[cursor].offset)?;
            repair_messages.push(
                "Extra data was found in the transactions file and has been removed.".to_string(),
            );
        } else {
            return Ok(ReconcileReport {
                valid: false,
                message: "Extra data found in the transactions file.".to_string(),
            });
        }
    }

    let message = if repair_messages.is_empty() {
        "The transactions file is valid.".to_string()
    } else {
        format!(
            "{} The transactions file is now valid.",
            repair_messages.join(" ")
        )
    };
    Ok(ReconcileReport {
        valid: true,
        message,
    })
}

#[allow(dead_code)]
const _HEADER_ROW: &str = HEADER;
