//! The `Transaction` data type.
//!
//! Grounded in `original_source/sponsorblockchain_types.py::Transaction`
//! (a Pydantic model with `extra = "forbid"`); `#[serde(deny_unknown_fields)]`
//! plays the same role here.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A transfer of the community coin between two hashed user identifiers.
///
/// `amount` is typed as `i32` so the ±2^31 range check from `SPEC_FULL.md`
/// §3 is enforced by the type system rather than a runtime bounds check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: i32,
    pub method: String,
}

impl Transaction {
    /// `"reaction"`-method sends are excluded from the sender side of
    /// balance math (see `SPEC_FULL.md` §4.7).
    pub const REACTION_METHOD: &'static str = "reaction";

    /// Rejects empty identifiers, empty methods and a zero amount.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sender.is_empty() {
            return Err(Error::Validation("transaction sender is empty".into()));
        }
        if self.receiver.is_empty() {
            return Err(Error::Validation("transaction receiver is empty".into()));
        }
        if self.amount == 0 {
            return Err(Error::Validation("transaction amount is 0".into()));
        }
        if self.method.is_empty() {
            return Err(Error::Validation("transaction method is empty".into()));
        }
        Ok(())
    }

    pub fn is_reaction(&self) -> bool {
        self.method == Self::REACTION_METHOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_sender() {
        let tx = Transaction {
            sender: "".into(),
            receiver: "b".into(),
            amount: 5,
            method: "transfer".into(),
        };
        assert!(tx.validate().is_err());
    }

    #[test]
    fn rejects_zero_amount() {
        let tx = Transaction {
            sender: "a".into(),
            receiver: "b".into(),
            amount: 0,
            method: "transfer".into(),
        };
        assert!(tx.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_transaction() {
        let tx = Transaction {
            sender: "a".into(),
            receiver: "b".into(),
            amount: -5,
            method: "transfer".into(),
        };
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_fields_on_deserialize() {
        let json = r#"{"sender":"a","receiver":"b","amount":1,"method":"transfer","foo":1}"#;
        let parsed: Result<Transaction, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }
}
