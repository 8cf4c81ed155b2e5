//! Error types for the **commchain** core crate.
//!
//! All high-level operations return [`crate::Result`] which is a convenient
//! alias for `core::result::Result<T, Error>`.
//!
//! The enum is intentionally coarse-grained: callers at the HTTP boundary
//! map each variant to a status code without needing to know which
//! component raised it (see `SPEC_FULL.md` §7).
//!
//! # Examples
//!
//! ```
//! use commchain_core::{Error, Result};
//!
//! fn demo_fn(fail: bool) -> Result<()> {
//!     if fail {
//!         Err(Error::Validation("amount must not be 0".into()))
//!     } else {
//!         Ok(())
//!     }
//! }
//! ```

use thiserror::Error;

/// Core crate error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed a schema or domain rule (empty sender, zero amount, ...).
    #[error("{0}")]
    Validation(String),

    /// A chain or reconciliation invariant was violated.
    #[error("{0}")]
    Integrity(String),

    /// A requested resource (block, file, user) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A serialized line could not be parsed. Kept distinct from `Io` so
    /// callers can tell "disk problem" apart from "corrupt record".
    #[error("{0}")]
    Parse(String),

    /// Underlying filesystem operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
