//! SHA-256 helpers shared across the ledger.
//!
//! Grounded in `original_source/scripts/sha265.py`
//! (`hashlib.sha256(...).hexdigest()`), reusing the teacher's `sha2`/`hex`
//! dependency pair in place of the Blake2b hashing the teacher used for its
//! UTXO chain.

use sha2::{Digest, Sha256};

/// Returns the lowercase hex-encoded SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Hashes a user identifier supplied as a string, matching the convention
/// that sender/receiver identifiers are the SHA-256 of the real user id.
pub fn hash_user_str(value: &str) -> String {
    sha256_hex(value.as_bytes())
}

/// Hashes a user identifier supplied as an integer, using its ASCII decimal
/// rendering (matching `hashlib.sha256(str(user_unhashed).encode())`).
pub fn hash_user_int(value: i64) -> String {
    sha256_hex(value.to_string().as_bytes())
}
