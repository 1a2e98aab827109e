//! Hashing primitives for ZakatChain

use sha2::{Digest, Sha256};

/// Separator between the canonical payload and the trailing seal key.
pub const SEAL_SEPARATOR: &str = "_";

/// Hex-encoded SHA-256 of arbitrary bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Digest of a block payload sealed with `seal_key`.
///
/// The seal key is appended after the payload even though the payload
/// already carries it, so identical content sealed under different keys
/// never collides.
pub fn seal_digest(canonical_payload: &str, seal_key: &str) -> String {
    sha256_hex(format!("{}{}{}", canonical_payload, SEAL_SEPARATOR, seal_key).as_bytes())
}
