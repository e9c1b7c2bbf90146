//! Opaque agent bearer-token generation and hashing.
//!
//! Tokens are 32 random bytes, hex-encoded. The plaintext is returned to
//! the agent exactly once at registration; only the SHA-256 hex digest is
//! persisted, so validation is a pure hash lookup and a database leak does
//! not compromise live agents.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Raw entropy per token, in bytes (256 bits).
const TOKEN_BYTES: usize = 32;

/// Generate a fresh agent token.
///
/// Returns a tuple of `(plaintext_token, sha256_hex_hash)`. The plaintext
/// goes to the agent; only the hash should be persisted.
pub fn generate_agent_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let plaintext = encode_hex(&bytes);
    let hash = hash_agent_token(&plaintext);
    (plaintext, hash)
}

/// Compute the SHA-256 hex digest of a token.
///
/// Use this to compare an incoming bearer token against stored hashes.
pub fn hash_agent_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
