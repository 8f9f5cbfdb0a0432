//! Digest primitives: SHA-256 event digests and HMAC-SHA256 chain digests.
//!
//! The event digest commits to one row's canonical bytes. The chain digest
//! binds that row to the entire preceding sequence:
//!
//!   chain_i = HMAC-SHA256(secret, chain_{i-1} || event_i)
//!
//! where both inputs are lowercase 64-char hex strings and the predecessor
//! of the first row is `GENESIS_CHAIN_DIGEST`. Keying the link with HMAC
//! rather than a plain hash means an attacker who can write to storage but
//! cannot read the secret cannot forge a consistent chain after altering
//! history.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::secret::ChainSecret;

type HmacSha256 = Hmac<Sha256>;

/// The fixed predecessor digest of the first event in every chain.
///
/// 64 hex zeros, a value that can never be an HMAC of real data, making
/// genesis detection unambiguous.
pub const GENESIS_CHAIN_DIGEST: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// SHA-256 of the canonical event bytes, as a lowercase hex string.
pub fn event_digest(canonical: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical);
    hex::encode(hasher.finalize())
}

/// HMAC-SHA256 chain link over the previous chain digest and the current
/// event digest, as a lowercase hex string.
pub fn chain_digest(secret: &ChainSecret, prev_chain_digest: &str, event_digest: &str) -> String {
    // HMAC-SHA256 accepts keys of any length; the secret is validated
    // non-empty at construction, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts any key length"));
    mac.update(prev_chain_digest.as_bytes());
    mac.update(event_digest.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
