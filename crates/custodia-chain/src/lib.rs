//! # custodia-chain
//!
//! Canonical serialization and digest primitives for the CUSTODIA audit
//! trail: the Event Canonicalizer and the Hash Engine.
//!
//! ## Overview
//!
//! Every committed audit event carries two digests. The event digest is
//! SHA-256 over the event's canonical bytes and detects alteration of the
//! row itself. The chain digest is HMAC-SHA256 over the previous chain
//! digest and the event digest, and binds the row to everything appended
//! before it. Tampering with any committed field, even a single byte,
//! changes at least one recomputed digest and is detected by the verifier.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custodia_chain::{canonical_bytes, chain_digest, event_digest, ChainSecret};
//!
//! let secret = ChainSecret::from_env()?;
//! let bytes = canonical_bytes(&event)?;
//! let digest = event_digest(&bytes);
//! let link = chain_digest(&secret, prev, &digest);
//! ```

pub mod canonical;
pub mod digest;
pub mod secret;

pub use canonical::canonical_bytes;
pub use digest::{chain_digest, event_digest, GENESIS_CHAIN_DIGEST};
pub use secret::{ChainSecret, CHAIN_SECRET_ENV};

// ── Tests ─────────────────────────────────────────────────────────────────────
