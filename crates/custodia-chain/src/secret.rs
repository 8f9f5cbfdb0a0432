//! The process-wide chain secret.
//!
//! Loaded exactly once at startup and shared read-only by every component
//! that computes or verifies chain digests. A missing or empty secret is a
//! fatal configuration error raised at construction, never per call.
//! Rotation-in-place is unsupported; rotating the secret requires a
//! re-genesis of the chain.

use custodia_contracts::error::{CustodiaError, CustodiaResult};

/// Environment variable the secret is loaded from by default.
pub const CHAIN_SECRET_ENV: &str = "CUSTODIA_CHAIN_SECRET";

/// The HMAC key for chain digests.
///
/// Accepts either a 64-character hex string (decoded to 32 raw bytes) or
/// arbitrary raw bytes. Debug output never prints key material.
pub struct ChainSecret {
    key: Vec<u8>,
}

impl ChainSecret {
    /// Wrap raw key bytes. Empty input is a configuration error.
    pub fn new(key: impl Into<Vec<u8>>) -> CustodiaResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CustodiaError::config("chain secret must not be empty"));
        }
        Ok(Self { key })
    }

    /// Load the secret from `CUSTODIA_CHAIN_SECRET`.
    pub fn from_env() -> CustodiaResult<Self> {
        Self::from_env_var(CHAIN_SECRET_ENV)
    }

    /// Load the secret from the named environment variable.
    ///
    /// A 64-character hex value is decoded to its 32 raw bytes; anything
    /// else is used verbatim. Absence or emptiness is fatal.
    pub fn from_env_var(name: &str) -> CustodiaResult<Self> {
        let value = std::env::var(name).map_err(|_| {
            CustodiaError::config(format!(
                "environment variable {} is not set; the audit chain cannot start without its secret",
                name
            ))
        })?;

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CustodiaError::config(format!(
                "environment variable {} is empty",
                name
            )));
        }

        if trimmed.len() == 64 {
            if let Ok(bytes) = hex::decode(trimmed) {
                return Self::new(bytes);
            }
        }

        Self::new(trimmed.as_bytes().to_vec())
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for ChainSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSecret")
            .field("len", &self.key.len())
            .finish_non_exhaustive()
    }
}
