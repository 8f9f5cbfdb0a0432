//! Error taxonomy for the CUSTODIA audit trail.
//!
//! All fallible operations in the workspace return `CustodiaResult<T>`.
//! The taxonomy is deliberately small:
//!
//! - `Validation` — bad input, rejected before any write. Never retried.
//! - `Config` — missing secret or unreadable configuration. Fatal at
//!   construction time, never raised per call.
//! - `Storage` — transient I/O or serialization failure in the append
//!   store. Retryable by the caller.
//!
//! An integrity violation is NOT an error. The verifier returns violations
//! as structured findings inside its report; only infrastructure failure to
//! read the log surfaces as `Storage`.

use thiserror::Error;

/// The unified error type for the CUSTODIA crates.
#[derive(Debug, Error)]
pub enum CustodiaError {
    /// The caller supplied malformed input. Nothing was written.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// A required configuration value is missing or invalid.
    ///
    /// Raised only while constructing a component. A process that gets past
    /// construction never sees this variant again.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The append store could not read or persist a row.
    #[error("storage error: {reason}")]
    Storage { reason: String },
}

impl CustodiaError {
    /// Shorthand for a `Validation` error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    /// Shorthand for a `Config` error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    /// Shorthand for a `Storage` error.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage { reason: reason.into() }
    }
}

/// Convenience alias used throughout the CUSTODIA crates.
pub type CustodiaResult<T> = Result<T, CustodiaError>;
