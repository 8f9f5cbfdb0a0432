//! # custodia-verify
//!
//! Integrity verification for the CUSTODIA audit trail.
//!
//! This crate provides [`engine::IntegrityVerifier`], which replays stored
//! events through the same canonicalizer and hash engine the write path
//! uses and reports every discrepancy as a structured finding. Violations
//! are never exceptions: the report surfaces to a compliance process, and
//! the system never auto-repairs the log.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use custodia_verify::IntegrityVerifier;
//!
//! let verifier = IntegrityVerifier::new(store, secret);
//! let report = verifier.verify(None, None)?;
//! if !report.valid {
//!     for violation in &report.violations {
//!         eprintln!("tampering at sequence {}", violation.sequence);
//!     }
//! }
//! ```

pub mod engine;

pub use engine::IntegrityVerifier;
