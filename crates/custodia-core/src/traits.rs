//! Core trait definitions for the CUSTODIA audit pipeline.
//!
//! Two seams define the trust boundary:
//!
//! - `AuditStore`  — durable, ordered, append-only persistence. The sole
//!   serialization point for concurrent writers.
//! - `RiskPolicy`  — maps transaction amounts to risk levels. A policy the
//!   hosting application may override.
//!
//! The trail manager wires callers to the store; the verifier and the
//! reporting layer read through the same `AuditStore` seam. Implementations
//! are constructed at process start and passed in explicitly; there are no
//! global singletons.

use chrono::{DateTime, Utc};

use custodia_contracts::{
    error::CustodiaResult,
    event::{AuditEventInput, RiskLevel},
    store::{AppendReceipt, RangeSnapshot},
};

/// Durable, ordered, append-only event storage.
///
/// `append` must execute "assign id/sequence/timestamp, canonicalize,
/// digest, read last chain digest, compute chain digest, persist" as one
/// indivisible unit. Without that, two concurrent appends can both read the
/// same predecessor digest and fork the chain. Implementations in this
/// workspace serialize through an internal mutex: a single logical writer.
///
/// Records appended here are never modified or deleted by this subsystem.
pub trait AuditStore: Send + Sync {
    /// Commit one event. All-or-nothing: on error nothing was persisted.
    fn append(&self, input: AuditEventInput) -> CustodiaResult<AppendReceipt>;

    /// Read an ordered, consistent window of the log.
    ///
    /// The bounds filter on commit timestamps, inclusive on both ends. The
    /// snapshot must never expose a partially committed row, and repeated
    /// reads over the same committed range must return the same events.
    fn read_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> CustodiaResult<RangeSnapshot>;

    /// The chain digest of the most recent row, or the genesis constant
    /// when the log is empty.
    fn last_chain_digest(&self) -> CustodiaResult<String>;

    /// Number of committed rows.
    fn event_count(&self) -> CustodiaResult<u64>;
}

/// Maps a transaction amount to a risk level.
///
/// The default thresholds live in `custodia-policy`; the financial-controls
/// collaborator may substitute its own implementation.
pub trait RiskPolicy: Send + Sync {
    fn classify(&self, amount: f64) -> RiskLevel;
}
