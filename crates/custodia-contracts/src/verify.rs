//! Verification report types.
//!
//! An integrity violation is a structured finding, not an exception. The
//! verifier accumulates every violation it sees and returns them in one
//! report; it never auto-repairs and never throws on a finding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventId;

/// What kind of discrepancy a violation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The stored `event_hash` does not match the digest recomputed from
    /// the stored fields: the row itself was altered.
    EventHashMismatch,
    /// The stored `chain_hash` does not match the digest recomputed from
    /// the stored predecessor: this row or an ancestor was altered or
    /// reordered.
    ChainLinkMismatch,
    /// The sequence numbering has a gap or repeat.
    SequenceGap,
}

/// One discrepancy found while replaying the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityViolation {
    pub event_id: EventId,
    /// The stored sequence number of the offending row.
    pub sequence: u64,
    /// Zero-based position within the verified window.
    pub position: u64,
    pub kind: ViolationKind,
    /// The digest (or sequence) the verifier expected.
    pub expected: String,
    /// The value actually stored.
    pub actual: String,
}

/// The outcome of one verification pass over a stored range.
///
/// Repeated runs over the same committed range return identical reports
/// apart from `verified_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True when no violations were found.
    pub valid: bool,
    pub total_events: u64,
    /// Events whose stored digests recomputed cleanly.
    pub verified_events: u64,
    pub violations: Vec<IntegrityViolation>,

    /// True when the window was anchored on a stored predecessor digest
    /// rather than the genesis constant. Such a pass proves internal
    /// consistency of the window only.
    pub relative_only: bool,

    /// Sequence of the first violation, when any. Every event at or after
    /// this position recomputes against stored, possibly-tampered
    /// predecessors and is of reduced trust even when its own digests
    /// match.
    pub reduced_trust_from: Option<u64>,

    pub verified_at: DateTime<Utc>,
}
