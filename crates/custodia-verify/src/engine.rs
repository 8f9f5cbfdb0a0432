//! The chain integrity verifier.
//!
//! `IntegrityVerifier` replays a stored window of the log and recomputes
//! every digest through the same canonicalizer and hash engine the write
//! path uses. Three checks per row, in order:
//!
//! 1. **Sequence continuity** — numbering must advance by exactly one.
//! 2. **Event digest** — SHA-256 over the stored fields must match the
//!    stored `event_hash` (a mismatch means the row itself was altered).
//! 3. **Chain link** — HMAC over the stored predecessor chain hash and the
//!    recomputed event digest must match the stored `chain_hash` (a
//!    mismatch means this row or an ancestor was altered or reordered).
//!
//! The walk accumulates the predecessor from the *stored* chain hash
//! regardless of violations, so one corrupt row is reported once instead
//! of cascading a false positive onto every later row. The price of that
//! choice is that rows after the first violation only prove consistency
//! against possibly-tampered stored values; the report says so through
//! `reduced_trust_from`.
//!
//! Verification is read-only and idempotent: repeated runs over the same
//! committed range return identical findings.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use custodia_chain::{canonical_bytes, chain_digest, event_digest, ChainSecret};
use custodia_contracts::{
    error::CustodiaResult,
    verify::{IntegrityViolation, VerificationReport, ViolationKind},
};
use custodia_core::traits::AuditStore;

/// Replays stored events and reports every digest discrepancy.
///
/// Holds the same chain secret as the write path; a verifier without the
/// true secret would reject every chain link.
pub struct IntegrityVerifier {
    store: Arc<dyn AuditStore>,
    secret: Arc<ChainSecret>,
}

impl IntegrityVerifier {
    pub fn new(store: Arc<dyn AuditStore>, secret: Arc<ChainSecret>) -> Self {
        Self { store, secret }
    }

    /// Verify the stored chain between the optional time bounds.
    ///
    /// Violations are findings inside the report, never errors; this method
    /// only fails when the log itself cannot be read.
    pub fn verify(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> CustodiaResult<VerificationReport> {
        let snapshot = self.store.read_range(from, to)?;
        let relative_only = !snapshot.starts_at_genesis;

        let mut violations: Vec<IntegrityViolation> = Vec::new();
        let mut prev_digest = snapshot.preceding_chain_digest.clone();

        // A genesis-anchored walk must start at sequence 0; a mid-chain
        // window starts wherever its first stored row says it does.
        let mut expected_seq = if snapshot.starts_at_genesis {
            0
        } else {
            snapshot.events.first().map(|e| e.sequence).unwrap_or(0)
        };

        for (position, event) in snapshot.events.iter().enumerate() {
            let position = position as u64;

            if event.sequence != expected_seq {
                warn!(
                    event_id = %event.id,
                    expected = expected_seq,
                    found = event.sequence,
                    "sequence discontinuity"
                );
                violations.push(IntegrityViolation {
                    event_id: event.id,
                    sequence: event.sequence,
                    position,
                    kind: ViolationKind::SequenceGap,
                    expected: expected_seq.to_string(),
                    actual: event.sequence.to_string(),
                });
                // Resync so one gap is reported once.
                expected_seq = event.sequence;
            }

            let recomputed = event_digest(&canonical_bytes(event)?);
            if recomputed != event.event_hash {
                warn!(event_id = %event.id, sequence = event.sequence, "event digest mismatch");
                violations.push(IntegrityViolation {
                    event_id: event.id,
                    sequence: event.sequence,
                    position,
                    kind: ViolationKind::EventHashMismatch,
                    expected: recomputed.clone(),
                    actual: event.event_hash.clone(),
                });
            }

            let expected_link = chain_digest(&self.secret, &prev_digest, &recomputed);
            if expected_link != event.chain_hash {
                warn!(event_id = %event.id, sequence = event.sequence, "chain link mismatch");
                violations.push(IntegrityViolation {
                    event_id: event.id,
                    sequence: event.sequence,
                    position,
                    kind: ViolationKind::ChainLinkMismatch,
                    expected: expected_link,
                    actual: event.chain_hash.clone(),
                });
            }

            // Advance from the stored value so a single corrupt row does
            // not cascade into violations for every descendant.
            prev_digest = event.chain_hash.clone();
            expected_seq += 1;
        }

        let total_events = snapshot.events.len() as u64;
        let flagged: std::collections::HashSet<u64> =
            violations.iter().map(|v| v.position).collect();
        let verified_events = total_events - flagged.len() as u64;
        let reduced_trust_from = violations.first().map(|v| v.sequence);

        let report = VerificationReport {
            valid: violations.is_empty(),
            total_events,
            verified_events,
            violations,
            relative_only,
            reduced_trust_from,
            verified_at: Utc::now(),
        };

        info!(
            total = report.total_events,
            verified = report.verified_events,
            valid = report.valid,
            relative_only = report.relative_only,
            "integrity verification complete"
        );
        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
